//! 돌파/리테스트 패턴 분석.
//!
//! 네 개의 구성 요소가 순서대로 실행됩니다:
//! - `SeriesNormalizer`: 액면분할 같은 불연속 구간을 보정
//! - `BreakoutPeakDetector`: B(돌파)와 T(고점) 탐지
//! - `RetestAnalyzer`: T 이후 B 가격으로의 되돌림과 그 이후 목표 탐색
//! - `TargetProjector`: 목표가, 기간, 기대 수익률 산출
//!
//! `BreakoutRetestAnalyzer`가 네 단계를 한 번에 실행합니다.

mod analyzer;
mod detector;
mod normalizer;
mod projector;
mod retest;

pub use analyzer::{BreakoutRetestAnalyzer, PatternReport};
pub use detector::{BreakoutPeakDetector, DetectionResult};
pub use normalizer::{NormalizationOutcome, SeriesNormalizer};
pub use projector::TargetProjector;
pub use retest::RetestAnalyzer;

use swing_core::SwingError;
use swing_data::DataError;
use thiserror::Error;

/// 패턴 분석 오류.
#[derive(Debug, Error)]
pub enum PatternError {
    /// 잘못된 분석 파라미터 (스캔 시작 전 거부)
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 목표가를 산출할 수 없음
    #[error("no target could be projected: {0}")]
    NoProjection(String),

    /// 가격 데이터 조회 실패
    #[error("데이터 오류: {0}")]
    Data(#[from] DataError),
}

impl PatternError {
    /// 목표가 미산출 여부 (배치에서는 건너뛰기 대상).
    pub fn is_no_projection(&self) -> bool {
        matches!(self, PatternError::NoProjection(_))
    }
}

impl From<SwingError> for PatternError {
    fn from(err: SwingError) -> Self {
        match err {
            SwingError::Config(msg) => PatternError::InvalidParameter(msg),
            other => PatternError::InvalidParameter(other.to_string()),
        }
    }
}

/// 패턴 분석 결과 타입.
pub type PatternResult<T> = Result<T, PatternError>;
