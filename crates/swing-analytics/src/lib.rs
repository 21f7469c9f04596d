//! 돌파/리테스트 패턴 분석 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 불연속 보정 (`SeriesNormalizer`)
//! - 돌파(B)/고점(T) 탐지 (`BreakoutPeakDetector`)
//! - 리테스트 분석 (`RetestAnalyzer`)
//! - 목표가 예측 (`TargetProjector`)
//! - 종목별 파이프라인 및 배치 분석
//! - 수익률/도달일 랭킹, 지지 구간 스크리닝, 월별 구간 성과
//!
//! # 분석 순서
//!
//! ```text
//! 원시 일봉 → normalize → detect → analyze-retests → project
//! ```
//!
//! 각 단계는 이전 단계가 만든 B/T 목록에 의존하므로 순서를 바꿀 수 없습니다.

pub mod batch;
pub mod pattern;
pub mod ranking;
pub mod support_zone;
pub mod zone_tracker;

pub use batch::{BatchAnalyzer, BatchOutcome, InstrumentReport, SkippedInstrument};
pub use pattern::{
    BreakoutPeakDetector, BreakoutRetestAnalyzer, DetectionResult, NormalizationOutcome,
    PatternError, PatternReport, PatternResult, RetestAnalyzer, SeriesNormalizer,
    TargetProjector,
};
pub use ranking::{rank_by_arrival, rank_by_return};
pub use support_zone::{SupportZoneRow, SupportZoneScreen};
pub use zone_tracker::{track_monthly, ZoneTouch};
