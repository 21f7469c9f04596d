//! 설정 에러 타입.
//!
//! 0 종가나 빈 시계열 같은 데이터 품질 문제는 에러가 아닙니다.
//! 분석 단계에서 경고 로그를 남기고 계속 진행합니다.

use thiserror::Error;

/// 설정 로드/검증 에러.
#[derive(Debug, Error)]
pub enum SwingError {
    /// 설정 값이 허용 범위를 벗어남
    #[error("설정 에러: {0}")]
    Config(String),

    /// 설정 파일 또는 환경 변수를 읽지 못함
    #[error("설정 로드 실패: {0}")]
    Load(String),
}

/// 설정 작업을 위한 Result 타입.
pub type SwingResult<T> = Result<T, SwingError>;

impl From<config::ConfigError> for SwingError {
    fn from(err: config::ConfigError) -> Self {
        SwingError::Load(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_maps_to_load() {
        let err: SwingError = config::ConfigError::Message("missing field".to_string()).into();
        assert!(matches!(err, SwingError::Load(_)));
        assert!(err.to_string().contains("missing field"));
    }
}
