//! 분석기 로그 초기화.
//!
//! stdout은 표/CSV/JSON 결과 전용이므로 모든 로그는 stderr로 보냅니다.
//! 보정 내역(감사 로그)과 배치 요약은 `info`, B/T 검출과 캐시 동작은 `debug`입니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// 분석기 크레이트 목록. 단일 레벨 지정은 이 크레이트들에만 적용됩니다.
const SWING_TARGETS: [&str; 4] = ["swing_core", "swing_data", "swing_analytics", "swing"];

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 여러 줄 컬러 출력
    #[default]
    Pretty,
    /// 한 줄 JSON (배치 로그 수집)
    Json,
    /// 한 줄 텍스트
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("Unknown log format: {}", other)),
        }
    }
}

/// 로그 초기화 옵션.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 레벨 또는 `EnvFilter` 지시자 (예: "debug", "swing_analytics=trace")
    pub filter: String,
    pub format: LogFormat,
    /// 종목별 분석 span의 종료 시점과 소요 시간 출력
    pub span_timing: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::from_settings(&LoggingConfig::default())
    }
}

impl LogConfig {
    /// 설정 파일의 `[logging]` 섹션으로 생성합니다.
    ///
    /// 알 수 없는 형식은 pretty로 대체합니다.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            filter: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            span_timing: settings.span_timing,
        }
    }

    /// 실제 적용할 필터 지시자.
    ///
    /// `info` 같은 단일 레벨은 분석기 크레이트에만 적용하고 나머지
    /// (sqlx 등)는 `warn`으로 둡니다. `=`나 `,`가 있으면 그대로 씁니다.
    pub fn directives(&self) -> String {
        let filter = self.filter.trim();
        if filter.contains('=') || filter.contains(',') {
            return filter.to_string();
        }
        let mut directives = vec!["warn".to_string()];
        directives.extend(SWING_TARGETS.iter().map(|t| format!("{}={}", t, filter)));
        directives.join(",")
    }
}

/// 로그 구독자를 전역으로 등록합니다.
///
/// `RUST_LOG`가 설정되어 있으면 설정 파일의 레벨보다 우선합니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(config.directives())?,
    };

    let span_events = if config.span_timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let writer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_span_events(span_events);

    let layer = match config.format {
        LogFormat::Pretty => writer.pretty().boxed(),
        LogFormat::Json => writer.json().with_current_span(true).boxed(),
        LogFormat::Compact => writer.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(layer)
        .with(env_filter)
        .try_init()?;

    tracing::debug!(filter = %config.directives(), format = ?config.format, "Logger ready");
    Ok(())
}

/// 종목 단위 분석 span (`code`, 선택적으로 `as_of` 필드).
#[macro_export]
macro_rules! analysis_span {
    ($name:expr, $code:expr) => {
        tracing::info_span!($name, code = %$code)
    };
    ($name:expr, $code:expr, $as_of:expr) => {
        tracing::info_span!($name, code = %$code, as_of = %$as_of)
    };
}
