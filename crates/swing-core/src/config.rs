//! 설정 관리.
//!
//! 이 모듈은 분석기 설정을 정의하고 관리합니다. 모든 섹션은 serde 기본값을
//! 가지므로 일부만 작성된 설정 파일도 허용됩니다.

use crate::error::{SwingError, SwingResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 패턴 분석 설정
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// 시계열 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 데이터 소스 설정
    #[serde(default)]
    pub data: DataConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 목표가 산출 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionMode {
    /// 마지막 리테스트 레코드의 목표가/기간을 그대로 사용
    #[default]
    LastRecord,
    /// 마지막 레코드가 이후 최고가(FUTURE_HIGH) 목표면 변동성 기반으로 재산출
    VolatilityOnOpenHigh,
}

/// 패턴 분석 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    /// 불연속(액면분할 등) 판정 임계값 (0.3 = 30%)
    #[serde(default = "default_threshold")]
    pub discontinuity_threshold: Decimal,
    /// B 대비 T 확정에 필요한 최소 상승률 (0.3 = 30%)
    #[serde(default = "default_threshold")]
    pub rise_threshold: Decimal,
    /// 변동성 산출에 사용할 최근 일봉 수
    #[serde(default = "default_volatility_window")]
    pub volatility_window: usize,
    /// 변동성 폴백 시 최소 기대 상승률
    #[serde(default = "default_min_growth")]
    pub min_growth: Decimal,
    /// 최저가가 0 이하일 때 사용할 변동성
    #[serde(default = "default_volatility")]
    pub default_volatility: Decimal,
    /// 참고할 리테스트 기록이 없을 때의 예상 기간 (일)
    #[serde(default = "default_period_days")]
    pub default_period_days: i64,
    /// 목표가 산출 방식
    #[serde(default)]
    pub projection_mode: ProjectionMode,
    /// 지지 구간 판정 밴드 (0.05 = B 가격 ±5%)
    #[serde(default = "default_zone_band")]
    pub zone_band: Decimal,
}

fn default_threshold() -> Decimal {
    Decimal::new(3, 1)
}
fn default_volatility_window() -> usize {
    60
}
fn default_min_growth() -> Decimal {
    Decimal::new(1, 1)
}
fn default_volatility() -> Decimal {
    Decimal::new(2, 1)
}
fn default_period_days() -> i64 {
    30
}
fn default_zone_band() -> Decimal {
    Decimal::new(5, 2)
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            discontinuity_threshold: default_threshold(),
            rise_threshold: default_threshold(),
            volatility_window: default_volatility_window(),
            min_growth: default_min_growth(),
            default_volatility: default_volatility(),
            default_period_days: default_period_days(),
            projection_mode: ProjectionMode::default(),
            zone_band: default_zone_band(),
        }
    }
}

impl AnalysisConfig {
    /// 상승 임계값을 지정합니다.
    pub fn with_rise_threshold(mut self, threshold: Decimal) -> Self {
        self.rise_threshold = threshold;
        self
    }

    /// 불연속 임계값을 지정합니다.
    pub fn with_discontinuity_threshold(mut self, threshold: Decimal) -> Self {
        self.discontinuity_threshold = threshold;
        self
    }

    /// 목표가 산출 방식을 지정합니다.
    pub fn with_projection_mode(mut self, mode: ProjectionMode) -> Self {
        self.projection_mode = mode;
        self
    }

    /// 설정값을 검증합니다.
    ///
    /// 잘못된 값은 스캔 시작 전에 거부되어야 합니다.
    pub fn validate(&self) -> SwingResult<()> {
        if self.rise_threshold <= Decimal::ZERO {
            return Err(SwingError::Config(format!(
                "rise_threshold must be positive, got {}",
                self.rise_threshold
            )));
        }
        if self.discontinuity_threshold <= Decimal::ZERO {
            return Err(SwingError::Config(format!(
                "discontinuity_threshold must be positive, got {}",
                self.discontinuity_threshold
            )));
        }
        if self.volatility_window == 0 {
            return Err(SwingError::Config(
                "volatility_window must be at least 1".to_string(),
            ));
        }
        if self.min_growth < Decimal::ZERO {
            return Err(SwingError::Config(format!(
                "min_growth must not be negative, got {}",
                self.min_growth
            )));
        }
        if self.default_volatility < Decimal::ZERO {
            return Err(SwingError::Config(format!(
                "default_volatility must not be negative, got {}",
                self.default_volatility
            )));
        }
        if self.default_period_days < 0 {
            return Err(SwingError::Config(format!(
                "default_period_days must not be negative, got {}",
                self.default_period_days
            )));
        }
        if self.zone_band <= Decimal::ZERO || self.zone_band >= Decimal::ONE {
            return Err(SwingError::Config(format!(
                "zone_band must be between 0 and 1, got {}",
                self.zone_band
            )));
        }
        Ok(())
    }
}

/// 시계열 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// 캐시 사용 여부
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 캐시 유효 기간 (초)
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_ttl() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_ttl(),
        }
    }
}

/// 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// 종목별 일봉 CSV 디렉토리 (`<code>.csv`)
    #[serde(default = "default_csv_dir")]
    pub csv_dir: String,
    /// 종목 목록 CSV 경로 (`code,name`)
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    /// PostgreSQL URL (지정 시 CSV 대신 사용)
    #[serde(default)]
    pub database_url: Option<String>,
    /// 배치 분석 동시 실행 수
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

fn default_csv_dir() -> String {
    "data/prices".to_string()
}
fn default_catalog_path() -> String {
    "data/symbols.csv".to_string()
}
fn default_max_concurrency() -> usize {
    8
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_dir: default_csv_dir(),
            catalog_path: default_catalog_path(),
            database_url: None,
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    #[serde(default = "default_log_level")]
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// 종목별 분석 소요 시간 출력
    #[serde(default)]
    pub span_timing: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            span_timing: false,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `SWING__ANALYSIS__RISE_THRESHOLD=0.25` 형식으로 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> SwingResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("SWING")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
