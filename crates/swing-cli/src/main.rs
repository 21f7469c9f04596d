//! 돌파/리테스트 스윙 분석 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 삼성전자 단일 종목 분석
//! swing analyze -s 005930
//!
//! # 예상 수익률 / 빠른 도달 TOP 10
//! swing rank --top 10
//!
//! # B 가격 ±3% 이내 종목 (CSV 출력)
//! swing --format csv zones --band 3
//!
//! # 2025-01-01 이후 월별 구간 터치 성과
//! swing track --since 2025-01-01
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use swing_core::{init_logging, kst_today, AppConfig, LogConfig};
use tracing::{error, info};

mod commands;

use commands::analyze::{run_analyze, AnalyzeConfig};
use commands::output::{parse_date, OutputFormat};
use commands::rank::{run_rank, RankConfig};
use commands::source::DataSource;
use commands::track::{run_track, TrackConfig};
use commands::zones::{run_zones, ZonesConfig};

#[derive(Parser)]
#[command(name = "swing")]
#[command(about = "Swing CLI - 돌파/리테스트 패턴 기반 목표가 분석", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 경로
    #[arg(long, global = true, default_value = "config/default.toml")]
    config: String,

    /// CSV 일봉 디렉터리 (설정값 덮어쓰기)
    #[arg(long, global = true)]
    data_dir: Option<String>,

    /// 종목 목록 CSV 경로
    #[arg(long, global = true)]
    catalog: Option<String>,

    /// PostgreSQL 연결 URL (지정 시 CSV 대신 사용)
    #[arg(long, global = true, env = "DATABASE_URL")]
    db_url: Option<String>,

    /// 출력 형식 (table, csv, json)
    #[arg(long, global = true, default_value = "table")]
    format: String,

    /// 출력 파일 경로 (미지정 시 stdout)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// 로그 레벨 (예: info, swing_analytics=debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 기준일 (YYYY-MM-DD, 기본: 오늘 KST)
    #[arg(long, global = true)]
    as_of: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 단일 종목 B/T/리테스트 분석 및 목표가 예측
    Analyze {
        /// 종목 코드 (예: 005930)
        #[arg(short, long)]
        symbol: String,
    },

    /// 예상 수익률 / 도달일 TOP-N 랭킹
    Rank {
        /// 순위별 종목 수
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// 현재가가 B 가격 근처인 종목 스크리닝
    Zones {
        /// 허용 밴드 (퍼센트, 기본: 설정의 zone_band)
        #[arg(long)]
        band: Option<Decimal>,
    },

    /// 월별 B 구간 터치 이후 성과 추적
    Track {
        /// 집계 시작일 (YYYY-MM-DD)
        #[arg(long)]
        since: String,

        /// 허용 밴드 (퍼센트)
        #[arg(long)]
        band: Option<Decimal>,
    },
}

/// 명령행 옵션을 파일 설정 위에 덮어씁니다.
fn apply_overrides(config: &mut AppConfig, cli: &Cli) {
    if let Some(dir) = &cli.data_dir {
        config.data.csv_dir = dir.clone();
    }
    if let Some(catalog) = &cli.catalog {
        config.data.catalog_path = catalog.clone();
    }
    if let Some(url) = &cli.db_url {
        config.data.database_url = Some(url.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config: {}", cli.config))?;
    apply_overrides(&mut config, &cli);

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    config
        .analysis
        .validate()
        .context("Invalid analysis configuration")?;

    let format = OutputFormat::parse(&cli.format)?;
    let as_of = match &cli.as_of {
        Some(s) => parse_date(s)?,
        None => kst_today(),
    };
    info!(%as_of, config = %cli.config, "Starting swing analysis");

    let source = DataSource::open(&config).await?;
    let output = cli.output.clone();

    let result = match cli.command {
        Commands::Analyze { symbol } => {
            run_analyze(
                &config.analysis,
                &source,
                AnalyzeConfig {
                    code: symbol,
                    as_of,
                    format,
                    output,
                },
            )
            .await
        }
        Commands::Rank { top } => {
            run_rank(
                &config,
                &source,
                RankConfig {
                    top,
                    as_of,
                    format,
                    output,
                },
            )
            .await
        }
        Commands::Zones { band } => {
            run_zones(
                &config,
                &source,
                ZonesConfig {
                    band_pct: band,
                    as_of,
                    format,
                    output,
                },
            )
            .await
        }
        Commands::Track { since, band } => {
            let since = parse_date(&since)?;
            run_track(
                &config,
                &source,
                TrackConfig {
                    since,
                    band_pct: band,
                    as_of,
                    format,
                    output,
                },
            )
            .await
        }
    };

    if let Err(e) = &result {
        error!("Command failed: {:#}", e);
    }
    let stats = source.cache.stats().await;
    info!(
        hits = stats.hits,
        misses = stats.misses,
        entries = stats.entries,
        "Series cache stats"
    );
    result
}
