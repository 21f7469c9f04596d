//! 가격 저장소 / 종목 목록 연결 및 배치 분석 공통 처리.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use swing_analytics::{BatchAnalyzer, BatchOutcome};
use swing_core::{AppConfig, Instrument};
use swing_data::{
    CsvInstrumentCatalog, CsvPriceStore, Database, DatabaseConfig, InstrumentCatalog,
    PgInstrumentCatalog, PgPriceStore, PriceStore, SeriesCache,
};
use tracing::{info, warn};

/// 분석에 쓰이는 데이터 소스 묶음.
pub struct DataSource {
    pub store: Box<dyn PriceStore>,
    pub catalog: Box<dyn InstrumentCatalog>,
    pub cache: SeriesCache,
}

impl DataSource {
    /// 설정에 따라 PostgreSQL 또는 CSV 저장소를 엽니다.
    pub async fn open(config: &AppConfig) -> Result<Self> {
        let cache = SeriesCache::from_config(&config.cache);

        match &config.data.database_url {
            Some(url) => {
                let db_config = DatabaseConfig::new(url.clone())
                    .with_max_connections(config.data.max_concurrency as u32);
                let db = Database::connect(&db_config)
                    .await
                    .context("Failed to connect to database")?;
                info!("Using PostgreSQL price store");
                Ok(Self {
                    store: Box::new(PgPriceStore::new(db.clone())),
                    catalog: Box::new(PgInstrumentCatalog::new(db)),
                    cache,
                })
            }
            None => {
                info!(dir = %config.data.csv_dir, "Using CSV price store");
                Ok(Self {
                    store: Box::new(CsvPriceStore::new(&config.data.csv_dir)),
                    catalog: Box::new(CsvInstrumentCatalog::new(&config.data.catalog_path)),
                    cache,
                })
            }
        }
    }

    /// 종목 코드로 종목 정보를 찾습니다. 목록에 없으면 코드를 이름으로 씁니다.
    pub async fn instrument(&self, code: &str) -> Instrument {
        match self.catalog.find(code).await {
            Ok(Some(instrument)) => instrument,
            Ok(None) => Instrument::new(code, code),
            Err(e) => {
                warn!(code, error = %e, "Instrument catalog unavailable");
                Instrument::new(code, code)
            }
        }
    }

    /// 전체 종목 목록을 배치 분석합니다.
    pub async fn analyze_all(&self, config: &AppConfig, as_of: NaiveDate) -> Result<BatchOutcome> {
        let instruments = self
            .catalog
            .list_instruments()
            .await
            .context("Failed to load instrument catalog")?;

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .context("Invalid progress template")?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Analyzing {} instruments...", instruments.len()));

        let batch = BatchAnalyzer::new(config.analysis.clone(), config.data.max_concurrency);
        let outcome = batch
            .run(&instruments, self.store.as_ref(), &self.cache, as_of)
            .await
            .context("Batch analysis failed")?;

        pb.finish_and_clear();
        info!(
            analyzed = outcome.reports.len(),
            skipped = outcome.skipped.len(),
            "Catalog analysis finished"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_prices(dir: &std::path::Path, code: &str, closes: &[u32]) {
        let mut body = String::from("date,open,high,low,close,volume\n");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for (i, close) in closes.iter().enumerate() {
            let date = start + chrono::Duration::days(i as i64);
            body.push_str(&format!("{},{},{},{},{},100\n", date, close, close, close, close));
        }
        std::fs::write(dir.join(format!("{}.csv", code)), body).unwrap();
    }

    #[tokio::test]
    async fn test_csv_source_batch() {
        let dir = tempfile::tempdir().unwrap();
        let prices = dir.path().join("prices");
        std::fs::create_dir(&prices).unwrap();
        write_prices(&prices, "005930", &[100, 101, 102, 104]);
        write_prices(&prices, "000660", &[200, 210, 205]);
        std::fs::write(
            dir.path().join("symbols.csv"),
            "code,name\n005930,삼성전자\n000660,SK하이닉스\n035720,카카오\n",
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.data.csv_dir = prices.display().to_string();
        config.data.catalog_path = dir.path().join("symbols.csv").display().to_string();

        let source = DataSource::open(&config).await.unwrap();
        assert_eq!(source.instrument("005930").await.name, "삼성전자");
        assert_eq!(source.instrument("999999").await.name, "999999");

        let outcome = source
            .analyze_all(&config, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .await
            .unwrap();
        let codes: Vec<&str> = outcome.reports.iter().map(|r| r.code()).collect();
        assert_eq!(codes, vec!["000660", "005930"]);
        // 가격 파일 없는 종목은 건너뜀
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].instrument.code, "035720");
    }
}
