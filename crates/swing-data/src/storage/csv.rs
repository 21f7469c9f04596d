//! CSV 파일 기반 저장소.
//!
//! 디렉토리 구조:
//! ```text
//! data/prices/005930.csv   # date,open,high,low,close,volume
//! data/symbols.csv         # code,name
//! ```

use crate::error::{DataError, Result};
use crate::provider::{finalize_rows, InstrumentCatalog, PriceStore, RawPriceRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use swing_core::{Instrument, PricePoint};
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct CsvPriceRecord {
    date: String,
    open: Option<String>,
    high: Option<String>,
    low: Option<String>,
    close: Option<String>,
    volume: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CsvSymbolRecord {
    code: String,
    name: String,
}

fn parse_decimal(field: Option<&str>, line: u64, column: &str) -> Result<Option<Decimal>> {
    match field.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Decimal::from_str(s).map(Some).map_err(|e| {
            DataError::ParseError(format!("line {}: invalid {} '{}': {}", line, column, s, e))
        }),
    }
}

fn parse_volume(field: Option<&str>, line: u64) -> Result<Option<i64>> {
    match field.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            // "1234.0" 같은 실수 표기도 허용
            let value = Decimal::from_str(s).map_err(|e| {
                DataError::ParseError(format!("line {}: invalid volume '{}': {}", line, s, e))
            })?;
            Ok(i64::try_from(value.trunc()).ok())
        }
    }
}

/// CSV 바이트에서 일봉 행을 읽습니다.
fn read_price_rows(bytes: &[u8]) -> Result<Vec<RawPriceRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<CsvPriceRecord>().enumerate() {
        let record = record?;
        // 헤더가 1번 줄
        let line = idx as u64 + 2;
        let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").map_err(|e| {
            DataError::ParseError(format!("line {}: invalid date '{}': {}", line, record.date, e))
        })?;
        rows.push(RawPriceRow {
            date,
            open: parse_decimal(record.open.as_deref(), line, "open")?,
            high: parse_decimal(record.high.as_deref(), line, "high")?,
            low: parse_decimal(record.low.as_deref(), line, "low")?,
            close: parse_decimal(record.close.as_deref(), line, "close")?,
            volume: parse_volume(record.volume.as_deref(), line)?,
        });
    }
    Ok(rows)
}

/// 종목별 CSV 파일 디렉토리 저장소.
#[derive(Debug, Clone)]
pub struct CsvPriceStore {
    dir: PathBuf,
}

impl CsvPriceStore {
    /// 새 저장소 생성.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 데이터 디렉토리.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 종목 파일 경로.
    pub fn path_for(&self, code: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", code))
    }
}

#[async_trait]
impl PriceStore for CsvPriceStore {
    fn name(&self) -> &str {
        "csv"
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn load_prices(&self, code: &str) -> Result<Vec<PricePoint>> {
        let path = self.path_for(code);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DataError::NotFound(format!("price file for {} ({})", code, path.display()))
            } else {
                DataError::IoError(format!("{}: {}", path.display(), e))
            }
        })?;

        let rows = read_price_rows(&bytes).map_err(|e| match e {
            DataError::ParseError(msg) => {
                DataError::ParseError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        let points = finalize_rows(code, rows);

        debug!(code, count = points.len(), "Loaded prices from CSV");
        Ok(points)
    }
}

/// `code,name` 헤더의 종목 목록 CSV.
#[derive(Debug, Clone)]
pub struct CsvInstrumentCatalog {
    path: PathBuf,
}

impl CsvInstrumentCatalog {
    /// 새 종목 목록 생성.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl InstrumentCatalog for CsvInstrumentCatalog {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn list_instruments(&self) -> Result<Vec<Instrument>> {
        let bytes = tokio::fs::read(&self.path).await?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());

        let mut instruments = Vec::new();
        for record in reader.deserialize::<CsvSymbolRecord>() {
            let record = record?;
            if record.code.is_empty() {
                continue;
            }
            instruments.push(Instrument::new(record.code, record.name));
        }

        debug!(count = instruments.len(), "Loaded instrument catalog");
        Ok(instruments)
    }
}
