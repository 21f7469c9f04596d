//! 데이터 Provider 추상화.
//!
//! - `PriceStore`: 종목 코드로 일봉 시계열을 조회
//! - `InstrumentCatalog`: 종목 코드 ↔ 종목명 목록
//!
//! 분석 코어는 두 trait를 읽기 전용으로만 사용합니다.

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use swing_core::{Instrument, PricePoint};
use tracing::warn;

/// 일봉 가격 저장소.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// 저장소 이름 (로그용).
    fn name(&self) -> &str;

    /// 종목의 일봉 시계열을 조회합니다.
    ///
    /// 날짜 오름차순, 날짜 중복 없음(마지막 행 우선)을 보장하며
    /// 종가가 비어 있는 행은 경고 후 제외됩니다.
    async fn load_prices(&self, code: &str) -> Result<Vec<PricePoint>>;
}

/// 종목 목록 제공자.
#[async_trait]
pub trait InstrumentCatalog: Send + Sync {
    /// 전체 종목 목록 조회.
    async fn list_instruments(&self) -> Result<Vec<Instrument>>;

    /// 코드로 종목 조회.
    async fn find(&self, code: &str) -> Result<Option<Instrument>> {
        Ok(self
            .list_instruments()
            .await?
            .into_iter()
            .find(|i| i.code == code))
    }
}

/// 저장소에서 읽은 가공 전 일봉 행.
///
/// 시가/고가/저가가 비어 있으면 종가로 채웁니다.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPriceRow {
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub volume: Option<i64>,
}

impl RawPriceRow {
    /// 종가가 있으면 `PricePoint`로 변환합니다.
    pub fn into_point(self) -> Option<PricePoint> {
        let close = self.close?;
        let volume = self.volume.and_then(|v| u64::try_from(v).ok()).unwrap_or(0);
        Some(PricePoint::new(
            self.date,
            self.open.unwrap_or(close),
            self.high.unwrap_or(close),
            self.low.unwrap_or(close),
            close,
            volume,
        ))
    }
}

/// 저장소 행을 분석 가능한 시계열로 정리합니다.
///
/// 날짜 오름차순 정렬, 같은 날짜는 마지막 행이 남습니다.
pub fn finalize_rows(code: &str, rows: Vec<RawPriceRow>) -> Vec<PricePoint> {
    let total = rows.len();
    let mut by_date: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();
    let mut dropped = 0usize;

    for row in rows {
        let date = row.date;
        match row.into_point() {
            Some(point) => {
                by_date.insert(date, point);
            }
            None => {
                dropped += 1;
                warn!(code, %date, "Dropping row without close price");
            }
        }
    }

    let points: Vec<PricePoint> = by_date.into_values().collect();
    let duplicates = total - dropped - points.len();
    if duplicates > 0 {
        warn!(code, duplicates, "Duplicate dates collapsed (last row wins)");
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(d: u32, close: Option<Decimal>) -> RawPriceRow {
        RawPriceRow {
            date: NaiveDate::from_ymd_opt(2024, 3, d).unwrap(),
            open: None,
            high: None,
            low: None,
            close,
            volume: Some(100),
        }
    }

    #[test]
    fn test_finalize_sorts_dedupes_and_drops() {
        let rows = vec![
            row(5, Some(dec!(105))),
            row(4, Some(dec!(104))),
            row(5, Some(dec!(106))),
            row(6, None),
        ];
        let points = finalize_rows("005930", rows);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, dec!(104));
        assert_eq!(points[1].close, dec!(106));
        assert_eq!(points[1].open, dec!(106));
    }

    #[test]
    fn test_negative_volume_becomes_zero() {
        let mut r = row(1, Some(dec!(10)));
        r.volume = Some(-3);
        assert_eq!(r.into_point().unwrap().volume, 0);
    }
}
