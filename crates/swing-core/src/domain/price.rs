//! 일봉 가격 데이터.
//!
//! - `PricePoint` - 하루치 OHLCV
//! - `NormalizedSeries` - 불연속 보정을 마친 일봉 시계열

use crate::types::Price;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 하루치 OHLCV 데이터.
///
/// 가격 저장소가 생성하며 분석 코어에서는 읽기 전용입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    /// 거래일
    pub date: NaiveDate,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: u64,
}

impl PricePoint {
    /// 새 일봉을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 종가만 있는 일봉을 생성합니다 (시가/고가/저가 = 종가).
    pub fn from_close(date: NaiveDate, close: Price) -> Self {
        Self::new(date, close, close, close, close, 0)
    }

    /// 가격 필드(시가/고가/저가/종가)에 비율을 곱한 일봉을 반환합니다.
    ///
    /// 거래량은 그대로 둡니다. 곱셈이 `Decimal` 범위를 넘으면 `None`.
    pub fn rescaled(&self, ratio: Decimal) -> Option<Self> {
        Some(Self {
            date: self.date,
            open: self.open.checked_mul(ratio)?,
            high: self.high.checked_mul(ratio)?,
            low: self.low.checked_mul(ratio)?,
            close: self.close.checked_mul(ratio)?,
            volume: self.volume,
        })
    }
}

/// 불연속 보정을 마친 일봉 시계열.
///
/// 날짜 오름차순이며 날짜는 중복되지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSeries {
    points: Vec<PricePoint>,
}

impl NormalizedSeries {
    /// 이미 정렬·보정된 일봉으로 시계열을 생성합니다.
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// 일봉 목록을 반환합니다.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// 일봉 개수.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 인덱스의 종가.
    pub fn close(&self, idx: usize) -> Price {
        self.points[idx].close
    }

    /// 인덱스의 날짜.
    pub fn date(&self, idx: usize) -> NaiveDate {
        self.points[idx].date
    }

    /// 종가 목록.
    pub fn closes(&self) -> Vec<Price> {
        self.points.iter().map(|p| p.close).collect()
    }

    /// 마지막 종가 (현재가).
    pub fn last_close(&self) -> Option<Price> {
        self.points.last().map(|p| p.close)
    }

    /// `date` 이상인 첫 일봉의 인덱스.
    pub fn position_on_or_after(&self, date: NaiveDate) -> usize {
        self.points.partition_point(|p| p.date < date)
    }

    /// 내부 일봉 벡터를 꺼냅니다.
    pub fn into_points(self) -> Vec<PricePoint> {
        self.points
    }
}
