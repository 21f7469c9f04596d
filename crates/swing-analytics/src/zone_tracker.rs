//! 월별 B 구간 성과 추적.
//!
//! 기준일 이후 종가가 B 가격 ±band 안에 들어온 날(터치)을 월별로 하나씩 골라,
//! 그날 이후의 최고/최저 종가와 현재가를 B 가격 대비 수익률로 기록합니다.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use swing_core::{BreakoutPoint, DecimalExt, NormalizedSeries, Price};

/// 월별 첫 B 구간 터치.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneTouch {
    pub code: String,
    pub name: String,
    /// 월 (해당 월 1일)
    pub month: NaiveDate,
    pub b_date: NaiveDate,
    pub b_price: Price,
    /// 터치일
    pub touch_date: NaiveDate,
    /// 터치일 종가
    pub touch_close: Price,
    /// 현재가 (마지막 종가)
    pub current_price: Price,
    /// 터치일 이후 최고 종가
    pub max_close_after: Price,
    /// 터치일 이후 최저 종가
    pub min_close_after: Price,
    /// B 대비 현재가 수익률 (%)
    pub current_return_pct: Decimal,
    /// B 대비 최고 수익률 (%)
    pub max_return_pct: Decimal,
    /// B 대비 최저 수익률 (%)
    pub min_return_pct: Decimal,
}

impl ZoneTouch {
    /// "25.03" 형식의 월 라벨.
    pub fn month_label(&self) -> String {
        self.month.format("%y.%m").to_string()
    }
}

/// 종목 하나의 월별 B 구간 터치를 계산합니다.
///
/// 터치는 B 날짜 이후여야 하며, 한 달에 가장 이른 터치 하나만 남깁니다
/// (같은 날이면 B 날짜가 빠른 쪽).
pub fn track_monthly(
    code: &str,
    name: &str,
    series: &NormalizedSeries,
    breakouts: &[BreakoutPoint],
    since: NaiveDate,
    band: Decimal,
) -> Vec<ZoneTouch> {
    let Some(current) = series.last_close() else {
        return Vec::new();
    };
    let closes = series.closes();
    let n = closes.len();

    // 각 위치부터 끝까지의 최고/최저 종가
    let mut suffix_max = closes.clone();
    let mut suffix_min = closes.clone();
    for i in (0..n.saturating_sub(1)).rev() {
        suffix_max[i] = suffix_max[i].max(suffix_max[i + 1]);
        suffix_min[i] = suffix_min[i].min(suffix_min[i + 1]);
    }

    let pct = |price: Price, base: Price| {
        price
            .pct_change_from(base)
            .unwrap_or_default()
            .round_half_up(2)
    };

    let mut by_month: BTreeMap<NaiveDate, ZoneTouch> = BTreeMap::new();
    for idx in series.position_on_or_after(since)..n {
        let date = series.date(idx);
        let close = closes[idx];
        let Some(month) = NaiveDate::from_ymd_opt(date.year(), date.month(), 1) else {
            continue;
        };
        if by_month.contains_key(&month) {
            continue;
        }

        let touched = breakouts.iter().find(|b| {
            b.date < date
                && b.price > Decimal::ZERO
                && ((close - b.price) / b.price).abs() <= band
        });

        if let Some(b) = touched {
            by_month.insert(
                month,
                ZoneTouch {
                    code: code.to_string(),
                    name: name.to_string(),
                    month,
                    b_date: b.date,
                    b_price: b.price,
                    touch_date: date,
                    touch_close: close,
                    current_price: current,
                    max_close_after: suffix_max[idx],
                    min_close_after: suffix_min[idx],
                    current_return_pct: pct(current, b.price),
                    max_return_pct: pct(suffix_max[idx], b.price),
                    min_return_pct: pct(suffix_min[idx], b.price),
                },
            );
        }
    }

    by_month.into_values().collect()
}
