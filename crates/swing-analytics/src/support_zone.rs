//! 지지 구간 스크리닝 (투자 적정 구간).
//!
//! 현재가가 어떤 B 가격의 ±band(기본 5%) 안에 있으면 지지 구간으로 봅니다.
//! 결과는 B 대비 변동률 오름차순입니다.

use crate::batch::InstrumentReport;
use crate::pattern::{PatternError, PatternReport, PatternResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use swing_core::{DecimalExt, Instrument, Price};

/// 지지 구간 종목 행.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportZoneRow {
    pub code: String,
    pub name: String,
    pub b_date: NaiveDate,
    pub b_price: Price,
    pub current_price: Price,
    /// B 대비 변동률 (%, 소수 둘째 자리)
    pub deviation_pct: Decimal,
}

/// 지지 구간 스크리너.
#[derive(Debug, Clone)]
pub struct SupportZoneScreen {
    band: Decimal,
}

impl Default for SupportZoneScreen {
    fn default() -> Self {
        Self {
            band: Decimal::new(5, 2),
        }
    }
}

impl SupportZoneScreen {
    /// `band`는 0과 1 사이여야 합니다 (0.05 = ±5%).
    pub fn new(band: Decimal) -> PatternResult<Self> {
        if band <= Decimal::ZERO || band >= Decimal::ONE {
            return Err(PatternError::InvalidParameter(format!(
                "zone band must be between 0 and 1, got {}",
                band
            )));
        }
        Ok(Self { band })
    }

    /// 배치 결과 전체를 스크리닝합니다.
    pub fn screen(&self, reports: &[InstrumentReport]) -> Vec<SupportZoneRow> {
        let mut rows: Vec<SupportZoneRow> = reports
            .iter()
            .flat_map(|r| self.screen_one(&r.instrument, &r.report))
            .collect();

        rows.sort_by(|a, b| {
            a.deviation_pct
                .cmp(&b.deviation_pct)
                .then_with(|| a.code.cmp(&b.code))
                .then_with(|| a.b_date.cmp(&b.b_date))
        });
        rows
    }

    /// 종목 하나의 B 목록을 현재가와 비교합니다.
    pub fn screen_one(
        &self,
        instrument: &Instrument,
        report: &PatternReport,
    ) -> Vec<SupportZoneRow> {
        let Some(current) = report.current_price() else {
            return Vec::new();
        };

        report
            .breakouts
            .iter()
            .filter(|b| b.price > Decimal::ZERO)
            .filter(|b| ((current - b.price) / b.price).abs() <= self.band)
            .map(|b| SupportZoneRow {
                code: instrument.code.clone(),
                name: instrument.name.clone(),
                b_date: b.date,
                b_price: b.price,
                current_price: current,
                deviation_pct: current
                    .pct_change_from(b.price)
                    .unwrap_or_default()
                    .round_half_up(2),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::BreakoutRetestAnalyzer;
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use swing_core::PricePoint;

    fn analyzed(code: &str, closes: &[Decimal]) -> InstrumentReport {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let points: Vec<PricePoint> = closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::from_close(start + Duration::days(i as i64), *c))
            .collect();
        let report = BreakoutRetestAnalyzer::default()
            .analyze(&points, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .unwrap();
        InstrumentReport {
            instrument: Instrument::new(code, format!("{} 종목", code)),
            report,
        }
    }

    #[test]
    fn test_rejects_bad_band() {
        assert!(SupportZoneScreen::new(dec!(0)).is_err());
        assert!(SupportZoneScreen::new(dec!(1)).is_err());
        assert!(SupportZoneScreen::new(dec!(0.05)).is_ok());
    }

    #[test]
    fn test_screen_finds_current_near_breakout() {
        // B: 105(1), 110(3). 현재가 104 → 105 대비 -0.95%, 110 대비 -5.45%
        let a = analyzed("A", &[dec!(100), dec!(105), dec!(104), dec!(110), dec!(104)]);
        // B: 126(1). 현재가 125.4 → -0.48%
        let b = analyzed("B", &[dec!(100), dec!(126), dec!(120), dec!(125.4)]);
        // 구간 밖: 110 vs 125 → -12%
        let c = analyzed("C", &[dec!(100), dec!(125), dec!(110)]);

        let rows = SupportZoneScreen::default().screen(&[b, a, c]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].code, "A");
        assert_eq!(rows[0].b_price, dec!(105));
        assert_eq!(rows[0].deviation_pct, dec!(-0.95));
        assert_eq!(rows[1].code, "B");
        assert_eq!(rows[1].deviation_pct, dec!(-0.48));
        assert_eq!(rows[1].current_price, dec!(125.4));
    }
}
