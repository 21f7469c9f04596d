//! 목표가 예측 (Target Projector).
//!
//! # 산출 방식
//!
//! - **Case A** (리테스트 레코드 있음): 마지막 레코드의 목표가와 기간을 그대로 사용
//! - **Case B** (없음): 최근 변동성 기반 폴백
//!   - `volatility = (max - min) / min` (최근 60개 종가)
//!   - `growth = max(0.1, volatility)`
//!   - `target = round(current × (1 + growth))`, 현재가 이하이면 `round(current × 1.1)`
//!   - 기간: 과거 레코드 평균 기간, 없으면 30일
//!   - 목표가 계산이 `Decimal` 범위를 넘으면 `NoProjection`
//!
//! `ProjectionMode::VolatilityOnOpenHigh`에서는 마지막 레코드가 `FUTURE_HIGH`일 때도
//! Case B 목표가를 쓰고, 기간은 전체 레코드의 평균 기간을 씁니다.

use super::{PatternError, PatternResult};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use swing_core::{
    AnalysisConfig, DecimalExt, NormalizedSeries, Price, Projection, ProjectionBasis,
    ProjectionMode, Ratio, RetestRecord, TargetKind,
};
use tracing::debug;

/// 반올림 후에도 목표가가 현재가 이하일 때 쓰는 배수.
const FLOOR_MULTIPLIER: Decimal = dec!(1.1);

/// 목표가 예측기.
#[derive(Debug, Clone)]
pub struct TargetProjector {
    volatility_window: usize,
    min_growth: Ratio,
    default_volatility: Ratio,
    default_period_days: i64,
    mode: ProjectionMode,
}

impl Default for TargetProjector {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl TargetProjector {
    /// 분석 설정에서 예측기 생성.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            volatility_window: config.volatility_window.max(1),
            min_growth: config.min_growth,
            default_volatility: config.default_volatility,
            default_period_days: config.default_period_days,
            mode: config.projection_mode,
        }
    }

    /// 산출 방식 지정.
    pub fn with_mode(mut self, mode: ProjectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// 목표가를 산출합니다.
    ///
    /// # 인자
    ///
    /// * `series` - 보정된 시계열 (마지막 종가 = 현재가)
    /// * `retests` - 이번 분석의 리테스트 레코드 (발생 순서)
    /// * `history` - 같은 종목의 과거 레코드 (Case B 기간 산출용, 없으면 빈 슬라이스)
    /// * `as_of` - 기준일
    ///
    /// # 오류
    ///
    /// 시계열이 비었거나 현재가가 0 이하이면 `PatternError::NoProjection`.
    pub fn project(
        &self,
        series: &NormalizedSeries,
        retests: &[RetestRecord],
        history: &[RetestRecord],
        as_of: NaiveDate,
    ) -> PatternResult<Projection> {
        let current = series
            .last_close()
            .ok_or_else(|| PatternError::NoProjection("empty price series".to_string()))?;
        if current <= Decimal::ZERO {
            return Err(PatternError::NoProjection(format!(
                "non-positive current price {}",
                current
            )));
        }

        let (target_price, period_days, basis) = match retests.last() {
            Some(last)
                if self.mode == ProjectionMode::VolatilityOnOpenHigh
                    && last.target_kind == TargetKind::FutureHigh =>
            {
                debug!(b_date = %last.b_date, "Open future high, using volatility target");
                let (target, volatility, growth) = self.volatility_target(series, current)?;
                (
                    target,
                    mean_period(retests).unwrap_or(self.default_period_days),
                    ProjectionBasis::Volatility { volatility, growth },
                )
            }
            Some(last) => {
                debug!(b_date = %last.b_date, kind = %last.target_kind, "Using last retest record");
                (
                    last.target_price,
                    last.period_days,
                    ProjectionBasis::Retest {
                        target_kind: last.target_kind,
                        b_date: last.b_date,
                    },
                )
            }
            None => {
                debug!("No retest record, using volatility fallback");
                let (target, volatility, growth) = self.volatility_target(series, current)?;
                (
                    target,
                    mean_period(history).unwrap_or(self.default_period_days),
                    ProjectionBasis::Volatility { volatility, growth },
                )
            }
        };

        let target_date = u64::try_from(period_days)
            .ok()
            .and_then(|days| as_of.checked_add_days(Days::new(days)))
            .ok_or_else(|| {
                PatternError::NoProjection(format!("invalid period of {} days", period_days))
            })?;

        let expected_return_pct = ((target_price - current) / current)
            .checked_mul(Decimal::ONE_HUNDRED)
            .ok_or_else(|| overflow(current))?
            .round_half_up(1);

        Ok(Projection {
            current_price: current,
            target_price,
            expected_return_pct,
            period_days,
            target_date,
            basis,
        })
    }

    /// 변동성 기반 목표가 (목표가, 변동성, 성장률).
    fn volatility_target(
        &self,
        series: &NormalizedSeries,
        current: Price,
    ) -> PatternResult<(Price, Ratio, Ratio)> {
        let points = series.points();
        let start = points.len().saturating_sub(self.volatility_window);
        let window = &points[start..];

        let high = window.iter().map(|p| p.close).max().unwrap_or(current);
        let low = window.iter().map(|p| p.close).min().unwrap_or(current);

        let volatility = if low > Decimal::ZERO {
            (high - low) / low
        } else {
            self.default_volatility
        };
        let growth = volatility.max(self.min_growth);

        let mut target = Decimal::ONE
            .checked_add(growth)
            .and_then(|factor| current.checked_mul(factor))
            .ok_or_else(|| overflow(current))?
            .round_half_up(0);
        if target <= current {
            let floor = current
                .checked_mul(FLOOR_MULTIPLIER)
                .ok_or_else(|| overflow(current))?;
            target = floor.round_half_up(0);
            if target <= current {
                // 1 미만 저가주는 반올림만으로 현재가를 넘지 못함
                target = floor.ceil();
            }
        }

        Ok((target, volatility, growth))
    }
}

fn overflow(current: Price) -> PatternError {
    PatternError::NoProjection(format!("target overflows decimal range at price {}", current))
}

/// 레코드 평균 기간 (일, 소수점 버림).
fn mean_period(records: &[RetestRecord]) -> Option<i64> {
    if records.is_empty() {
        return None;
    }
    let total: i64 = records.iter().map(|r| r.period_days).sum();
    Some(total / records.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use swing_core::PricePoint;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
    }

    fn series(closes: &[Decimal]) -> NormalizedSeries {
        NormalizedSeries::new(
            closes
                .iter()
                .enumerate()
                .map(|(i, c)| PricePoint::from_close(day(i as i64), *c))
                .collect(),
        )
    }

    fn record(kind: TargetKind, target: Decimal, period: i64) -> RetestRecord {
        RetestRecord {
            b_date: day(0),
            b_price: dec!(100),
            t_date: day(5),
            retest_date: day(8),
            retest_price: dec!(95),
            target_kind: kind,
            target_price: target,
            target_date: day(period),
            period_days: period,
        }
    }

    #[test]
    fn test_case_a_uses_last_record() {
        let s = series(&[dec!(100), dec!(120), dec!(110)]);
        let retests = vec![
            record(TargetKind::NextPeak, dec!(150), 10),
            record(TargetKind::FutureHigh, dec!(132), 20),
        ];
        let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let p = TargetProjector::default()
            .project(&s, &retests, &[], as_of)
            .unwrap();

        assert_eq!(p.current_price, dec!(110));
        assert_eq!(p.target_price, dec!(132));
        assert_eq!(p.period_days, 20);
        assert_eq!(p.target_date, NaiveDate::from_ymd_opt(2025, 3, 21).unwrap());
        assert_eq!(p.expected_return_pct, dec!(20.0));
        assert!(p.is_confirmed());
    }

    #[test]
    fn test_case_b_volatility_fallback() {
        // 최근 변동성 (150-100)/100 = 0.5
        let s = series(&[dec!(100), dec!(150), dec!(120)]);
        let as_of = day(100);
        let p = TargetProjector::default().project(&s, &[], &[], as_of).unwrap();

        assert_eq!(p.target_price, dec!(180));
        assert_eq!(p.expected_return_pct, dec!(50.0));
        assert_eq!(p.period_days, 30);
        assert_eq!(p.target_date, day(130));
        assert_eq!(
            p.basis,
            ProjectionBasis::Volatility {
                volatility: dec!(0.5),
                growth: dec!(0.5)
            }
        );
    }

    #[test]
    fn test_case_b_min_growth_floor() {
        let s = series(&[dec!(1000), dec!(1010), dec!(1005)]);
        let p = TargetProjector::default().project(&s, &[], &[], day(0)).unwrap();
        // 변동성 1% < 10% 하한
        assert_eq!(p.target_price, dec!(1106));
        assert_eq!(p.expected_return_pct, dec!(10.0));
    }

    #[test]
    fn test_case_b_period_from_history() {
        let s = series(&[dec!(100), dec!(101)]);
        let history = vec![
            record(TargetKind::NextPeak, dec!(150), 10),
            record(TargetKind::NextPeak, dec!(150), 15),
        ];
        let p = TargetProjector::default().project(&s, &[], &history, day(0)).unwrap();
        // (10 + 15) / 2 = 12.5 → 12
        assert_eq!(p.period_days, 12);
    }

    #[test]
    fn test_penny_price_still_rises() {
        let s = series(&[dec!(0.4), dec!(0.4)]);
        let p = TargetProjector::default().project(&s, &[], &[], day(0)).unwrap();
        assert!(p.target_price > p.current_price);
        assert_eq!(p.target_price, dec!(1));
    }

    #[test]
    fn test_volatility_on_open_high_mode() {
        let s = series(&[dec!(100), dec!(150), dec!(120)]);
        let retests = vec![
            record(TargetKind::NextPeak, dec!(150), 10),
            record(TargetKind::FutureHigh, dec!(132), 21),
        ];
        let projector = TargetProjector::default().with_mode(ProjectionMode::VolatilityOnOpenHigh);
        let p = projector.project(&s, &retests, &[], day(0)).unwrap();

        assert_eq!(p.target_price, dec!(180));
        assert_eq!(p.period_days, 15);
        assert!(!p.is_confirmed());

        // 마지막이 NEXT_PEAK이면 Case A 그대로
        let retests = vec![record(TargetKind::NextPeak, dec!(150), 10)];
        let p = projector.project(&s, &retests, &[], day(0)).unwrap();
        assert_eq!(p.target_price, dec!(150));
        assert!(p.is_confirmed());
    }

    #[test]
    fn test_no_projection_cases() {
        let projector = TargetProjector::default();
        let err = projector
            .project(&NormalizedSeries::default(), &[], &[], day(0))
            .unwrap_err();
        assert!(err.is_no_projection());
        assert!(err.to_string().starts_with("no target could be projected"));

        let zero = series(&[dec!(10), dec!(0)]);
        assert!(projector.project(&zero, &[], &[], day(0)).unwrap_err().is_no_projection());
    }

    #[test]
    fn test_overflowing_target_is_no_projection() {
        let huge = Decimal::from_i128_with_scale(7 * 10i128.pow(28), 0);
        let s = series(&[dec!(1), huge]);
        let err = TargetProjector::default().project(&s, &[], &[], day(0)).unwrap_err();
        assert!(err.is_no_projection());
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_zero_low_uses_default_volatility() {
        let s = series(&[dec!(0), dec!(100)]);
        let p = TargetProjector::default().project(&s, &[], &[], day(0)).unwrap();
        assert_eq!(p.target_price, dec!(120));
    }
}
