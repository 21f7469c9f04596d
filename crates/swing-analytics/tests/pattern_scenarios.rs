//! 돌파/리테스트 패턴 시나리오 테스트.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use swing_analytics::{
    BreakoutPeakDetector, BreakoutRetestAnalyzer, RetestAnalyzer, SeriesNormalizer,
    TargetProjector,
};
use swing_core::{AnalysisConfig, NormalizedSeries, PricePoint, ProjectionBasis, TargetKind};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

fn points(closes: &[Decimal]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, c)| PricePoint::from_close(start() + Duration::days(i as i64), *c))
        .collect()
}

fn raw_series(closes: &[Decimal]) -> NormalizedSeries {
    NormalizedSeries::new(points(closes))
}

/// 100에서 시작해 매일 1%씩 오르는 100일 시계열.
fn steady_rise() -> Vec<Decimal> {
    let mut closes = vec![dec!(100)];
    for _ in 1..100 {
        let next = (closes[closes.len() - 1] * dec!(1.01)).round_dp(4);
        closes.push(next);
    }
    closes
}

#[test]
fn test_steady_rise_single_leg_to_series_end() {
    let closes = steady_rise();
    let report = BreakoutRetestAnalyzer::default()
        .analyze(&points(&closes), as_of())
        .unwrap();

    assert!(report.adjustments.is_empty());
    assert_eq!(report.breakouts.len(), 1);
    assert_eq!(report.breakouts[0].index, 1);
    assert_eq!(report.peaks.len(), 1);
    // 131.3 첫 도달은 28번째 날, 비감소 구간은 끝까지 이어짐
    assert_eq!(report.peaks[0].index, 99);
    assert!(report.retests.is_empty());

    let projection = report.require_projection().unwrap();
    assert_eq!(projection.current_price, closes[99]);
    assert!(projection.target_price > projection.current_price);
    assert!(matches!(projection.basis, ProjectionBasis::Volatility { .. }));
    assert_eq!(projection.period_days, 30);
    assert_eq!(projection.target_date, as_of() + Duration::days(30));
}

#[test]
fn test_doubling_discontinuity_rebased() {
    let mut closes: Vec<Decimal> = (0..50).map(|i| Decimal::from(1000 + i)).collect();
    for i in 50..80 {
        closes.push(Decimal::from(2 * (1000 + i - 1)));
    }

    let outcome = SeriesNormalizer::default().normalize(&points(&closes));
    assert_eq!(outcome.adjustments.len(), 1);
    assert_eq!(outcome.adjustments[0].ratio, dec!(2));
    assert_eq!(outcome.adjustments[0].date, start() + Duration::days(50));

    let series = outcome.series;
    for i in 0..50 {
        assert_eq!(series.close(i), Decimal::from(2 * (1000 + i as i64)));
    }
    assert_eq!(series.close(49) / series.close(50), dec!(1));
}

#[test]
fn test_unconfirmed_breakout_falls_back() {
    let closes = [dec!(100), dec!(140), dec!(90), dec!(150)];

    let detection = BreakoutPeakDetector::default().detect(&raw_series(&closes));
    assert_eq!(detection.breakouts[0].index, 1);
    assert_eq!(detection.breakouts[0].price, dec!(140));
    assert!(detection.peaks.is_empty());

    // 불연속 보정이 가격을 건드리지 않도록 임계값을 넓힌 파이프라인
    let config = AnalysisConfig::default().with_discontinuity_threshold(dec!(0.9));
    let report = BreakoutRetestAnalyzer::new(config)
        .analyze(&points(&closes), as_of())
        .unwrap();
    assert!(report.adjustments.is_empty());
    assert!(report.peaks.is_empty());
    assert!(report.retests.is_empty());
    let projection = report.require_projection().unwrap();
    assert!(!projection.is_confirmed());
    // (150 - 90) / 90 = 0.666.. → 150 × 1.666.. = 250
    assert_eq!(projection.target_price, dec!(250));
}

#[test]
fn test_second_breakout_before_any_peak() {
    let closes = [dec!(100), dec!(140), dec!(95), dec!(160)];
    let series = raw_series(&closes);
    let detection = BreakoutPeakDetector::default().detect(&series);

    // 160은 140 × 1.3 = 182 에 못 미쳐 T가 아니라 새 B
    let b: Vec<usize> = detection.breakouts.iter().map(|b| b.index).collect();
    assert_eq!(b, vec![1, 3]);
    assert!(detection.peaks.is_empty());
    let retests = RetestAnalyzer::new().analyze(&series, &detection.breakouts, &detection.peaks);
    assert!(retests.is_empty());

    let config = AnalysisConfig::default().with_discontinuity_threshold(dec!(0.9));
    let report = BreakoutRetestAnalyzer::new(config)
        .analyze(&points(&closes), as_of())
        .unwrap();
    assert!(report.adjustments.is_empty());
    assert_eq!(report.breakouts.len(), 2);
    assert!(report.peaks.is_empty());
    assert!(report.retests.is_empty());

    let projection = report.require_projection().unwrap();
    assert!(matches!(projection.basis, ProjectionBasis::Volatility { .. }));
    // (160 - 95) / 95 = 0.684.. → 160 × 1.684.. = 269.47 → 269
    assert_eq!(projection.target_price, dec!(269));
    assert_eq!(projection.period_days, 30);
}

#[test]
fn test_leg_belongs_to_first_unresolved_breakout() {
    let closes = [
        dec!(100),
        dec!(140),
        dec!(95),
        dec!(160),
        dec!(210),
        dec!(220),
        dec!(200),
        dec!(230),
    ];
    let series = raw_series(&closes);
    let detection = BreakoutPeakDetector::default().detect(&series);

    // 140 × 1.3 = 182 이상인 210(4)에서 비감소 구간 끝 220(5)까지가 한 구간
    let b: Vec<usize> = detection.breakouts.iter().map(|b| b.index).collect();
    assert_eq!(b, vec![1, 7]);
    assert_eq!(detection.peaks.len(), 1);
    assert_eq!(detection.peaks[0].index, 5);
    assert_eq!(detection.peaks[0].breakout_date, series.date(1));
}

#[test]
fn test_retest_before_second_peak_targets_next_peak() {
    let closes = [
        dec!(100),
        dec!(101),
        dec!(140),
        dec!(95),
        dec!(120),
        dec!(150),
        dec!(200),
        dec!(180),
    ];
    let series = raw_series(&closes);
    let detection = BreakoutPeakDetector::default().detect(&series);
    assert_eq!(detection.peaks.len(), 2);

    let retests = RetestAnalyzer::new().analyze(&series, &detection.breakouts, &detection.peaks);
    assert_eq!(retests.len(), 1);
    let record = &retests[0];
    assert_eq!(record.b_price, dec!(101));
    assert_eq!(record.retest_date, series.date(3));
    assert_eq!(record.target_kind, TargetKind::NextPeak);
    assert_eq!(record.target_price, dec!(200));
    assert_eq!(record.target_date, series.date(6));
    assert_eq!(record.period_days, 5);

    let projection = TargetProjector::default()
        .project(&series, &retests, &[], as_of())
        .unwrap();
    assert_eq!(projection.target_price, dec!(200));
    assert_eq!(projection.expected_return_pct, dec!(11.1));
    assert_eq!(projection.period_days, 5);
    assert_eq!(projection.target_date, as_of() + Duration::days(5));
}

#[test]
fn test_steep_climb_overflow_reports_no_projection() {
    // 매일 29% 상승: 불연속 임계값(30%) 안쪽이지만 변동성 목표가는 Decimal 범위를 넘음
    let mut closes = vec![Decimal::from_i128_with_scale(10i128.pow(16), 0)];
    for _ in 1..60 {
        let next = (closes[closes.len() - 1] * dec!(1.29)).round_dp(0);
        closes.push(next);
    }

    let report = BreakoutRetestAnalyzer::default()
        .analyze(&points(&closes), as_of())
        .unwrap();
    assert!(report.adjustments.is_empty());
    assert!(report.projection.is_none());
    assert!(report.require_projection().unwrap_err().is_no_projection());
}
