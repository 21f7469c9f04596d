//! 종목 단위 분석 파이프라인.
//!
//! normalize → detect → analyze-retests → project 순서로 실행합니다.

use super::{
    BreakoutPeakDetector, PatternError, PatternResult, RetestAnalyzer, SeriesNormalizer,
    TargetProjector,
};
use chrono::NaiveDate;
use serde::Serialize;
use swing_core::{
    kst_today, AnalysisConfig, BreakoutPoint, NormalizedSeries, PeakPoint, PricePoint,
    Projection, RetestRecord, SeriesAdjustment,
};
use tracing::{debug, warn};

/// 종목 1회 분석 결과.
#[derive(Debug, Clone, Serialize)]
pub struct PatternReport {
    /// 기준일
    pub as_of: NaiveDate,
    /// 보정된 시계열
    #[serde(skip)]
    pub series: NormalizedSeries,
    /// 보정된 일봉 개수
    pub series_len: usize,
    /// 불연속 보정 내역
    pub adjustments: Vec<SeriesAdjustment>,
    /// 돌파 지점
    pub breakouts: Vec<BreakoutPoint>,
    /// 고점
    pub peaks: Vec<PeakPoint>,
    /// 리테스트 레코드
    pub retests: Vec<RetestRecord>,
    /// 목표가 예측 (산출 불가 시 None)
    pub projection: Option<Projection>,
    /// 목표가 미산출 사유
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<String>,
}

impl PatternReport {
    /// 목표가를 반환하거나 미산출 오류를 돌려줍니다.
    pub fn require_projection(&self) -> PatternResult<&Projection> {
        self.projection.as_ref().ok_or_else(|| {
            PatternError::NoProjection(
                self.unavailable_reason
                    .clone()
                    .unwrap_or_else(|| "unknown reason".to_string()),
            )
        })
    }

    /// 현재가 (마지막 보정 종가).
    pub fn current_price(&self) -> Option<rust_decimal::Decimal> {
        self.series.last_close()
    }
}

/// 돌파/리테스트 분석기.
#[derive(Debug, Clone, Default)]
pub struct BreakoutRetestAnalyzer {
    config: AnalysisConfig,
}

impl BreakoutRetestAnalyzer {
    /// 설정으로 분석기 생성.
    ///
    /// 설정 검증은 `analyze` 호출 시 스캔 전에 수행됩니다.
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// 분석 설정.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// 오늘(한국 시간) 기준으로 분석합니다.
    pub fn analyze_today(&self, points: &[PricePoint]) -> PatternResult<PatternReport> {
        self.analyze(points, kst_today())
    }

    /// 가격 시계열을 분석합니다.
    pub fn analyze(&self, points: &[PricePoint], as_of: NaiveDate) -> PatternResult<PatternReport> {
        self.analyze_with_history(points, &[], as_of)
    }

    /// 과거 리테스트 레코드를 함께 넘겨 분석합니다.
    ///
    /// `history`는 이번 분석에서 레코드가 하나도 없을 때 폴백 기간 산출에만 쓰입니다.
    pub fn analyze_with_history(
        &self,
        points: &[PricePoint],
        history: &[RetestRecord],
        as_of: NaiveDate,
    ) -> PatternResult<PatternReport> {
        self.config.validate()?;

        let normalizer = SeriesNormalizer::new(self.config.discontinuity_threshold)?;
        let detector = BreakoutPeakDetector::new(self.config.rise_threshold)?;
        let projector = TargetProjector::from_config(&self.config);

        if points.len() < 2 {
            warn!(count = points.len(), "Series too short for pattern detection");
        }

        let normalized = normalizer.normalize(points);
        let series = normalized.series;
        let detection = detector.detect(&series);
        let retests = RetestAnalyzer::new().analyze(&series, &detection.breakouts, &detection.peaks);

        debug!(
            points = series.len(),
            adjustments = normalized.adjustments.len(),
            breakouts = detection.breakouts.len(),
            peaks = detection.peaks.len(),
            retests = retests.len(),
            "Pattern scan completed"
        );

        let (projection, unavailable_reason) =
            match projector.project(&series, &retests, history, as_of) {
                Ok(projection) => (Some(projection), None),
                Err(PatternError::NoProjection(reason)) => {
                    warn!(%reason, "No target could be projected");
                    (None, Some(reason))
                }
                Err(other) => return Err(other),
            };

        Ok(PatternReport {
            as_of,
            series_len: series.len(),
            series,
            adjustments: normalized.adjustments,
            breakouts: detection.breakouts,
            peaks: detection.peaks,
            retests,
            projection,
            unavailable_reason,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn points(closes: &[rust_decimal::Decimal]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| PricePoint::from_close(start + Duration::days(i as i64), *c))
            .collect()
    }

    #[test]
    fn test_invalid_config_rejected_before_scan() {
        let analyzer =
            BreakoutRetestAnalyzer::new(AnalysisConfig::default().with_rise_threshold(dec!(-0.3)));
        let err = analyzer
            .analyze(&points(&[dec!(1), dec!(2)]), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .unwrap_err();
        assert!(matches!(err, PatternError::InvalidParameter(_)));
    }

    #[test]
    fn test_empty_series_reports_no_projection() {
        let report = BreakoutRetestAnalyzer::default()
            .analyze(&[], NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .unwrap();

        assert_eq!(report.series_len, 0);
        assert!(report.breakouts.is_empty());
        assert!(report.projection.is_none());
        let err = report.require_projection().unwrap_err();
        assert!(err.to_string().starts_with("no target could be projected"));
    }

    #[test]
    fn test_single_point_uses_fallback() {
        let report = BreakoutRetestAnalyzer::default()
            .analyze(&points(&[dec!(1000)]), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .unwrap();
        let projection = report.require_projection().unwrap();
        assert_eq!(projection.target_price, dec!(1100));
        assert_eq!(projection.period_days, 30);
    }

    #[test]
    fn test_report_serializes_without_series() {
        let report = BreakoutRetestAnalyzer::default()
            .analyze(
                &points(&[dec!(100), dec!(101)]),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            )
            .unwrap();
        let value = serde_json::to_value(&report).unwrap();
        assert!(value.get("series").is_none());
        assert_eq!(value["series_len"], 2);
        assert!(value.get("unavailable_reason").is_none());
    }
}
