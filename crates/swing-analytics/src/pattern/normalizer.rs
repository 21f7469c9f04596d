//! 불연속 보정 (Series Normalizer).
//!
//! 공시 없이 발생한 액면분할·병합처럼 종가가 하루 만에 임계값 이상 변하면
//! 그 이전 구간 전체를 당일 스케일로 다시 맞춥니다. 보정은 누적되므로
//! 두 번째 불연속은 이미 보정된 과거 구간을 한 번 더 보정합니다.

use super::{PatternError, PatternResult};
use rust_decimal::Decimal;
use swing_core::{NormalizedSeries, PricePoint, SeriesAdjustment};
use tracing::{info, warn};

/// 보정 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizationOutcome {
    /// 보정된 시계열
    pub series: NormalizedSeries,
    /// 보정 내역 (감사용)
    pub adjustments: Vec<SeriesAdjustment>,
}

/// 불연속 보정기.
#[derive(Debug, Clone)]
pub struct SeriesNormalizer {
    /// 허용 일간 변동률 (기본: 0.3 = 30%)
    threshold: Decimal,
}

impl Default for SeriesNormalizer {
    fn default() -> Self {
        Self {
            threshold: Decimal::new(3, 1),
        }
    }
}

impl SeriesNormalizer {
    /// 새 보정기 생성.
    ///
    /// `threshold`는 0보다 커야 합니다.
    pub fn new(threshold: Decimal) -> PatternResult<Self> {
        if threshold <= Decimal::ZERO {
            return Err(PatternError::InvalidParameter(format!(
                "discontinuity_threshold must be positive, got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    /// 임계값.
    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// 시계열을 보정합니다.
    ///
    /// `points`는 날짜 오름차순이어야 합니다. 직전 종가나 당일 종가가
    /// 0 이하인 지점은 비율을 정의할 수 없으므로 경고만 남기고 건너뜁니다.
    pub fn normalize(&self, points: &[PricePoint]) -> NormalizationOutcome {
        let mut points = points.to_vec();
        let mut adjustments = Vec::new();
        let upper = Decimal::ONE + self.threshold;
        let lower = Decimal::ONE - self.threshold;

        for i in 1..points.len() {
            let prev = points[i - 1].close;
            let current = points[i].close;

            if prev <= Decimal::ZERO {
                warn!(date = %points[i].date, prev_close = %prev, "Non-positive prior close, skipping ratio check");
                continue;
            }
            if current <= Decimal::ZERO {
                warn!(date = %points[i].date, close = %current, "Non-positive close, skipping ratio check");
                continue;
            }

            let ratio = current / prev;
            if ratio > upper || ratio < lower {
                let rescaled: Option<Vec<PricePoint>> =
                    points[..i].iter().map(|p| p.rescaled(ratio)).collect();
                let Some(rescaled) = rescaled else {
                    warn!(date = %points[i].date, %ratio, "Rescaled prices overflow, skipping correction");
                    continue;
                };
                points[..i].clone_from_slice(&rescaled);

                let adjustment = SeriesAdjustment {
                    date: points[i].date,
                    close_before: prev,
                    close_after: points[i - 1].close,
                    ratio,
                };
                info!(
                    date = %adjustment.date,
                    close_before = %adjustment.close_before,
                    close_after = %adjustment.close_after,
                    ratio = %adjustment.ratio,
                    "Discontinuity corrected"
                );
                adjustments.push(adjustment);
            }
        }

        NormalizationOutcome {
            series: NormalizedSeries::new(points),
            adjustments,
        }
    }
}
