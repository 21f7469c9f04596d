//! 돌파(B) / 고점(T) 탐지.
//!
//! # 알고리즘
//!
//! 1. `running_high`를 첫 종가로 초기화
//! 2. 종가가 `running_high`를 넘으면 B 등록
//! 3. B 이후 처음으로 `B × (1 + rise_threshold)` 이상인 지점을 찾음
//! 4. 찾으면 비감소 구간 끝까지 연장해 T 등록, `running_high = T`,
//!    외부 스캔은 T 다음 인덱스부터 재개
//! 5. 못 찾으면 T 없이 `running_high = B`로 갱신하고 다음 인덱스로 진행
//!
//! 최악의 경우 O(n²)이지만 수년치 일봉(수천 개)에는 충분합니다.

use super::{PatternError, PatternResult};
use rust_decimal::Decimal;
use serde::Serialize;
use swing_core::{BreakoutPoint, NormalizedSeries, PeakPoint};
use tracing::debug;

/// B/T 탐지 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetectionResult {
    /// 돌파 지점 (날짜 오름차순)
    pub breakouts: Vec<BreakoutPoint>,
    /// 고점 (날짜 오름차순)
    pub peaks: Vec<PeakPoint>,
}

/// 돌파/고점 탐지기.
#[derive(Debug, Clone)]
pub struct BreakoutPeakDetector {
    /// B 대비 최소 상승률 (기본: 0.3 = 30%)
    rise_threshold: Decimal,
}

impl Default for BreakoutPeakDetector {
    fn default() -> Self {
        Self {
            rise_threshold: Decimal::new(3, 1),
        }
    }
}

impl BreakoutPeakDetector {
    /// 새 탐지기 생성.
    pub fn new(rise_threshold: Decimal) -> PatternResult<Self> {
        if rise_threshold <= Decimal::ZERO {
            return Err(PatternError::InvalidParameter(format!(
                "rise_threshold must be positive, got {}",
                rise_threshold
            )));
        }
        Ok(Self { rise_threshold })
    }

    /// 상승 임계값.
    pub fn rise_threshold(&self) -> Decimal {
        self.rise_threshold
    }

    /// 시계열을 한 번 훑어 B/T 목록을 만듭니다.
    pub fn detect(&self, series: &NormalizedSeries) -> DetectionResult {
        let n = series.len();
        let mut result = DetectionResult::default();
        if n == 0 {
            return result;
        }

        let multiplier = Decimal::ONE + self.rise_threshold;
        let mut running_high = series.close(0);
        let mut i = 1;

        while i < n {
            let close = series.close(i);
            if close <= running_high {
                i += 1;
                continue;
            }

            let breakout = BreakoutPoint {
                date: series.date(i),
                price: close,
                index: i,
            };
            debug!(date = %breakout.date, price = %breakout.price, "Breakout registered");
            result.breakouts.push(breakout);

            let target = close * multiplier;
            match (i + 1..n).find(|&j| series.close(j) >= target) {
                Some(first_hit) => {
                    let mut peak_idx = first_hit;
                    while peak_idx + 1 < n && series.close(peak_idx + 1) >= series.close(peak_idx) {
                        peak_idx += 1;
                    }

                    let peak = PeakPoint {
                        date: series.date(peak_idx),
                        price: series.close(peak_idx),
                        index: peak_idx,
                        breakout_date: series.date(i),
                    };
                    debug!(date = %peak.date, price = %peak.price, "Peak registered");

                    running_high = peak.price;
                    result.peaks.push(peak);
                    // 상승 구간에 포함된 인덱스는 다시 보지 않음
                    i = peak_idx + 1;
                }
                None => {
                    running_high = close;
                    i += 1;
                }
            }
        }

        result
    }
}
