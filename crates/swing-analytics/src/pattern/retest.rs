//! 리테스트 분석.
//!
//! 각 T에 대해 그 이전(같은 위치 포함)의 모든 B를 짝지어,
//! T 이후 최저 종가가 B 가격 이하로 내려왔는지 확인합니다.
//! 되돌림이 확인되면 그 이후의 목표를 정합니다:
//!
//! - 리테스트일 이후 T가 있으면 `NEXT_PEAK` (그 T의 가격/날짜)
//! - 없으면 `FUTURE_HIGH` (리테스트일 이후 최고 종가)
//!
//! 최저/최고가 여러 날이면 가장 이른 날짜를 사용합니다.

use rust_decimal::Decimal;
use swing_core::{BreakoutPoint, NormalizedSeries, PeakPoint, RetestRecord, TargetKind};
use tracing::debug;

/// 리테스트 분석기.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetestAnalyzer;

/// T 하나에 대해 B와 무관하게 정해지는 값.
struct PeakAftermath {
    retest_idx: usize,
    retest_price: Decimal,
    target_kind: TargetKind,
    target_idx: usize,
}

impl RetestAnalyzer {
    /// 새 리테스트 분석기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 리테스트 레코드 목록을 만듭니다.
    ///
    /// 순서는 T 오름차순, 같은 T 안에서는 B 오름차순입니다.
    pub fn analyze(
        &self,
        series: &NormalizedSeries,
        breakouts: &[BreakoutPoint],
        peaks: &[PeakPoint],
    ) -> Vec<RetestRecord> {
        let mut records = Vec::new();
        if breakouts.is_empty() || peaks.is_empty() {
            return records;
        }

        for peak in peaks {
            let Some(aftermath) = Self::aftermath(series, peak, peaks) else {
                continue;
            };

            for breakout in breakouts.iter().filter(|b| b.index <= peak.index) {
                if aftermath.retest_price > breakout.price {
                    continue;
                }

                let target_date = series.date(aftermath.target_idx);
                let target_price = series.close(aftermath.target_idx);
                let record = RetestRecord {
                    b_date: breakout.date,
                    b_price: breakout.price,
                    t_date: peak.date,
                    retest_date: series.date(aftermath.retest_idx),
                    retest_price: aftermath.retest_price,
                    target_kind: aftermath.target_kind,
                    target_price,
                    target_date,
                    period_days: (target_date - breakout.date).num_days(),
                };
                debug!(
                    b_date = %record.b_date,
                    t_date = %record.t_date,
                    retest_date = %record.retest_date,
                    target_kind = %record.target_kind,
                    "Retest confirmed"
                );
                records.push(record);
            }
        }

        records
    }

    /// T 이후 최저 종가 지점과 그 이후 목표를 찾습니다.
    fn aftermath(
        series: &NormalizedSeries,
        peak: &PeakPoint,
        peaks: &[PeakPoint],
    ) -> Option<PeakAftermath> {
        let n = series.len();
        let retest_idx = first_extreme(series, peak.index, n, |c, best| c < best)?;
        let retest_price = series.close(retest_idx);

        let (target_kind, target_idx) = match peaks.iter().find(|p| p.index > retest_idx) {
            Some(next) => (TargetKind::NextPeak, next.index),
            None => (
                TargetKind::FutureHigh,
                first_extreme(series, retest_idx, n, |c, best| c > best)?,
            ),
        };

        Some(PeakAftermath {
            retest_idx,
            retest_price,
            target_kind,
            target_idx,
        })
    }
}

/// `[from, to)` 구간에서 `better`를 만족하는 첫 극값 위치.
fn first_extreme(
    series: &NormalizedSeries,
    from: usize,
    to: usize,
    better: impl Fn(Decimal, Decimal) -> bool,
) -> Option<usize> {
    if from >= to {
        return None;
    }
    let mut best_idx = from;
    for idx in from + 1..to {
        if better(series.close(idx), series.close(best_idx)) {
            best_idx = idx;
        }
    }
    Some(best_idx)
}
