//! 목표가 기반 종목 랭킹.
//!
//! - 수익률 TOP N: 기대 수익률 내림차순 (동률: 도달일 빠른 순, 종목 코드 순)
//! - 도달일 TOP N: 예상 도달일 오름차순 (동률: 수익률 높은 순, 종목 코드 순)
//!
//! 목표가가 있는 종목만 참여합니다.

use crate::batch::InstrumentReport;
use std::cmp::Ordering;
use swing_core::Projection;

fn ranked<'a>(
    reports: &'a [InstrumentReport],
    n: usize,
    compare: impl Fn(&Projection, &Projection) -> Ordering,
) -> Vec<&'a InstrumentReport> {
    let mut candidates: Vec<(&InstrumentReport, &Projection)> = reports
        .iter()
        .filter_map(|r| r.projection().map(|p| (r, p)))
        .collect();

    candidates.sort_by(|(ra, pa), (rb, pb)| compare(pa, pb).then_with(|| ra.code().cmp(rb.code())));
    candidates.into_iter().take(n).map(|(r, _)| r).collect()
}

/// 기대 수익률 상위 N개.
pub fn rank_by_return(reports: &[InstrumentReport], n: usize) -> Vec<&InstrumentReport> {
    ranked(reports, n, |a, b| {
        b.expected_return_pct
            .cmp(&a.expected_return_pct)
            .then_with(|| a.target_date.cmp(&b.target_date))
    })
}

/// 예상 도달일이 빠른 N개.
pub fn rank_by_arrival(reports: &[InstrumentReport], n: usize) -> Vec<&InstrumentReport> {
    ranked(reports, n, |a, b| {
        a.target_date
            .cmp(&b.target_date)
            .then_with(|| b.expected_return_pct.cmp(&a.expected_return_pct))
    })
}
