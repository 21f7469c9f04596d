//! 다종목 배치 분석.
//!
//! 종목 간에는 공유 상태가 없으므로 `buffer_unordered`로 동시 실행합니다.
//! 조회 실패나 목표가 미산출 종목은 건너뛰고 배치는 계속 진행합니다.

use crate::pattern::{BreakoutRetestAnalyzer, PatternReport, PatternResult};
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::time::Instant;
use swing_core::{analysis_span, AnalysisConfig, Instrument, Projection};
use swing_data::{PriceStore, SeriesCache};
use tracing::{info, warn, Instrument as _};

/// 종목별 분석 결과.
#[derive(Debug, Clone, Serialize)]
pub struct InstrumentReport {
    pub instrument: Instrument,
    pub report: PatternReport,
}

impl InstrumentReport {
    /// 목표가 예측.
    pub fn projection(&self) -> Option<&Projection> {
        self.report.projection.as_ref()
    }

    pub fn code(&self) -> &str {
        &self.instrument.code
    }
}

/// 건너뛴 종목과 사유.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedInstrument {
    pub instrument: Instrument,
    pub reason: String,
}

/// 배치 분석 결과 (종목 코드 오름차순).
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub reports: Vec<InstrumentReport>,
    pub skipped: Vec<SkippedInstrument>,
}

/// 배치 분석기.
#[derive(Debug, Clone)]
pub struct BatchAnalyzer {
    analyzer: BreakoutRetestAnalyzer,
    max_concurrency: usize,
}

impl BatchAnalyzer {
    /// 새 배치 분석기 생성.
    pub fn new(config: AnalysisConfig, max_concurrency: usize) -> Self {
        Self {
            analyzer: BreakoutRetestAnalyzer::new(config),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// 종목 목록을 분석합니다.
    ///
    /// 설정 오류만 전체 실패로 처리합니다.
    pub async fn run(
        &self,
        instruments: &[Instrument],
        store: &dyn PriceStore,
        cache: &SeriesCache,
        as_of: NaiveDate,
    ) -> PatternResult<BatchOutcome> {
        self.analyzer.config().validate()?;

        let start_time = Instant::now();
        let results: Vec<Result<InstrumentReport, SkippedInstrument>> =
            stream::iter(instruments.iter().cloned())
                .map(|instrument| {
                    let span = analysis_span!("analyze_instrument", instrument.code, as_of);
                    self.analyze_one(instrument, store, cache, as_of)
                        .instrument(span)
                })
                .buffer_unordered(self.max_concurrency)
                .collect()
                .await;

        let mut outcome = BatchOutcome::default();
        for result in results {
            match result {
                Ok(report) => outcome.reports.push(report),
                Err(skipped) => outcome.skipped.push(skipped),
            }
        }
        outcome.reports.sort_by(|a, b| a.instrument.code.cmp(&b.instrument.code));
        outcome.skipped.sort_by(|a, b| a.instrument.code.cmp(&b.instrument.code));

        info!(
            total = instruments.len(),
            analyzed = outcome.reports.len(),
            skipped = outcome.skipped.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Batch analysis completed"
        );

        Ok(outcome)
    }

    async fn analyze_one(
        &self,
        instrument: Instrument,
        store: &dyn PriceStore,
        cache: &SeriesCache,
        as_of: NaiveDate,
    ) -> Result<InstrumentReport, SkippedInstrument> {
        let points = match cache.get_or_fetch(&instrument.code, store).await {
            Ok(points) => points,
            Err(e) => {
                warn!(error = %e, "Price fetch failed, skipping");
                return Err(SkippedInstrument {
                    instrument,
                    reason: e.to_string(),
                });
            }
        };

        match self.analyzer.analyze(&points, as_of) {
            Ok(report) if report.projection.is_some() => Ok(InstrumentReport { instrument, report }),
            Ok(report) => {
                let reason = report
                    .require_projection()
                    .err()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                warn!(%reason, "Skipping instrument without projection");
                Err(SkippedInstrument { instrument, reason })
            }
            Err(e) => {
                warn!(error = %e, "Analysis failed, skipping");
                Err(SkippedInstrument {
                    instrument,
                    reason: e.to_string(),
                })
            }
        }
    }
}
