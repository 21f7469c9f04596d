//! 단일 종목 분석 명령.

use super::output::{to_csv, to_json, write_output, OutputFormat};
use super::source::DataSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use swing_analytics::{BreakoutRetestAnalyzer, InstrumentReport, PatternReport};
use swing_core::{AnalysisConfig, DecimalExt, Instrument, ProjectionBasis};
use tracing::info;

/// 분석 명령 설정.
#[derive(Debug)]
pub struct AnalyzeConfig {
    /// 종목 코드
    pub code: String,
    /// 기준일
    pub as_of: NaiveDate,
    /// 출력 형식
    pub format: OutputFormat,
    /// 출력 파일 경로
    pub output: Option<String>,
}

/// 종목 하나를 분석하고 결과를 출력합니다.
pub async fn run_analyze(
    analysis: &AnalysisConfig,
    source: &DataSource,
    config: AnalyzeConfig,
) -> Result<()> {
    let instrument = source.instrument(&config.code).await;
    let points = source
        .cache
        .get_or_fetch(&config.code, source.store.as_ref())
        .await
        .with_context(|| format!("Failed to load prices for {}", config.code))?;

    info!(code = %config.code, points = points.len(), "Analyzing instrument");
    let report = BreakoutRetestAnalyzer::new(analysis.clone())
        .analyze(&points, config.as_of)
        .context("Analysis failed")?;

    let content = match config.format {
        OutputFormat::Table => format_report(&instrument, &report),
        OutputFormat::Csv => to_csv(&report.retests)?,
        OutputFormat::Json => to_json(&InstrumentReport { instrument, report })?,
    };
    write_output(&content, config.output.as_deref())
}

/// 분석 결과를 사람이 읽는 표로 만듭니다.
pub fn format_report(instrument: &Instrument, report: &PatternReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("📈 {} | 기준일 {}\n", instrument, report.as_of));
    output.push_str(&format!("일봉 {}개", report.series_len));
    if !report.adjustments.is_empty() {
        output.push_str(&format!(", 불연속 보정 {}건", report.adjustments.len()));
    }
    output.push_str("\n\n");

    for adj in &report.adjustments {
        output.push_str(&format!(
            "  보정 {}: {} → {} (x{})\n",
            adj.date,
            adj.close_before.round_half_up(2),
            adj.close_after.round_half_up(2),
            adj.ratio.round_half_up(4)
        ));
    }
    if !report.adjustments.is_empty() {
        output.push('\n');
    }

    output.push_str(&format!("{:<6} {:<12} {:>14}\n", "POINT", "DATE", "PRICE"));
    output.push_str(&"-".repeat(34));
    output.push('\n');
    for b in &report.breakouts {
        output.push_str(&format!(
            "{:<6} {:<12} {:>14}\n",
            "B",
            b.date.to_string(),
            b.price.round_half_up(2)
        ));
    }
    for t in &report.peaks {
        output.push_str(&format!(
            "{:<6} {:<12} {:>14}\n",
            "T",
            t.date.to_string(),
            t.price.round_half_up(2)
        ));
    }

    if !report.retests.is_empty() {
        output.push_str(&format!(
            "\n{:<12} {:>12} {:<12} {:<12} {:<12} {:>12} {:<12} {:>6}\n",
            "B_DATE", "B_PRICE", "T_DATE", "RETEST", "TARGET", "TARGET_PX", "TARGET_DATE", "DAYS"
        ));
        output.push_str(&"-".repeat(98));
        output.push('\n');
        for r in &report.retests {
            output.push_str(&format!(
                "{:<12} {:>12} {:<12} {:<12} {:<12} {:>12} {:<12} {:>6}\n",
                r.b_date.to_string(),
                r.b_price.round_half_up(2),
                r.t_date.to_string(),
                r.retest_date.to_string(),
                r.target_kind.to_string(),
                r.target_price.round_half_up(2),
                r.target_date.to_string(),
                r.period_days
            ));
        }
    }

    output.push('\n');
    match (&report.projection, &report.unavailable_reason) {
        (Some(p), _) => {
            let basis = match &p.basis {
                ProjectionBasis::Retest { target_kind, b_date } => {
                    format!("리테스트 ({}, B {})", target_kind, b_date)
                }
                ProjectionBasis::Volatility { volatility, .. } => {
                    format!("변동성 폴백 ({})", volatility.to_percentage_string())
                }
            };
            output.push_str(&format!("💰 현재가: {}\n", p.current_price.round_half_up(2)));
            output.push_str(&format!("🎯 목표가: {}\n", p.target_price.round_half_up(2)));
            output.push_str(&format!("📊 예상 수익률: {}%\n", p.expected_return_pct));
            output.push_str(&format!("⏳ 예상 기간: {}일\n", p.period_days));
            output.push_str(&format!("📅 예상 도달일: {}\n", p.target_date));
            output.push_str(&format!("근거: {}", basis));
        }
        (None, reason) => {
            output.push_str(&format!(
                "no target could be projected: {}",
                reason.as_deref().unwrap_or("unknown reason")
            ));
        }
    }

    output
}
