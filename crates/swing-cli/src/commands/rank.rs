//! 예상 수익률 / 도달일 TOP-N 랭킹 명령.

use super::output::{to_csv, to_json, truncate, write_output, OutputFormat};
use super::source::DataSource;
use anyhow::Result;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use swing_analytics::{rank_by_arrival, rank_by_return, InstrumentReport};
use swing_core::{AppConfig, DecimalExt};

/// 랭킹 명령 설정.
#[derive(Debug)]
pub struct RankConfig {
    /// 순위별 종목 수
    pub top: usize,
    pub as_of: NaiveDate,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 랭킹 한 줄.
#[derive(Debug, Clone, Serialize)]
pub struct RankRow {
    /// "return" 또는 "arrival"
    pub ranking: &'static str,
    pub rank: usize,
    pub code: String,
    pub name: String,
    pub current_price: Decimal,
    pub target_price: Decimal,
    pub expected_return_pct: Decimal,
    pub period_days: i64,
    pub target_date: NaiveDate,
}

#[derive(Serialize)]
struct RankJson<'a> {
    by_return: &'a [RankRow],
    by_arrival: &'a [RankRow],
}

/// 랭킹 결과를 평평한 행 목록으로 바꿉니다.
pub fn to_rows(ranking: &'static str, ranked: &[&InstrumentReport]) -> Vec<RankRow> {
    ranked
        .iter()
        .filter_map(|r| r.projection().map(|p| (r, p)))
        .enumerate()
        .map(|(i, (r, p))| RankRow {
            ranking,
            rank: i + 1,
            code: r.instrument.code.clone(),
            name: r.instrument.name.clone(),
            current_price: p.current_price,
            target_price: p.target_price,
            expected_return_pct: p.expected_return_pct,
            period_days: p.period_days,
            target_date: p.target_date,
        })
        .collect()
}

/// 전체 종목을 분석하고 두 가지 랭킹을 출력합니다.
pub async fn run_rank(app: &AppConfig, source: &DataSource, config: RankConfig) -> Result<()> {
    let outcome = source.analyze_all(app, config.as_of).await?;

    let by_return = to_rows("return", &rank_by_return(&outcome.reports, config.top));
    let by_arrival = to_rows("arrival", &rank_by_arrival(&outcome.reports, config.top));

    let content = match config.format {
        OutputFormat::Table => {
            let mut text = format!(
                "📊 예상 수익률 TOP {} (기준일 {})\n",
                config.top, config.as_of
            );
            text.push_str(&format_rank_table(&by_return));
            text.push_str(&format!("\n⏳ 빠른 도달 TOP {}\n", config.top));
            text.push_str(&format_rank_table(&by_arrival));
            if !outcome.skipped.is_empty() {
                text.push_str(&format!("\n제외된 종목: {}개", outcome.skipped.len()));
            }
            text
        }
        OutputFormat::Csv => {
            let rows: Vec<RankRow> = by_return.into_iter().chain(by_arrival).collect();
            to_csv(&rows)?
        }
        OutputFormat::Json => to_json(&RankJson {
            by_return: &by_return,
            by_arrival: &by_arrival,
        })?,
    };
    write_output(&content, config.output.as_deref())
}

/// 랭킹 표 형식.
pub fn format_rank_table(rows: &[RankRow]) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:>4} {:<8} {:<20} {:>12} {:>12} {:>8} {:>6} {:<12}\n",
        "RANK", "CODE", "NAME", "CURRENT", "TARGET", "RETURN", "DAYS", "TARGET_DATE"
    ));
    output.push_str(&"-".repeat(90));
    output.push('\n');

    if rows.is_empty() {
        output.push_str("(예측 가능한 종목 없음)\n");
        return output;
    }

    for row in rows {
        output.push_str(&format!(
            "{:>4} {:<8} {:<20} {:>12} {:>12} {:>7}% {:>6} {:<12}\n",
            row.rank,
            row.code,
            truncate(&row.name, 20),
            row.current_price.round_half_up(2).to_string(),
            row.target_price.round_half_up(2).to_string(),
            row.expected_return_pct.to_string(),
            row.period_days,
            row.target_date.to_string()
        ));
    }
    output
}
