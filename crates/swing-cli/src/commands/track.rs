//! 월별 B 구간 터치 성과 추적 명령.

use super::output::{to_csv, to_json, truncate, write_output, OutputFormat};
use super::source::DataSource;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use swing_analytics::{track_monthly, ZoneTouch};
use swing_core::{AppConfig, DecimalExt};
use tracing::info;

use super::zones::resolve_band;

/// 추적 명령 설정.
#[derive(Debug)]
pub struct TrackConfig {
    /// 이 날짜부터의 터치만 집계
    pub since: NaiveDate,
    /// 허용 밴드 (퍼센트)
    pub band_pct: Option<Decimal>,
    pub as_of: NaiveDate,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 전체 종목의 월별 터치를 계산해 출력합니다.
pub async fn run_track(app: &AppConfig, source: &DataSource, config: TrackConfig) -> Result<()> {
    if config.since > config.as_of {
        bail!(
            "--since ({}) must not be after the analysis date ({})",
            config.since,
            config.as_of
        );
    }
    let band = resolve_band(config.band_pct, app.analysis.zone_band);
    if band <= Decimal::ZERO || band >= Decimal::ONE {
        bail!("Band must be between 0 and 100 percent");
    }

    let outcome = source.analyze_all(app, config.as_of).await?;
    let mut touches: Vec<ZoneTouch> = outcome
        .reports
        .iter()
        .flat_map(|r| {
            track_monthly(
                &r.instrument.code,
                &r.instrument.name,
                &r.report.series,
                &r.report.breakouts,
                config.since,
                band,
            )
        })
        .collect();
    touches.sort_by(|a, b| a.month.cmp(&b.month).then_with(|| a.code.cmp(&b.code)));
    info!(touches = touches.len(), since = %config.since, "Monthly zone tracking finished");

    let content = match config.format {
        OutputFormat::Table => format_track_table(&touches),
        OutputFormat::Csv => to_csv(&touches)?,
        OutputFormat::Json => to_json(&touches)?,
    };
    write_output(&content, config.output.as_deref())
}

/// 월별로 묶은 터치 표 형식.
pub fn format_track_table(touches: &[ZoneTouch]) -> String {
    let mut output = String::new();
    if touches.is_empty() {
        output.push_str("구간 터치 없음\n");
        return output;
    }

    let mut current_month: Option<NaiveDate> = None;
    for touch in touches {
        if current_month != Some(touch.month) {
            current_month = Some(touch.month);
            output.push_str(&format!("\n📅 {}\n", touch.month_label()));
            output.push_str(&format!(
                "{:<8} {:<16} {:<12} {:>10} {:<12} {:>9} {:>9} {:>9}\n",
                "CODE", "NAME", "B_DATE", "B_PRICE", "TOUCH", "CUR(%)", "MAX(%)", "MIN(%)"
            ));
            output.push_str(&"-".repeat(92));
            output.push('\n');
        }
        output.push_str(&format!(
            "{:<8} {:<16} {:<12} {:>10} {:<12} {:>9} {:>9} {:>9}\n",
            touch.code,
            truncate(&touch.name, 16),
            touch.b_date.to_string(),
            touch.b_price.round_half_up(2).to_string(),
            touch.touch_date.to_string(),
            touch.current_return_pct.to_string(),
            touch.max_return_pct.to_string(),
            touch.min_return_pct.to_string()
        ));
    }
    output
}
