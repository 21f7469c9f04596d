//! 지지 구간(투자 구간) 스크리닝 명령.

use super::output::{to_csv, to_json, truncate, write_output, OutputFormat};
use super::source::DataSource;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use swing_analytics::{SupportZoneRow, SupportZoneScreen};
use swing_core::{AppConfig, DecimalExt};

/// 지지 구간 명령 설정.
#[derive(Debug)]
pub struct ZonesConfig {
    /// 허용 밴드 (퍼센트, 예: 5 → ±5%)
    pub band_pct: Option<Decimal>,
    pub as_of: NaiveDate,
    pub format: OutputFormat,
    pub output: Option<String>,
}

/// 퍼센트 밴드를 비율로 바꿉니다. 지정하지 않으면 설정값을 씁니다.
pub fn resolve_band(band_pct: Option<Decimal>, default_band: Decimal) -> Decimal {
    band_pct
        .map(|pct| pct / Decimal::ONE_HUNDRED)
        .unwrap_or(default_band)
}

/// 현재가가 B 가격 근처에 있는 종목을 출력합니다.
pub async fn run_zones(app: &AppConfig, source: &DataSource, config: ZonesConfig) -> Result<()> {
    let band = resolve_band(config.band_pct, app.analysis.zone_band);
    let screen = SupportZoneScreen::new(band).context("Invalid zone band")?;

    let outcome = source.analyze_all(app, config.as_of).await?;
    let rows = screen.screen(&outcome.reports);

    let content = match config.format {
        OutputFormat::Table => format_zone_table(&rows, band),
        OutputFormat::Csv => to_csv(&rows)?,
        OutputFormat::Json => to_json(&rows)?,
    };
    write_output(&content, config.output.as_deref())
}

/// 지지 구간 표 형식.
pub fn format_zone_table(rows: &[SupportZoneRow], band: Decimal) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "🛡️ B 가격 ±{} 이내 종목: {}건\n\n",
        band.to_percentage_string(),
        rows.len()
    ));
    output.push_str(&format!(
        "{:<8} {:<20} {:<12} {:>12} {:>12} {:>8}\n",
        "CODE", "NAME", "B_DATE", "B_PRICE", "CURRENT", "DEV(%)"
    ));
    output.push_str(&"-".repeat(77));
    output.push('\n');

    for row in rows {
        output.push_str(&format!(
            "{:<8} {:<20} {:<12} {:>12} {:>12} {:>8}\n",
            row.code,
            truncate(&row.name, 20),
            row.b_date.to_string(),
            row.b_price.round_half_up(2).to_string(),
            row.current_price.round_half_up(2).to_string(),
            row.deviation_pct.to_string()
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_resolve_band() {
        assert_eq!(resolve_band(Some(dec!(3)), dec!(0.05)), dec!(0.03));
        assert_eq!(resolve_band(None, dec!(0.05)), dec!(0.05));
    }

    #[test]
    fn test_format_zone_table() {
        let rows = vec![SupportZoneRow {
            code: "005930".to_string(),
            name: "삼성전자".to_string(),
            b_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            b_price: dec!(72000),
            current_price: dec!(71000),
            deviation_pct: dec!(1.39),
        }];
        let text = format_zone_table(&rows, dec!(0.05));
        assert!(text.contains("1건"));
        assert!(text.contains("005930"));
        assert!(text.contains("2024-03-04"));
        assert!(text.contains("1.39"));
    }
}
