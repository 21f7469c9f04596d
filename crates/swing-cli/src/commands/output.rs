//! 출력 형식 및 파일/표준출력 기록.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use tracing::info;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!(
                "Invalid format: {}. Use: table, csv, json",
                s
            )),
        }
    }
}

/// 결과를 파일 또는 stdout에 기록합니다.
pub fn write_output(content: &str, output_path: Option<&str>) -> Result<()> {
    if let Some(path) = output_path {
        let mut file =
            File::create(path).with_context(|| format!("Failed to create output file: {}", path))?;
        file.write_all(content.as_bytes())
            .context("Failed to write to file")?;
        info!("Output written to: {}", path);
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// 레코드 목록을 CSV 문자열로 변환합니다 (헤더 포함).
pub fn to_csv<T: Serialize>(records: &[T]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for record in records {
        wtr.serialize(record).context("Failed to write CSV record")?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// JSON 문자열 (pretty).
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize JSON")
}

/// 문자열을 최대 문자 수로 자릅니다.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// YYYY-MM-DD 날짜 파싱.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {}. Expected YYYY-MM-DD", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        code: String,
        name: String,
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("TABLE").unwrap(), OutputFormat::Table);
        assert_eq!(OutputFormat::parse("csv").unwrap(), OutputFormat::Csv);
        assert!(OutputFormat::parse("xml").is_err());
    }

    #[test]
    fn test_to_csv_quotes_commas() {
        let rows = vec![Row {
            code: "005930".to_string(),
            name: "삼성전자, 우선".to_string(),
        }];
        let csv = to_csv(&rows).unwrap();
        assert_eq!(csv, "code,name\n005930,\"삼성전자, 우선\"\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("삼성전자", 10), "삼성전자");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-01-28").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 28).unwrap()
        );
        assert!(parse_date("2025/01/28").is_err());
    }
}
