//! Report export
//!
//! Renders a financial report as a downloadable JSON, CSV or YAML file.

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};

use crate::error::{FinTrackError, FinTrackResult};
use crate::models::{DateRange, DateWindow, UserId};
use crate::storage::Storage;

use super::financial::FinancialReport;

/// Supported export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Yaml,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Yaml => "yaml",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Csv => "text/csv; charset=utf-8",
            Self::Yaml => "application/yaml",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = FinTrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(FinTrackError::Validation(format!(
                "Unsupported format: {}",
                other
            ))),
        }
    }
}

/// Which dates an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRange {
    Named(DateRange),
    /// Explicit bounds; a missing start means 30 days back, a missing end means today
    Custom {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl ExportRange {
    /// Parse the `dateRange` name, pairing `custom` with the explicit bounds
    pub fn parse(
        name: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> FinTrackResult<Self> {
        if name.trim().eq_ignore_ascii_case("custom") {
            return Ok(Self::Custom { start, end });
        }
        name.parse::<DateRange>()
            .map(Self::Named)
            .map_err(|e| FinTrackError::Validation(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Named(range) => range.as_str(),
            Self::Custom { .. } => "custom",
        }
    }

    pub fn window(&self, today: NaiveDate) -> FinTrackResult<DateWindow> {
        match *self {
            Self::Named(range) => Ok(range.window(today)),
            Self::Custom { start, end } => {
                let start = start.unwrap_or(today - Duration::days(30));
                let end = end.unwrap_or(today);
                if start > end {
                    return Err(FinTrackError::Validation(
                        "Start date must be before end date".into(),
                    ));
                }
                Ok(DateWindow::new(start, end))
            }
        }
    }
}

/// A rendered export ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct ExportedReport {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// Generate a report over `range` and render it as `format`
pub fn export_report(
    storage: &Storage,
    user_id: UserId,
    range: ExportRange,
    format: ExportFormat,
    today: NaiveDate,
) -> FinTrackResult<ExportedReport> {
    let window = range.window(today)?;
    let report = FinancialReport::for_window(storage, user_id, window)?;

    let mut body = Vec::new();
    match format {
        ExportFormat::Json => report.export_json(&mut body)?,
        ExportFormat::Csv => report.export_csv(&mut body)?,
        ExportFormat::Yaml => report.export_yaml(&mut body)?,
    }

    Ok(ExportedReport {
        filename: format!("financial_report_{}.{}", range.name(), format.extension()),
        content_type: format.content_type(),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::FinTrackPaths;
    use tempfile::TempDir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 20).unwrap()
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert_eq!("yml".parse::<ExportFormat>().unwrap(), ExportFormat::Yaml);
        assert!("pdf".parse::<ExportFormat>().unwrap_err().is_validation());
    }

    #[test]
    fn test_range_parse() {
        assert_eq!(
            ExportRange::parse("quarter", None, None).unwrap(),
            ExportRange::Named(DateRange::Quarter)
        );
        assert!(ExportRange::parse("fortnight", None, None).is_err());

        let custom = ExportRange::parse("custom", None, None).unwrap();
        let window = custom.window(today()).unwrap();
        assert_eq!(window.end, today());
        assert_eq!(window.start, NaiveDate::from_ymd_opt(2025, 5, 21).unwrap());

        let inverted = ExportRange::Custom {
            start: Some(today()),
            end: Some(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()),
        };
        assert!(inverted.window(today()).is_err());
    }

    #[test]
    fn test_export_filename_and_body() {
        let temp_dir = TempDir::new().unwrap();
        let paths = FinTrackPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let exported = export_report(
            &storage,
            UserId::new(),
            ExportRange::Named(DateRange::Week),
            ExportFormat::Csv,
            today(),
        )
        .unwrap();
        assert_eq!(exported.filename, "financial_report_week.csv");
        assert!(exported.content_type.starts_with("text/csv"));
        assert!(String::from_utf8(exported.body)
            .unwrap()
            .starts_with("id,date,description,category,amount"));
    }
}
