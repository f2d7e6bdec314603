//! CLI command for reports
//!
//! Generates a user's financial report and prints it or writes it to a file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, ValueEnum};

use crate::error::{FinTrackError, FinTrackResult};
use crate::reports::{ExportRange, FinancialReport};
use crate::services::UserService;
use crate::storage::Storage;

/// Output format for `fintrack report`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
    Csv,
    Yaml,
}

/// Arguments for `fintrack report`
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Username to report on
    pub username: String,

    /// Named range: today, week, month, quarter or year
    #[arg(short, long, default_value = "month")]
    pub range: String,

    /// Start date (YYYY-MM-DD); overrides --range
    #[arg(short, long)]
    pub start: Option<String>,

    /// End date (YYYY-MM-DD); overrides --range
    #[arg(short, long)]
    pub end: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Table)]
    pub format: ReportFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Handle the report command
pub fn handle_report_command(
    storage: &Storage,
    args: ReportArgs,
    today: NaiveDate,
) -> FinTrackResult<()> {
    let user = UserService::new(storage)
        .find_by_username(&args.username)?
        .ok_or_else(|| FinTrackError::user_not_found(args.username.clone()))?;

    let start = args.start.as_deref().map(parse_date).transpose()?;
    let end = args.end.as_deref().map(parse_date).transpose()?;
    let range = if start.is_some() || end.is_some() {
        ExportRange::Custom { start, end }
    } else {
        ExportRange::parse(&args.range, None, None)?
    };

    let report = FinancialReport::for_window(storage, user.id, range.window(today)?)?;

    match &args.output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                FinTrackError::Export(format!(
                    "Failed to create file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            let mut writer = BufWriter::new(file);
            write_report(&report, args.format, &mut writer)?;
            writer.flush()?;
            println!("Report exported to: {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_report(&report, args.format, &mut writer)?;
            writer.flush()?;
        }
    }

    Ok(())
}

/// Render `report` in `format`
pub fn write_report<W: Write>(
    report: &FinancialReport,
    format: ReportFormat,
    mut writer: W,
) -> FinTrackResult<()> {
    match format {
        ReportFormat::Table => write!(writer, "{}", report.format_terminal())?,
        ReportFormat::Json => {
            report.export_json(&mut writer)?;
            writeln!(writer)?;
        }
        ReportFormat::Csv => report.export_csv(&mut writer)?,
        ReportFormat::Yaml => report.export_yaml(&mut writer)?,
    }
    Ok(())
}

fn parse_date(value: &str) -> FinTrackResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        FinTrackError::Validation(format!("Invalid date format: {}. Use YYYY-MM-DD", value))
    })
}
