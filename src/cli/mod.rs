use crate::parsers::ItemsParser;
use crate::services::{CombinedReports, MonthHistogram, PeriodTally, Report, TrailingQuarter};
use crate::types::{DoctrackError, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`, `doctrack=info`)
pub const LOG_ENV: &str = "DOCTRACK_LOG";

/// Document activity reports over an `items` export
#[derive(Parser, Debug)]
#[command(name = "doctrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Input JSON document with an `items` array
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Which report to print
    #[arg(short, long, value_enum, default_value_t = ReportKind::All)]
    report: ReportKind,

    /// Decode the whole file with simd-json instead of streaming it
    #[arg(long)]
    in_memory: bool,

    /// Debug logging (overrides DOCTRACK_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// All three reports from a single pass
    All,
    /// Summary occurrences per month, gaps filled with zero
    Monthly,
    /// Document totals per period
    Periods,
    /// Average documents per day over the trailing quarter
    DailyAverage,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let Some(path) = self.file.as_deref() else {
            Cli::command().print_help()?;
            println!();
            return Ok(());
        };

        init_logging(self.verbose)?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_reports(path, &mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Compute the selected report(s) and write them as labeled pretty JSON
    pub fn write_reports<W: Write>(&self, path: &Path, out: &mut W) -> anyhow::Result<()> {
        let started = Instant::now();

        match self.report {
            ReportKind::All => {
                let reports = self.compute::<CombinedReports>(path)?;
                write_section(out, "MONTHLY", &reports.monthly)?;
                write_section(out, "PERIODS", &reports.periods)?;
                write_section(out, "DAILY_AVERAGE", &reports.daily_average)?;
            }
            ReportKind::Monthly => {
                write_section(out, "MONTHLY", &self.compute::<MonthHistogram>(path)?)?;
            }
            ReportKind::Periods => {
                write_section(out, "PERIODS", &self.compute::<PeriodTally>(path)?)?;
            }
            ReportKind::DailyAverage => {
                write_section(out, "DAILY_AVERAGE", &self.compute::<TrailingQuarter>(path)?)?;
            }
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reports written"
        );
        Ok(())
    }

    fn compute<R: Report>(&self, path: &Path) -> Result<R::Output> {
        let mut report = R::default();
        let records = if self.in_memory {
            ItemsParser::scan_file_in_memory(path, &mut report)?
        } else {
            ItemsParser::scan_file(path, &mut report)?
        };
        info!(records, path = %path.display(), "payload scanned");
        Ok(report.finish())
    }
}

fn write_section<W: Write, T: Serialize + ?Sized>(
    out: &mut W,
    label: &str,
    value: &T,
) -> anyhow::Result<()> {
    writeln!(out)?;
    writeln!(out, ">>> {}", label)?;
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn log_filter(verbose: bool, directives: Option<&str>) -> Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new("debug"));
    }
    match directives {
        Some(directives) => EnvFilter::try_new(directives).map_err(|e| {
            DoctrackError::Config(format!("invalid {} '{}': {}", LOG_ENV, directives, e))
        }),
        None => Ok(EnvFilter::new("warn")),
    }
}

/// Log to stderr so stdout carries only report JSON
fn init_logging(verbose: bool) -> Result<()> {
    let directives = std::env::var(LOG_ENV).ok();
    let filter = log_filter(verbose, directives.as_deref())?;

    // A subscriber may already be installed by an embedding program
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join(name)
    }

    fn render(args: &[&str], fixture: &str) -> String {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        cli.write_reports(&fixture_path(fixture), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["doctrack"]).unwrap();
        assert!(cli.file.is_none());
        assert_eq!(cli.report, ReportKind::All);
        assert!(!cli.in_memory);
    }

    #[test]
    fn test_cli_parse_report_kind() {
        let cli = Cli::try_parse_from(["doctrack", "in.json", "--report", "daily-average"]).unwrap();
        assert_eq!(cli.report, ReportKind::DailyAverage);
        assert_eq!(cli.file, Some(PathBuf::from("in.json")));
    }

    #[test]
    fn test_cli_parse_unknown_report() {
        assert!(Cli::try_parse_from(["doctrack", "in.json", "-r", "weekly"]).is_err());
    }

    #[test]
    fn test_cli_without_file_prints_usage_and_succeeds() {
        let cli = Cli::try_parse_from(["doctrack"]).unwrap();
        assert!(cli.run().is_ok());
    }

    #[test]
    fn test_write_all_reports() {
        let output = render(&["doctrack", "sample.json"], "sample.json");

        let monthly = output.find(">>> MONTHLY").unwrap();
        let periods = output.find(">>> PERIODS").unwrap();
        let average = output.find(">>> DAILY_AVERAGE").unwrap();
        assert!(monthly < periods && periods < average);

        assert!(output.contains("\"2019-12\": 1"));
        assert!(output.contains("\"total\": 249"));
        assert!(output.trim_end().ends_with(">>> DAILY_AVERAGE\n0"));
    }

    #[test]
    fn test_write_single_report() {
        let output = render(&["doctrack", "sample.json", "-r", "periods"], "sample.json");

        assert!(output.contains(">>> PERIODS"));
        assert!(!output.contains(">>> MONTHLY"));
        assert!(!output.contains(">>> DAILY_AVERAGE"));
    }

    #[test]
    fn test_in_memory_output_matches_streaming() {
        let streamed = render(&["doctrack", "gaps.json"], "gaps.json");
        let in_memory = render(&["doctrack", "gaps.json", "--in-memory"], "gaps.json");
        assert_eq!(streamed, in_memory);
    }

    #[test]
    fn test_write_reports_malformed_fails() {
        let cli = Cli::try_parse_from(["doctrack", "malformed.json"]).unwrap();
        let mut out = Vec::new();
        assert!(cli
            .write_reports(&fixture_path("malformed.json"), &mut out)
            .is_err());
    }

    #[test]
    fn test_log_filter_verbose_ignores_env() {
        assert!(log_filter(true, Some("doctrack=notalevel")).is_ok());
    }

    #[test]
    fn test_log_filter_invalid_env() {
        let err = log_filter(false, Some("doctrack=notalevel")).unwrap_err();
        assert!(matches!(err, DoctrackError::Config(_)));
    }

    #[test]
    fn test_log_filter_default() {
        assert!(log_filter(false, None).is_ok());
    }
}
