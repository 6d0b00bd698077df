use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::Writer;
use serde::Serialize;

use crate::error::{QuoteError, Result};
use crate::models::{NoveltyReport, ReportRow};
use crate::stages::ExtractionStats;

/// Header of the canonical training file
pub const TRAINING_HEADER: &str = "quote";

/// Sibling path used while a file is being written
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write a CSV file through a `.partial` sibling, renaming on success
///
/// A failure part-way leaves only the `.partial` file behind.
fn write_csv_atomically<F>(path: &Path, write_rows: F) -> Result<()>
where
    F: FnOnce(&mut Writer<File>) -> std::result::Result<(), csv::Error>,
{
    let staging = partial_path(path);
    let file = File::create(&staging).map_err(|e| QuoteError::io(&staging, e))?;
    let mut writer = Writer::from_writer(file);

    write_rows(&mut writer).map_err(|e| QuoteError::csv(&staging, e))?;
    writer.flush().map_err(|e| QuoteError::io(&staging, e))?;
    drop(writer);

    fs::rename(&staging, path).map_err(|e| QuoteError::io(path, e))
}

/// Write the single-column training file consumed by the text generator
pub fn write_training_file<'a, I>(path: &Path, quotes: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    write_csv_atomically(path, |writer| {
        writer.write_record([TRAINING_HEADER])?;
        for quote in quotes {
            writer.write_record([quote])?;
        }
        Ok(())
    })
}

/// Write the novelty report rows in order
pub fn write_report_file(path: &Path, report: &NoveltyReport) -> Result<()> {
    write_csv_atomically(path, |writer| {
        writer.write_record(report.headers())?;
        for row in &report.rows {
            match row {
                ReportRow::Bare { quote } => writer.write_record([quote.as_str()])?,
                ReportRow::Scored {
                    quote,
                    best_match,
                    match_score,
                } => writer.write_record([
                    quote.as_str(),
                    best_match.as_str(),
                    match_score.to_string().as_str(),
                ])?,
            }
        }
        Ok(())
    })
}

/// Default report location: `<run_name>_<source file name>` next to the working directory
pub fn default_report_path(run_name: &str, source: &Path) -> PathBuf {
    let source_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "quotes.csv".to_string());
    PathBuf::from(format!("{}_{}", run_name, source_name))
}

/// Refuse to clobber an existing report unless asked to
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<()> {
    if path.exists() && !overwrite {
        return Err(QuoteError::OutputExists(path.to_path_buf()));
    }
    Ok(())
}

/// JSON summary written next to the report on request
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_name: String,
    pub source: PathBuf,
    pub report: PathBuf,
    /// `None` when classification was skipped
    pub threshold: Option<u8>,
    pub skip_check: bool,
    pub total_candidates: usize,
    pub novel_count: usize,
    pub novel_fraction: Option<f64>,
    pub extraction: ExtractionStats,
    pub completed_at: DateTime<Utc>,
}

impl RunSummary {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| QuoteError::io(path, e))?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| QuoteError::io(path, std::io::Error::other(e)))
    }
}
