// src/storage/mod.rs
use crate::pipeline::YearResult;
use crate::utils::error::StorageError;
use std::fs;
use std::path::{Path, PathBuf};

/// Spreadsheet sheet names cap out at 31 characters; year labels are
/// truncated to the same limit so any sheet-based sink stays addressable.
const MAX_YEAR_LABEL_LEN: usize = 31;

const OUTPUT_COLUMNS: [&str; 4] = ["Year", "Name of Subsidiary", "Jurisdiction", "Notes"];

/// Where a company's finished results go. One addressable section per year:
/// either the extracted rows, or a single row whose Notes column explains
/// why the year produced nothing.
pub trait OutputSink {
    fn persist(&self, company_name: &str, years: &[(u32, YearResult)]) -> Result<(), StorageError>;
}

/// Production sink: one CSV file per (company, year) under
/// `base_dir/<company>/<year>.csv`.
pub struct CsvSink {
    base_dir: PathBuf,
}

impl CsvSink {
    /// Creates a new CsvSink rooted at the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::Io)?;
        }

        Ok(Self { base_dir: base_path })
    }
}

impl OutputSink for CsvSink {
    fn persist(&self, company_name: &str, years: &[(u32, YearResult)]) -> Result<(), StorageError> {
        let company_dir = self.base_dir.join(sanitize_dir_name(company_name));
        if !company_dir.exists() {
            fs::create_dir_all(&company_dir).map_err(StorageError::Io)?;
        }

        for (year, result) in years {
            let file_path = company_dir.join(format!("{}.csv", year_label(*year)));
            let mut writer = csv::Writer::from_path(&file_path)?;
            writer.write_record(OUTPUT_COLUMNS)?;

            let year_text = year.to_string();
            match result {
                YearResult::Rows(records) => {
                    for record in records {
                        writer.write_record([
                            year_text.as_str(),
                            record.subsidiary_name.as_str(),
                            record.jurisdiction.as_deref().unwrap_or(""),
                            "",
                        ])?;
                    }
                }
                YearResult::Failure(reason) => {
                    writer.write_record([year_text.as_str(), "", "", reason.as_note()])?;
                }
            }

            writer.flush().map_err(StorageError::Io)?;
            tracing::info!("Saved {} results to {}", year, file_path.display());
        }

        Ok(())
    }
}

fn year_label(year: u32) -> String {
    let mut label = year.to_string();
    label.truncate(MAX_YEAR_LABEL_LEN);
    label
}

fn sanitize_dir_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}
