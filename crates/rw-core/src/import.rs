//! Dataset import with validate-before-write semantics.
//!
//! The importer accepts delimited tabular files (`.csv`, `.tsv`), JSON seed
//! files (`.json`), or pre-parsed row lists, and bulk-loads the technique
//! repository only after the entire dataset has been parsed and validated.
//! A failed import never mutates existing repository state.
//!
//! File import is the one asynchronous operation in the system and is
//! single-flight: a second import started while one is pending is rejected
//! with [`ImportError::InProgress`].

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::models::TechniqueRow;
use crate::repository::TechniqueRepository;

/// Separator for the `Mitigations` column in delimited files.
const MITIGATION_DELIMITER: char = ';';

/// Errors that can occur during dataset import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unsupported file format: .{extension} (expected .csv, .tsv, or .json)")]
    UnsupportedFormat { extension: String },

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),

    #[error("Dataset validation failed: {0}")]
    ValidationFailed(String),

    #[error("An import is already in progress")]
    InProgress,

    #[error("Failed to read dataset file")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse delimited data")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON data")]
    Json(#[from] serde_json::Error),
}

/// Recognized dataset file formats, keyed by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Comma-separated values.
    Csv,
    /// Tab-separated values.
    Tsv,
    /// JSON array of rows (the seed-data path).
    Json,
}

impl ImportFormat {
    /// Determines the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self, ImportError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        match extension.as_str() {
            "csv" => Ok(ImportFormat::Csv),
            "tsv" => Ok(ImportFormat::Tsv),
            "json" => Ok(ImportFormat::Json),
            _ => Err(ImportError::UnsupportedFormat { extension }),
        }
    }
}

/// Result of validating a dataset without importing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the dataset is acceptable for import.
    pub valid: bool,
    /// Non-blocking issues.
    pub warnings: Vec<String>,
    /// Blocking issues.
    pub errors: Vec<String>,
    /// Number of data rows examined.
    pub row_count: usize,
}

/// Outcome of a successful import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Number of rows loaded.
    pub rows: usize,
    /// Number of distinct tactics in the loaded dataset.
    pub tactics: usize,
    /// Non-blocking issues noted during validation.
    pub warnings: Vec<String>,
}

/// Imports datasets into a shared [`TechniqueRepository`].
pub struct Importer {
    repository: Arc<RwLock<TechniqueRepository>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when an import finishes, on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Importer {
    /// Creates an importer writing into the given repository.
    pub fn new(repository: Arc<RwLock<TechniqueRepository>>) -> Self {
        Self {
            repository,
            in_flight: AtomicBool::new(false),
        }
    }

    /// The repository this importer writes into.
    pub fn repository(&self) -> &Arc<RwLock<TechniqueRepository>> {
        &self.repository
    }

    /// Imports a dataset file, dispatching on its extension.
    ///
    /// The whole file is parsed and validated before the repository is
    /// touched; on any error the prior dataset remains intact.
    pub async fn import_path(&self, path: &Path) -> Result<ImportSummary, ImportError> {
        let _guard = self.begin()?;
        let format = ImportFormat::from_path(path)?;
        debug!(path = %path.display(), ?format, "importing dataset file");
        let contents = tokio::fs::read_to_string(path).await?;
        let rows = parse_contents(&contents, format)?;
        self.commit(rows).await
    }

    /// Imports a pre-parsed row list.
    pub async fn import_rows(&self, rows: Vec<TechniqueRow>) -> Result<ImportSummary, ImportError> {
        let _guard = self.begin()?;
        self.commit(rows).await
    }

    /// Parses and validates a dataset file without mutating the repository.
    pub async fn validate_path(&self, path: &Path) -> Result<ValidationReport, ImportError> {
        let format = ImportFormat::from_path(path)?;
        let contents = tokio::fs::read_to_string(path).await?;
        let rows = parse_contents(&contents, format)?;
        Ok(validate_rows(&rows))
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, ImportError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("rejected concurrent import");
            return Err(ImportError::InProgress);
        }
        Ok(InFlightGuard(&self.in_flight))
    }

    async fn commit(&self, rows: Vec<TechniqueRow>) -> Result<ImportSummary, ImportError> {
        let report = validate_rows(&rows);
        if !report.valid {
            warn!(errors = report.errors.len(), "import rejected by validation");
            return Err(ImportError::ValidationFailed(report.errors.join("; ")));
        }

        let mut repository = self.repository.write().await;
        repository.load_rows(rows);
        let summary = ImportSummary {
            rows: report.row_count,
            tactics: repository.tactics().len(),
            warnings: report.warnings,
        };
        info!(rows = summary.rows, tactics = summary.tactics, "import complete");
        Ok(summary)
    }
}

/// Validates a row list, collecting blocking errors and non-blocking warnings.
pub fn validate_rows(rows: &[TechniqueRow]) -> ValidationReport {
    let mut warnings = Vec::new();
    let mut errors = Vec::new();
    let mut seen_ids = std::collections::HashSet::new();

    if rows.is_empty() {
        warnings.push("Dataset contains no rows".to_string());
    }

    for (index, row) in rows.iter().enumerate() {
        let row_no = index + 1;

        if let Err(failures) = row.validate() {
            for field_errors in failures.field_errors().values() {
                for error in *field_errors {
                    let message = error
                        .message
                        .clone()
                        .unwrap_or_else(|| "invalid value".into());
                    errors.push(format!("Row {}: {}", row_no, message));
                }
            }
        }

        let id = row.technique_id.trim();
        if !id.is_empty() && !seen_ids.insert(id.to_string()) {
            errors.push(format!("Row {}: duplicate technique id {}", row_no, id));
        }

        if row.description.as_deref().map_or(true, str::is_empty) {
            warnings.push(format!("Row {}: no description provided", row_no));
        }
        if row.mitigations.is_empty() {
            warnings.push(format!("Row {}: no mitigations listed", row_no));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        warnings,
        errors,
        row_count: rows.len(),
    }
}

fn parse_contents(contents: &str, format: ImportFormat) -> Result<Vec<TechniqueRow>, ImportError> {
    match format {
        ImportFormat::Csv => parse_delimited(contents, b','),
        ImportFormat::Tsv => parse_delimited(contents, b'\t'),
        ImportFormat::Json => Ok(serde_json::from_str(contents)?),
    }
}

fn parse_delimited(contents: &str, delimiter: u8) -> Result<Vec<TechniqueRow>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(contents.as_bytes());

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);

    let id_col = *header_map
        .get("techniqueid")
        .ok_or(ImportError::MissingColumn("Technique ID"))?;
    let name_col = *header_map
        .get("techniquename")
        .ok_or(ImportError::MissingColumn("Technique Name"))?;
    let tactic_col = *header_map
        .get("tactic")
        .ok_or(ImportError::MissingColumn("Tactic"))?;
    let description_col = header_map.get("description").copied();
    let mitigations_col = header_map.get("mitigations").copied();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let description = description_col
            .and_then(|col| record.get(col))
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let mitigations = mitigations_col
            .and_then(|col| record.get(col))
            .map(split_mitigations)
            .unwrap_or_default();

        rows.push(TechniqueRow {
            technique_id: field(&record, id_col),
            technique_name: field(&record, name_col),
            tactic: field(&record, tactic_col),
            description,
            mitigations,
        });
    }
    Ok(rows)
}

/// Maps normalized header names ("Technique ID" -> "techniqueid") to indices.
fn build_header_map(headers: &StringRecord) -> std::collections::HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let normalized = header
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            (normalized, index)
        })
        .collect()
}

fn field(record: &StringRecord, column: usize) -> String {
    record.get(column).unwrap_or_default().to_string()
}

fn split_mitigations(raw: &str) -> Vec<String> {
    raw.split(MITIGATION_DELIMITER)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}
