//! Mitigation report generation.
//!
//! Builds an immutable snapshot of a finished assessment from wizard state
//! and the technique repository. The snapshot is the hand-off point to
//! export collaborators (PDF, spreadsheet, sharing); the core's
//! responsibility ends at [`AssessmentReport`] and the [`ReportExporter`]
//! seam.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::models::{Asset, RiskScore, Technique};
use crate::repository::TechniqueRepository;
use crate::risk::{average_risk, RiskLevel};
use crate::wizard::Wizard;

/// Mitigation shown for techniques the dataset has no guidance for.
pub const FALLBACK_MITIGATION: &str = "General Security Measures";

/// Errors that can occur when building or exporting a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No asset has been defined")]
    MissingAsset,

    #[error("No risk scores have been recorded")]
    NoScores,

    #[error("Failed to write report")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report")]
    Json(#[from] serde_json::Error),
}

/// Counts of scored techniques per coarse severity bucket.
///
/// High is a score of 7 or above, medium 5 to 6, low below 5.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RiskBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskBreakdown {
    fn count(scores: &[RiskScore]) -> Self {
        let mut breakdown = Self::default();
        for score in scores {
            if score.score >= 7 {
                breakdown.high += 1;
            } else if score.score >= 5 {
                breakdown.medium += 1;
            } else {
                breakdown.low += 1;
            }
        }
        breakdown
    }
}

/// One scored technique with its recommended mitigations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MitigationFinding {
    /// The technique that was assessed.
    pub technique: Technique,
    /// The 1-10 rating it received.
    pub score: u8,
    /// Severity band for the rating.
    pub level: RiskLevel,
    /// Recommended mitigations, or the generic fallback when the dataset
    /// carries none for this technique.
    pub mitigations: Vec<String>,
}

/// Snapshot of a completed assessment.
///
/// Serializes with camelCase keys, the same wire convention as
/// [`TechniqueRow`](crate::models::TechniqueRow) seed rows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    /// Unique identifier for this report.
    pub id: Uuid,
    /// The asset that was assessed.
    pub asset: Asset,
    /// Techniques included in the assessment, in selection order.
    pub techniques: Vec<Technique>,
    /// Raw per-technique scores, in selection order.
    pub scores: Vec<RiskScore>,
    /// Mean risk across all scores, rounded to one decimal.
    pub total_risk: f64,
    /// Severity band for the total risk.
    pub risk_level: RiskLevel,
    /// Counts per severity bucket.
    pub breakdown: RiskBreakdown,
    /// Per-technique findings, highest score first.
    pub findings: Vec<MitigationFinding>,
    /// When the report was generated (ISO-8601 in serialized form).
    pub generated_at: DateTime<Utc>,
}

impl AssessmentReport {
    /// Builds a report from the wizard's accumulated state and the dataset.
    ///
    /// The wizard's step gates make the error cases unreachable through the
    /// normal flow; they guard direct programmatic use.
    pub fn build(
        wizard: &Wizard,
        repository: &TechniqueRepository,
    ) -> Result<Self, ReportError> {
        if !wizard.asset().is_named() {
            return Err(ReportError::MissingAsset);
        }
        let scores = wizard.scores();
        if scores.is_empty() {
            return Err(ReportError::NoScores);
        }

        let values: Vec<u8> = scores.iter().map(|s| s.score).collect();
        let total_risk = average_risk(&values);

        let mut findings: Vec<MitigationFinding> = wizard
            .selected_techniques()
            .iter()
            .map(|technique| {
                let score = wizard
                    .score_for(&technique.id)
                    .unwrap_or(RiskScore::DEFAULT);
                let known = repository.mitigations(&technique.id);
                let mitigations = if known.is_empty() {
                    vec![FALLBACK_MITIGATION.to_string()]
                } else {
                    known.to_vec()
                };
                MitigationFinding {
                    technique: technique.clone(),
                    score,
                    level: RiskLevel::from_score(score as f64),
                    mitigations,
                }
            })
            .collect();
        // Highest risk first; ties break on technique id for a stable order.
        findings.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.technique.id.cmp(&b.technique.id))
        });

        let report = Self {
            id: Uuid::new_v4(),
            asset: wizard.asset().clone(),
            techniques: wizard.selected_techniques().to_vec(),
            scores: scores.to_vec(),
            total_risk,
            risk_level: RiskLevel::from_score(total_risk),
            breakdown: RiskBreakdown::count(scores),
            findings,
            generated_at: Utc::now(),
        };
        info!(
            report = %report.id,
            asset = %report.asset.name,
            total_risk = report.total_risk,
            "assessment report generated"
        );
        Ok(report)
    }
}

/// Seam for export collaborators (PDF, spreadsheet, sharing).
pub trait ReportExporter {
    /// Writes the report to the given sink.
    fn export(&self, report: &AssessmentReport, writer: &mut dyn Write) -> Result<(), ReportError>;
}

/// Exports the report snapshot as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReportExporter {
    /// Pretty-print the output.
    pub pretty: bool,
}

impl ReportExporter for JsonReportExporter {
    fn export(&self, report: &AssessmentReport, writer: &mut dyn Write) -> Result<(), ReportError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut *writer, report)?;
        } else {
            serde_json::to_writer(&mut *writer, report)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}
