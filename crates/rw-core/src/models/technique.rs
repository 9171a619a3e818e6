//! Technique reference data and per-technique risk scores.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// An adversary technique from the ATT&CK for ICS catalog.
///
/// Techniques are immutable reference data sourced from the technique
/// repository; the wizard only ever holds copies of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Technique {
    /// Catalog identifier (e.g. "T0817"). Unique within a dataset.
    pub id: String,
    /// Technique name (e.g. "Drive-by Compromise").
    pub name: String,
    /// Tactic this technique belongs to (e.g. "Initial Access").
    pub tactic: String,
    /// Catalog description, when the dataset provides one.
    pub description: Option<String>,
}

/// A 1-10 risk rating of one technique against one asset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RiskScore {
    /// The technique being rated.
    pub technique_id: String,
    /// Risk rating, always within [`RiskScore::MIN`]..=[`RiskScore::MAX`].
    pub score: u8,
    /// Name of the asset the rating applies to.
    pub asset: String,
}

impl RiskScore {
    /// Lowest accepted score.
    pub const MIN: u8 = 1;
    /// Highest accepted score.
    pub const MAX: u8 = 10;
    /// Score assigned when a technique is first selected.
    pub const DEFAULT: u8 = 5;

    /// Creates a score for a technique, clamping the raw value into range.
    pub fn new(technique_id: impl Into<String>, score: i64, asset: impl Into<String>) -> Self {
        Self {
            technique_id: technique_id.into(),
            score: Self::clamp(score),
            asset: asset.into(),
        }
    }

    /// Clamps a raw score to the nearest accepted bound.
    ///
    /// Out-of-range input is corrected, not rejected: `0` becomes 1, `42`
    /// becomes 10.
    pub fn clamp(raw: i64) -> u8 {
        raw.clamp(Self::MIN as i64, Self::MAX as i64) as u8
    }

    /// Replaces the score with a clamped raw value.
    pub fn set(&mut self, raw: i64) {
        self.score = Self::clamp(raw);
    }
}

/// One row of an imported or seeded technique dataset.
///
/// This is the wire shape shared by the CSV/TSV columns and the JSON seed
/// files, and the shape [`TechniqueRepository::export_rows`] reproduces.
///
/// [`TechniqueRepository::export_rows`]: crate::repository::TechniqueRepository::export_rows
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TechniqueRow {
    /// Catalog identifier for the technique.
    #[validate(length(min = 1, message = "technique id must not be empty"))]
    pub technique_id: String,
    /// Technique name.
    #[validate(length(min = 1, message = "technique name must not be empty"))]
    pub technique_name: String,
    /// Tactic the technique belongs to.
    #[validate(length(min = 1, message = "tactic must not be empty"))]
    pub tactic: String,
    /// Optional catalog description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Recommended mitigations, in catalog order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mitigations: Vec<String>,
}

impl TechniqueRow {
    /// Extracts the technique reference data from this row.
    pub fn technique(&self) -> Technique {
        Technique {
            id: self.technique_id.clone(),
            name: self.technique_name.clone(),
            tactic: self.tactic.clone(),
            description: self.description.clone(),
        }
    }
}
