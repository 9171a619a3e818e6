//! In-memory technique dataset repository.
//!
//! Holds the tactic/technique/mitigation reference data the wizard reads
//! during an assessment. The repository is constructed explicitly and injected
//! wherever it is needed; it has no persistence and is rebuilt wholesale on
//! every import.

use std::collections::HashMap;

use tracing::info;

use crate::models::{Technique, TechniqueRow};

/// Reference dataset of tactics, techniques, and mitigations.
///
/// All state is replaced atomically by [`load_rows`](Self::load_rows); there
/// are no partial writers. Lookups for unknown keys return empty slices rather
/// than errors.
#[derive(Debug, Default)]
pub struct TechniqueRepository {
    /// Distinct tactic names in first-seen order.
    tactic_order: Vec<String>,
    /// Techniques grouped by tactic, preserving row order within a tactic.
    techniques: HashMap<String, Vec<Technique>>,
    /// Mitigation names keyed by technique id, in catalog order.
    mitigations: HashMap<String, Vec<String>>,
}

impl TechniqueRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the entire dataset with the given rows.
    ///
    /// Clears existing state first, so a load is all-or-nothing from the
    /// caller's perspective: validation belongs upstream in the importer,
    /// which never calls this with rows it has not already accepted.
    pub fn load_rows(&mut self, rows: Vec<TechniqueRow>) {
        self.tactic_order.clear();
        self.techniques.clear();
        self.mitigations.clear();

        let row_count = rows.len();
        for row in rows {
            if !self.techniques.contains_key(&row.tactic) {
                self.tactic_order.push(row.tactic.clone());
            }

            let technique = row.technique();
            self.techniques
                .entry(row.tactic)
                .or_default()
                .push(technique);

            if !row.mitigations.is_empty() {
                self.mitigations.insert(row.technique_id, row.mitigations);
            }
        }

        info!(
            rows = row_count,
            tactics = self.tactic_order.len(),
            "technique dataset loaded"
        );
    }

    /// Distinct tactic names, in the order they first appeared in the dataset.
    pub fn tactics(&self) -> &[String] {
        &self.tactic_order
    }

    /// Techniques for a tactic, or an empty slice when the tactic is unknown.
    pub fn techniques_by_tactic(&self, tactic: &str) -> &[Technique] {
        self.techniques
            .get(tactic)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Looks up a technique by its catalog id.
    pub fn technique(&self, technique_id: &str) -> Option<&Technique> {
        self.tactic_order
            .iter()
            .filter_map(|tactic| self.techniques.get(tactic))
            .flatten()
            .find(|t| t.id == technique_id)
    }

    /// Mitigations for a technique, or an empty slice when none are known.
    pub fn mitigations(&self, technique_id: &str) -> &[String] {
        self.mitigations
            .get(technique_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Total number of techniques across all tactics.
    pub fn technique_count(&self) -> usize {
        self.techniques.values().map(Vec::len).sum()
    }

    /// Whether the repository holds no techniques.
    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }

    /// Flattens the dataset back into rows, iterating tactics in first-seen
    /// order. Re-importing the result reproduces an equivalent repository.
    pub fn export_rows(&self) -> Vec<TechniqueRow> {
        let mut rows = Vec::with_capacity(self.technique_count());
        for tactic in &self.tactic_order {
            for technique in self.techniques_by_tactic(tactic) {
                rows.push(TechniqueRow {
                    technique_id: technique.id.clone(),
                    technique_name: technique.name.clone(),
                    tactic: technique.tactic.clone(),
                    description: technique.description.clone(),
                    mitigations: self.mitigations(&technique.id).to_vec(),
                });
            }
        }
        rows
    }
}
