//! Assessment wizard state machine.
//!
//! A strictly linear four-step flow: asset input, technique selection, risk
//! scoring, report. Each step gates forward navigation on its own condition;
//! backward navigation is always allowed. State is mutated exclusively
//! through [`WizardCommand`]s applied to the [`Wizard`], which returns an
//! immutable [`WizardSnapshot`] after every command, so step views never
//! touch wizard state directly.
//!
//! The controller maintains one invariant at all times: the set of recorded
//! risk scores matches the set of selected techniques, keyed by technique id.
//! Selecting a technique records a default score, deselecting removes it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Asset, AssetType, RiskScore, Technique};

/// The four steps of an assessment, in order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Define the asset under assessment.
    AssetInput,
    /// Select applicable adversary techniques.
    TechniqueSelection,
    /// Rate each selected technique 1-10.
    RiskScoring,
    /// Review the generated mitigation report. Terminal.
    Report,
}

impl WizardStep {
    /// The step after this one, or `None` at the end of the flow.
    pub fn next(&self) -> Option<WizardStep> {
        match self {
            WizardStep::AssetInput => Some(WizardStep::TechniqueSelection),
            WizardStep::TechniqueSelection => Some(WizardStep::RiskScoring),
            WizardStep::RiskScoring => Some(WizardStep::Report),
            WizardStep::Report => None,
        }
    }

    /// The step before this one, or `None` at the start of the flow.
    pub fn previous(&self) -> Option<WizardStep> {
        match self {
            WizardStep::AssetInput => None,
            WizardStep::TechniqueSelection => Some(WizardStep::AssetInput),
            WizardStep::RiskScoring => Some(WizardStep::TechniqueSelection),
            WizardStep::Report => Some(WizardStep::RiskScoring),
        }
    }

    /// Short step title as shown in the step header.
    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::AssetInput => "Asset Input",
            WizardStep::TechniqueSelection => "Technique Selection",
            WizardStep::RiskScoring => "Risk Scoring",
            WizardStep::Report => "Generate Report",
        }
    }

    /// One-line description of what the step does.
    pub fn description(&self) -> &'static str {
        match self {
            WizardStep::AssetInput => "Define your ICS assets",
            WizardStep::TechniqueSelection => "Select MITRE ATT&CK techniques",
            WizardStep::RiskScoring => "Calculate risk scores",
            WizardStep::Report => "Review and export results",
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// Commands the step views issue against the wizard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardCommand {
    /// Set or edit the asset. Only honored in [`WizardStep::AssetInput`].
    SetAsset {
        name: String,
        asset_type: Option<AssetType>,
    },
    /// Select a technique. Only honored in [`WizardStep::TechniqueSelection`].
    SelectTechnique(Technique),
    /// Deselect a technique by id. Only honored in
    /// [`WizardStep::TechniqueSelection`].
    DeselectTechnique(String),
    /// Rate a selected technique. Out-of-range values are clamped. Only
    /// honored in [`WizardStep::RiskScoring`].
    SetScore { technique_id: String, score: i64 },
    /// Advance to the next step. A no-op when the current step's gate
    /// condition is not met or the flow is at its terminal step.
    Next,
    /// Return to the previous step. A no-op at the initial step.
    Back,
}

/// Immutable view of wizard state emitted after every command.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    /// Current step.
    pub step: WizardStep,
    /// Asset as drafted so far.
    pub asset: Asset,
    /// Selected techniques, in selection order.
    pub selected_techniques: Vec<Technique>,
    /// Risk scores, one per selected technique.
    pub scores: Vec<RiskScore>,
    /// Whether the current step's gate condition is met.
    pub can_advance: bool,
}

/// The wizard controller: current step plus accumulated assessment state.
#[derive(Debug)]
pub struct Wizard {
    step: WizardStep,
    asset: Asset,
    selected: Vec<Technique>,
    scores: Vec<RiskScore>,
}

impl Wizard {
    /// Creates a wizard at the initial step with an empty asset draft.
    pub fn new() -> Self {
        Self {
            step: WizardStep::AssetInput,
            asset: Asset::default(),
            selected: Vec::new(),
            scores: Vec::new(),
        }
    }

    /// Applies one command and returns the resulting snapshot.
    pub fn apply(&mut self, command: WizardCommand) -> WizardSnapshot {
        debug!(step = %self.step, ?command, "applying wizard command");
        match command {
            WizardCommand::SetAsset { name, asset_type } => self.set_asset(name, asset_type),
            WizardCommand::SelectTechnique(technique) => self.select_technique(technique),
            WizardCommand::DeselectTechnique(id) => self.deselect_technique(&id),
            WizardCommand::SetScore {
                technique_id,
                score,
            } => self.set_score(&technique_id, score),
            WizardCommand::Next => {
                self.advance();
            }
            WizardCommand::Back => {
                self.back();
            }
        }
        self.snapshot()
    }

    /// Current step.
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// The asset as drafted so far.
    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    /// Selected techniques, in selection order.
    pub fn selected_techniques(&self) -> &[Technique] {
        &self.selected
    }

    /// Recorded risk scores, one per selected technique.
    pub fn scores(&self) -> &[RiskScore] {
        &self.scores
    }

    /// The recorded score for a technique, if it is selected.
    pub fn score_for(&self, technique_id: &str) -> Option<u8> {
        self.scores
            .iter()
            .find(|s| s.technique_id == technique_id)
            .map(|s| s.score)
    }

    /// Whether the current step's gate condition is met.
    pub fn can_advance(&self) -> bool {
        match self.step {
            WizardStep::AssetInput => self.asset.is_named(),
            WizardStep::TechniqueSelection => !self.selected.is_empty(),
            WizardStep::RiskScoring => !self.scores.is_empty(),
            WizardStep::Report => false,
        }
    }

    /// Advances to the next step if the gate condition allows it.
    ///
    /// Returns whether a transition happened. A blocked advance is a no-op,
    /// not an error: the UI disables its Next control in the same condition.
    pub fn advance(&mut self) -> bool {
        if !self.can_advance() {
            debug!(step = %self.step, "advance blocked by gate condition");
            return false;
        }
        let Some(next) = self.step.next() else {
            return false;
        };
        info!(from = %self.step, to = %next, "wizard step advanced");
        self.step = next;
        if self.step == WizardStep::RiskScoring {
            self.sync_scores();
        }
        true
    }

    /// Returns to the previous step. Always allowed except at the start.
    pub fn back(&mut self) -> bool {
        let Some(previous) = self.step.previous() else {
            return false;
        };
        info!(from = %self.step, to = %previous, "wizard step reverted");
        self.step = previous;
        true
    }

    /// Builds an immutable snapshot of the current state.
    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            step: self.step,
            asset: self.asset.clone(),
            selected_techniques: self.selected.clone(),
            scores: self.scores.clone(),
            can_advance: self.can_advance(),
        }
    }

    fn set_asset(&mut self, name: String, asset_type: Option<AssetType>) {
        if self.step != WizardStep::AssetInput {
            debug!(step = %self.step, "ignoring asset edit outside the asset step");
            return;
        }
        self.asset = Asset::new(name, asset_type);
        // Scores recorded under the old asset name follow the rename.
        let asset_name = self.asset.name.clone();
        for score in &mut self.scores {
            score.asset = asset_name.clone();
        }
    }

    fn select_technique(&mut self, technique: Technique) {
        if self.step != WizardStep::TechniqueSelection {
            debug!(step = %self.step, "ignoring selection outside the selection step");
            return;
        }
        if self.selected.iter().any(|t| t.id == technique.id) {
            return;
        }
        if self.score_for(&technique.id).is_none() {
            self.scores.push(RiskScore::new(
                technique.id.clone(),
                RiskScore::DEFAULT as i64,
                self.asset.name.clone(),
            ));
        }
        debug!(technique = %technique.id, "technique selected");
        self.selected.push(technique);
    }

    fn deselect_technique(&mut self, technique_id: &str) {
        if self.step != WizardStep::TechniqueSelection {
            debug!(step = %self.step, "ignoring deselection outside the selection step");
            return;
        }
        self.selected.retain(|t| t.id != technique_id);
        self.scores.retain(|s| s.technique_id != technique_id);
        debug!(technique = technique_id, "technique deselected");
    }

    fn set_score(&mut self, technique_id: &str, raw: i64) {
        if self.step != WizardStep::RiskScoring {
            debug!(step = %self.step, "ignoring score outside the scoring step");
            return;
        }
        let Some(score) = self
            .scores
            .iter_mut()
            .find(|s| s.technique_id == technique_id)
        else {
            debug!(technique = technique_id, "ignoring score for unselected technique");
            return;
        };
        score.set(raw);
    }

    /// Re-synchronizes the score set against the selected technique set,
    /// keeping scores already entered for techniques that are still selected.
    fn sync_scores(&mut self) {
        let asset_name = self.asset.name.clone();
        self.scores
            .retain(|s| self.selected.iter().any(|t| t.id == s.technique_id));
        for technique in &self.selected {
            if !self
                .scores
                .iter()
                .any(|s| s.technique_id == technique.id)
            {
                self.scores.push(RiskScore::new(
                    technique.id.clone(),
                    RiskScore::DEFAULT as i64,
                    asset_name.clone(),
                ));
            }
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn technique(id: &str) -> Technique {
        Technique {
            id: id.to_string(),
            name: format!("Technique {}", id),
            tactic: "Initial Access".to_string(),
            description: None,
        }
    }

    /// Drives a fresh wizard to the technique selection step.
    fn wizard_at_selection() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.apply(WizardCommand::SetAsset {
            name: "Main Control HMI".to_string(),
            asset_type: Some(AssetType::Hmi),
        });
        assert!(wizard.advance());
        wizard
    }

    #[test]
    fn test_cannot_advance_with_empty_asset_name() {
        let mut wizard = Wizard::new();
        assert!(!wizard.advance());
        assert_eq!(wizard.step(), WizardStep::AssetInput);

        wizard.apply(WizardCommand::SetAsset {
            name: "   ".to_string(),
            asset_type: Some(AssetType::Plc),
        });
        assert!(!wizard.advance());
        assert_eq!(wizard.step(), WizardStep::AssetInput);
    }

    #[test]
    fn test_name_alone_satisfies_asset_gate() {
        let mut wizard = Wizard::new();
        wizard.apply(WizardCommand::SetAsset {
            name: "Production PLC-01".to_string(),
            asset_type: None,
        });
        assert!(wizard.advance());
        assert_eq!(wizard.step(), WizardStep::TechniqueSelection);
    }

    #[test]
    fn test_selection_records_default_score() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));

        assert_eq!(wizard.scores().len(), 1);
        let score = &wizard.scores()[0];
        assert_eq!(score.technique_id, "T0817");
        assert_eq!(score.score, RiskScore::DEFAULT);
        assert_eq!(score.asset, "Main Control HMI");
    }

    #[test]
    fn test_reselection_is_a_no_op() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        assert_eq!(wizard.selected_techniques().len(), 1);
        assert_eq!(wizard.scores().len(), 1);
    }

    #[test]
    fn test_deselection_removes_score() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        wizard.apply(WizardCommand::SelectTechnique(technique("T0819")));
        wizard.apply(WizardCommand::DeselectTechnique("T0817".to_string()));

        assert_eq!(wizard.selected_techniques().len(), 1);
        assert_eq!(wizard.scores().len(), 1);
        assert_eq!(wizard.scores()[0].technique_id, "T0819");
    }

    #[test]
    fn test_selection_gate_requires_one_technique() {
        let mut wizard = wizard_at_selection();
        assert!(!wizard.advance());
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        assert!(wizard.advance());
        assert_eq!(wizard.step(), WizardStep::RiskScoring);
    }

    #[test]
    fn test_scores_survive_navigating_back_and_forward() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        wizard.apply(WizardCommand::SelectTechnique(technique("T0819")));
        assert!(wizard.advance());
        wizard.apply(WizardCommand::SetScore {
            technique_id: "T0817".to_string(),
            score: 8,
        });

        // Back to selection, drop one technique, add another.
        assert!(wizard.back());
        wizard.apply(WizardCommand::DeselectTechnique("T0819".to_string()));
        wizard.apply(WizardCommand::SelectTechnique(technique("T0821")));
        assert!(wizard.advance());

        // The edited score survives, the dropped one is gone, the new
        // selection picked up the default.
        assert_eq!(wizard.score_for("T0817"), Some(8));
        assert_eq!(wizard.score_for("T0819"), None);
        assert_eq!(wizard.score_for("T0821"), Some(RiskScore::DEFAULT));
    }

    #[test]
    fn test_score_input_is_clamped() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        assert!(wizard.advance());

        wizard.apply(WizardCommand::SetScore {
            technique_id: "T0817".to_string(),
            score: 15,
        });
        assert_eq!(wizard.score_for("T0817"), Some(10));

        wizard.apply(WizardCommand::SetScore {
            technique_id: "T0817".to_string(),
            score: -3,
        });
        assert_eq!(wizard.score_for("T0817"), Some(1));
    }

    #[test]
    fn test_score_for_unselected_technique_is_ignored() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        assert!(wizard.advance());

        wizard.apply(WizardCommand::SetScore {
            technique_id: "T0999".to_string(),
            score: 9,
        });
        assert_eq!(wizard.scores().len(), 1);
        assert_eq!(wizard.score_for("T0999"), None);
    }

    #[test]
    fn test_asset_is_immutable_after_advancing() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SetAsset {
            name: "Renamed".to_string(),
            asset_type: None,
        });
        assert_eq!(wizard.asset().name, "Main Control HMI");

        // Editable again after navigating back.
        assert!(wizard.back());
        wizard.apply(WizardCommand::SetAsset {
            name: "Renamed".to_string(),
            asset_type: None,
        });
        assert_eq!(wizard.asset().name, "Renamed");
    }

    #[test]
    fn test_report_step_is_terminal() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        assert!(wizard.advance());
        assert!(wizard.advance());
        assert_eq!(wizard.step(), WizardStep::Report);
        assert!(!wizard.can_advance());
        assert!(!wizard.advance());
        assert_eq!(wizard.step(), WizardStep::Report);
    }

    #[test]
    fn test_back_is_a_no_op_at_the_start() {
        let mut wizard = Wizard::new();
        assert!(!wizard.back());
        assert_eq!(wizard.step(), WizardStep::AssetInput);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut wizard = wizard_at_selection();
        let snapshot = wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        assert_eq!(snapshot.step, WizardStep::TechniqueSelection);
        assert_eq!(snapshot.selected_techniques.len(), 1);
        assert_eq!(snapshot.scores.len(), 1);
        assert!(snapshot.can_advance);
    }

    #[test]
    fn test_rename_propagates_to_scores() {
        let mut wizard = wizard_at_selection();
        wizard.apply(WizardCommand::SelectTechnique(technique("T0817")));
        assert!(wizard.back());
        wizard.apply(WizardCommand::SetAsset {
            name: "Backup HMI".to_string(),
            asset_type: Some(AssetType::Hmi),
        });
        assert_eq!(wizard.scores()[0].asset, "Backup HMI");
    }
}
