//! # rw-core
//!
//! Core logic for Risk Warden, a step-by-step cybersecurity risk assessment
//! for industrial control system assets.
//!
//! This crate provides the technique dataset repository, the validating
//! importer, the four-step assessment wizard state machine, risk aggregation,
//! and mitigation report generation. Rendering and report export formats are
//! left to consumers of the [`report::ReportExporter`] seam.

pub mod import;
pub mod models;
pub mod report;
pub mod repository;
pub mod risk;
pub mod wizard;

pub use import::{ImportError, ImportFormat, ImportSummary, Importer, ValidationReport};
pub use models::{Asset, AssetType, RiskScore, Technique, TechniqueRow};
pub use report::{
    AssessmentReport, JsonReportExporter, MitigationFinding, ReportError, ReportExporter,
    RiskBreakdown,
};
pub use repository::TechniqueRepository;
pub use risk::{average_risk, weighted_average_risk, RiskLevel};
pub use wizard::{Wizard, WizardCommand, WizardSnapshot, WizardStep};
