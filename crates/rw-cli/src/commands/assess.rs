//! Scripted assessment: drives the wizard end to end and emits a report.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use colored::{ColoredString, Colorize};
use tokio::sync::RwLock;

use rw_core::import::Importer;
use rw_core::models::AssetType;
use rw_core::report::{AssessmentReport, JsonReportExporter, ReportExporter};
use rw_core::repository::TechniqueRepository;
use rw_core::risk::RiskLevel;
use rw_core::wizard::{Wizard, WizardCommand};

/// Inputs for a scripted assessment run.
pub struct AssessArgs {
    /// Technique dataset to assess against.
    pub data: PathBuf,
    /// Name of the asset under assessment.
    pub asset: String,
    /// Asset category.
    pub asset_type: AssetType,
    /// Technique id / raw score pairs, in the order given on the command line.
    pub scores: Vec<(String, i64)>,
    /// Where to write the JSON report; stdout when absent.
    pub output: Option<PathBuf>,
    /// Pretty-print the JSON report.
    pub pretty: bool,
}

/// Parses a `TECHNIQUE_ID=SCORE` argument.
pub fn parse_score_spec(spec: &str) -> Result<(String, i64)> {
    let (id, value) = spec
        .split_once('=')
        .with_context(|| format!("Invalid score '{}': expected TECHNIQUE_ID=SCORE", spec))?;
    let id = id.trim();
    ensure!(!id.is_empty(), "Invalid score '{}': empty technique id", spec);
    let value: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid score '{}': score must be an integer", spec))?;
    Ok((id.to_string(), value))
}

/// Runs the full wizard flow against the given dataset.
pub async fn run(args: AssessArgs) -> Result<()> {
    let repository = Arc::new(RwLock::new(TechniqueRepository::new()));
    let importer = Importer::new(repository.clone());
    importer
        .import_path(&args.data)
        .await
        .with_context(|| format!("Failed to import {}", args.data.display()))?;
    let repo = repository.read().await;

    let mut wizard = Wizard::new();
    wizard.apply(WizardCommand::SetAsset {
        name: args.asset.clone(),
        asset_type: Some(args.asset_type),
    });
    ensure!(wizard.advance(), "Asset name must not be empty");

    for (id, _) in &args.scores {
        let technique = repo
            .technique(id)
            .with_context(|| format!("Unknown technique id: {}", id))?;
        wizard.apply(WizardCommand::SelectTechnique(technique.clone()));
    }
    ensure!(wizard.advance(), "At least one technique must be selected");

    for (id, score) in &args.scores {
        wizard.apply(WizardCommand::SetScore {
            technique_id: id.clone(),
            score: *score,
        });
    }
    ensure!(wizard.advance(), "At least one risk score must be recorded");

    let report = AssessmentReport::build(&wizard, &repo)?;
    let exporter = JsonReportExporter { pretty: args.pretty };
    match &args.output {
        Some(path) => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            exporter.export(&report, &mut file)?;
            print_summary(&report);
            println!("Report written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            exporter.export(&report, &mut stdout.lock())?;
        }
    }
    Ok(())
}

fn print_summary(report: &AssessmentReport) {
    println!(
        "{} {}  total risk {}/10 ({})",
        "Assessment complete:".green().bold(),
        report.asset.name,
        report.total_risk,
        colorize_level(report.risk_level)
    );
    println!(
        "  {} high / {} medium / {} low",
        report.breakdown.high, report.breakdown.medium, report.breakdown.low
    );
}

fn colorize_level(level: RiskLevel) -> ColoredString {
    let label = level.to_string();
    match level {
        RiskLevel::Critical | RiskLevel::High => label.red().bold(),
        RiskLevel::Medium => label.yellow().bold(),
        RiskLevel::Low | RiskLevel::Minimal => label.green().bold(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_spec() {
        assert_eq!(
            parse_score_spec("T0817=7").unwrap(),
            ("T0817".to_string(), 7)
        );
        assert_eq!(
            parse_score_spec(" T0826 = 10 ").unwrap(),
            ("T0826".to_string(), 10)
        );
    }

    #[test]
    fn test_parse_score_spec_rejects_malformed_input() {
        assert!(parse_score_spec("T0817").is_err());
        assert!(parse_score_spec("=7").is_err());
        assert!(parse_score_spec("T0817=high").is_err());
    }
}
