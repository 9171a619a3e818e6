//! Dataset inspection commands: validate, import/normalize, list tactics.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use tokio::sync::RwLock;

use rw_core::import::Importer;
use rw_core::repository::TechniqueRepository;

fn importer() -> Importer {
    Importer::new(Arc::new(RwLock::new(TechniqueRepository::new())))
}

/// Validates a dataset file without loading it anywhere.
pub async fn validate(file: &Path) -> Result<()> {
    let report = importer()
        .validate_path(file)
        .await
        .with_context(|| format!("Failed to validate {}", file.display()))?;

    for warning in &report.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }
    for error in &report.errors {
        println!("{} {}", "error:".red().bold(), error);
    }

    if !report.valid {
        bail!(
            "{} validation error(s) in {}",
            report.errors.len(),
            file.display()
        );
    }
    println!(
        "{} {} row(s) checked",
        "Dataset is valid.".green().bold(),
        report.row_count
    );
    Ok(())
}

/// Imports a dataset and writes it back out as normalized JSON seed rows.
pub async fn import(file: &Path, out: &Path) -> Result<()> {
    let importer = importer();
    let summary = importer
        .import_path(file)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    for warning in &summary.warnings {
        println!("{} {}", "warning:".yellow().bold(), warning);
    }

    let rows = importer.repository().read().await.export_rows();
    let mut json = serde_json::to_string_pretty(&rows)?;
    json.push('\n');
    tokio::fs::write(out, json)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;

    println!(
        "{} {} technique(s) across {} tactic(s) -> {}",
        "Imported".green().bold(),
        summary.rows,
        summary.tactics,
        out.display()
    );
    Ok(())
}

/// Lists the tactics in a dataset with their techniques.
pub async fn tactics(file: &Path) -> Result<()> {
    let importer = importer();
    importer
        .import_path(file)
        .await
        .with_context(|| format!("Failed to import {}", file.display()))?;

    let repo = importer.repository().read().await;
    if repo.is_empty() {
        println!("{}", "Dataset contains no techniques.".yellow());
        return Ok(());
    }

    for tactic in repo.tactics() {
        let techniques = repo.techniques_by_tactic(tactic);
        println!(
            "{} ({} technique(s))",
            tactic.bold(),
            techniques.len()
        );
        for technique in techniques {
            println!("  {}  {}", technique.id.cyan(), technique.name);
        }
    }
    Ok(())
}
