// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scan: coverage across a tree of `.ts` catalogs
//!
//! Walks a directory for `*.ts` files, loads them in parallel and
//! produces a summary sorted by completion (least translated first).

use crate::stats::{self, Counts};
use crate::ts::{self, LoadOptions};
use anyhow::Result;
use colored::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Configuration for a scan run
pub struct ScanConfig {
    /// Root directory to walk
    pub directory: PathBuf,
    /// Only include catalogs for this language (`pl`, `zh_CN`)
    pub language: Option<String>,
    /// Only include catalogs below this completion percentage
    pub below_percent: Option<f32>,
    pub options: LoadOptions,
}

/// Result for a single catalog file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResult {
    pub path: PathBuf,
    /// File name prefix before the language suffix, e.g. `PartDesign`
    pub module: String,
    pub language: String,
    #[serde(flatten)]
    pub counts: Counts,
    pub percent_finished: f32,
    pub warnings: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub created_at: String,
    pub directory: PathBuf,
    pub files_scanned: usize,
    pub files_failed: usize,
    pub total_messages: usize,
    pub total_finished: usize,
    pub results: Vec<FileResult>,
}

/// Find all `.ts` files below `directory`, sorted
fn discover_catalogs(directory: &Path) -> Result<Vec<PathBuf>> {
    if !directory.is_dir() {
        anyhow::bail!("Not a directory: {}", directory.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(directory)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == "ts")
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// `PartDesign_ko.ts` -> `("PartDesign", "ko")`, `Draft_zh-CN.ts` -> `("Draft", "zh-CN")`
fn split_file_name(path: &Path) -> (String, String) {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    // Regional tags carry their own underscore (`Draft_zh_CN`)
    let parts: Vec<&str> = stem.split('_').collect();
    match parts.as_slice() {
        [] | [_] => (stem.clone(), String::new()),
        [module @ .., lang, region]
            if !module.is_empty()
                && region.len() == 2
                && region.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            (module.join("_"), format!("{}_{}", lang, region))
        }
        [module @ .., lang] => (module.join("_"), lang.to_string()),
    }
}

fn scan_file(path: &Path, options: &LoadOptions) -> FileResult {
    let (module, file_language) = split_file_name(path);
    match ts::load(path, options) {
        Ok(loaded) => {
            let stats = stats::compute(&loaded.document, false);
            let language = if loaded.document.language.is_empty() {
                file_language
            } else {
                loaded.document.language.clone()
            };
            FileResult {
                path: path.to_path_buf(),
                module,
                language,
                counts: stats.counts,
                percent_finished: stats.percent_finished,
                warnings: loaded.warnings.len(),
                error: None,
            }
        }
        Err(err) => FileResult {
            path: path.to_path_buf(),
            module,
            language: file_language,
            counts: Counts::default(),
            percent_finished: 0.0,
            warnings: 0,
            error: Some(err.to_string()),
        },
    }
}

/// Run a scan over `config.directory`
pub fn run(config: &ScanConfig) -> Result<ScanReport> {
    let files = discover_catalogs(&config.directory)?;
    let scanned = files.len();

    let mut results: Vec<FileResult> = files
        .par_iter()
        .map(|path| scan_file(path, &config.options))
        .collect();

    if let Some(language) = &config.language {
        results.retain(|r| r.language.eq_ignore_ascii_case(language));
    }
    if let Some(limit) = config.below_percent {
        results.retain(|r| r.error.is_some() || r.percent_finished < limit);
    }

    // Least translated first; ties by path for stable output
    results.sort_by(|a, b| {
        a.percent_finished
            .total_cmp(&b.percent_finished)
            .then_with(|| a.path.cmp(&b.path))
    });

    Ok(ScanReport {
        created_at: chrono::Utc::now().to_rfc3339(),
        directory: config.directory.clone(),
        files_scanned: scanned,
        files_failed: results.iter().filter(|r| r.error.is_some()).count(),
        total_messages: results.iter().map(|r| r.counts.total).sum(),
        total_finished: results.iter().map(|r| r.counts.finished).sum(),
        results,
    })
}

/// Print a summary table to the terminal
pub fn print_summary(report: &ScanReport, quiet: bool) {
    if quiet {
        return;
    }

    println!("\n{}", "=== CATALOG SCAN ===".bold().cyan());
    println!(
        "Directory: {}  |  Catalogs: {}  |  Failed: {}",
        report.directory.display(),
        report.files_scanned,
        report.files_failed
    );
    println!(
        "Messages: {}  |  Finished: {}",
        report.total_messages, report.total_finished
    );
    println!();

    if report.results.is_empty() {
        println!("  No catalogs matched.");
        return;
    }

    println!(
        "  {:<24} {:<8} {:>7} {:>8} {:>10} {:>8}",
        "Module", "Lang", "Total", "Finished", "Unfinished", "Done"
    );
    println!("  {}", "-".repeat(72));

    for result in report.results.iter().take(40) {
        if let Some(err) = &result.error {
            println!(
                "  {:<24} {:<8} {}",
                result.module,
                result.language,
                format!("ERROR: {}", err).red()
            );
            continue;
        }
        let done = format!("{:.1}%", result.percent_finished);
        let done = if result.percent_finished >= 90.0 {
            done.green()
        } else if result.percent_finished >= 50.0 {
            done.yellow()
        } else {
            done.red()
        };
        println!(
            "  {:<24} {:<8} {:>7} {:>8} {:>10} {:>8}",
            result.module,
            result.language,
            result.counts.total,
            result.counts.finished,
            result.counts.unfinished,
            done
        );
    }

    if report.results.len() > 40 {
        println!("  ... and {} more catalogs", report.results.len() - 40);
    }
    println!();
}

/// Write scan report as JSON
pub fn write_report(report: &ScanReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    Ok(())
}
