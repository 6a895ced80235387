// SPDX-License-Identifier: PMPL-1.0-or-later

//! Maintainer checks for `.ts` catalogs
//!
//! Runs on a verbatim load (no repair, no normalization) so that it
//! reports what is actually in the file.

use crate::catalog::Catalog;
use crate::locale::LocaleTag;
use crate::mojibake;
use crate::ts::{self, LoadOptions, LoadWarning, WarningKind};
use crate::types::{Document, Message, Status};
use anyhow::{Context as _, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::warn;

/// Qt `%1`..`%99` / `%L1` / `%n` and printf `%s` / `%d`; `%%` is a literal
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%%|%L?\d{1,2}|%[nsd]").expect("placeholder pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FindingKind {
    /// The loader skipped or altered something
    Load { detail: String },
    /// `language` attribute missing or not ISO 639-1
    InvalidLanguage { value: String },
    /// Two finished translations for one key that disagree
    ConflictingDuplicate { kept: String, dropped: String },
    /// Double-encoded UTF-8 in a message body
    Mojibake { field: String },
    /// Finished translation whose placeholders differ from the source
    PlaceholderMismatch {
        missing: Vec<String>,
        extra: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(flatten)]
    pub kind: FindingKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LintReport {
    pub path: PathBuf,
    pub language: String,
    pub messages: usize,
    pub findings: Vec<Finding>,
}

impl LintReport {
    pub fn errors(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warnings(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}

/// Load `path` verbatim and run every check
pub fn check_file(path: &Path) -> Result<LintReport> {
    let loaded = ts::load(path, &LoadOptions::verbatim())
        .with_context(|| format!("loading {}", path.display()))?;
    let mut findings: Vec<Finding> = loaded.warnings.iter().map(load_finding).collect();
    findings.extend(check_document(&loaded.document));
    Ok(LintReport {
        path: path.to_path_buf(),
        language: loaded.document.language.clone(),
        messages: loaded.document.message_count(),
        findings,
    })
}

/// Check every path. A file that cannot be read or parsed becomes a report
/// with one load error, and the remaining files are still checked.
pub fn check_files(paths: &[PathBuf]) -> Vec<LintReport> {
    paths
        .iter()
        .map(|path| check_file(path).unwrap_or_else(|err| unreadable(path, &err)))
        .collect()
}

fn unreadable(path: &Path, err: &anyhow::Error) -> LintReport {
    warn!(path = %path.display(), error = %format!("{:#}", err), "catalog not checked");
    LintReport {
        path: path.to_path_buf(),
        language: String::new(),
        messages: 0,
        findings: vec![Finding {
            severity: Severity::Error,
            context: None,
            source: None,
            location: None,
            kind: FindingKind::Load {
                detail: format!("{:#}", err),
            },
        }],
    }
}

/// Checks that need only the parsed document
pub fn check_document(document: &Document) -> Vec<Finding> {
    let mut findings = Vec::new();

    if LocaleTag::parse(&document.language).is_none() {
        findings.push(Finding {
            severity: Severity::Error,
            context: None,
            source: None,
            location: None,
            kind: FindingKind::InvalidLanguage {
                value: document.language.clone(),
            },
        });
    }

    for conflict in Catalog::from_document(document).conflicts() {
        findings.push(Finding {
            severity: Severity::Warning,
            context: Some(conflict.context.clone()),
            source: Some(conflict.source.clone()),
            location: None,
            kind: FindingKind::ConflictingDuplicate {
                kept: conflict.kept.clone(),
                dropped: conflict.dropped.clone(),
            },
        });
    }

    for (context, message) in document.messages() {
        for (field, text) in [("source", &message.source), ("translation", &message.translation)] {
            if mojibake::is_suspect(text) {
                findings.push(message_finding(
                    Severity::Warning,
                    context,
                    message,
                    FindingKind::Mojibake {
                        field: field.to_string(),
                    },
                ));
            }
        }

        if message.status == Status::Finished {
            if let Some(kind) = placeholder_mismatch(&message.source, message.display_text()) {
                findings.push(message_finding(Severity::Error, context, message, kind));
            }
        }
    }

    findings
}

fn message_finding(
    severity: Severity,
    context: &str,
    message: &Message,
    kind: FindingKind,
) -> Finding {
    Finding {
        severity,
        context: Some(context.to_string()),
        source: Some(message.source.clone()),
        location: message.locations.first().map(|loc| loc.to_string()),
        kind,
    }
}

fn load_finding(warning: &LoadWarning) -> Finding {
    let severity = match warning.kind {
        WarningKind::MissingSource
        | WarningKind::MissingTranslation
        | WarningKind::MissingContextName
        | WarningKind::OrphanMessage
        | WarningKind::UnknownStatus(_) => Severity::Error,
        _ => Severity::Warning,
    };
    Finding {
        severity,
        context: warning.context.clone(),
        source: None,
        location: Some(format!("byte {}", warning.position)),
        kind: FindingKind::Load {
            detail: warning.kind.to_string(),
        },
    }
}

/// Placeholders as a multiset; `%L1` counts as `%1`
fn placeholders(text: &str) -> BTreeMap<String, usize> {
    let mut found = BTreeMap::new();
    for m in PLACEHOLDER.find_iter(text) {
        let token = m.as_str();
        if token == "%%" {
            continue;
        }
        *found.entry(token.replacen("%L", "%", 1)).or_insert(0) += 1;
    }
    found
}

fn placeholder_mismatch(source: &str, translation: &str) -> Option<FindingKind> {
    let expected = placeholders(source);
    let actual = placeholders(translation);
    if expected == actual {
        return None;
    }
    let missing = expected
        .keys()
        .filter(|k| !actual.contains_key(*k))
        .cloned()
        .collect();
    let extra = actual
        .keys()
        .filter(|k| !expected.contains_key(*k))
        .cloned()
        .collect();
    Some(FindingKind::PlaceholderMismatch { missing, extra })
}
