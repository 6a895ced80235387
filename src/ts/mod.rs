// SPDX-License-Identifier: PMPL-1.0-or-later

//! Qt Linguist `.ts` reading and writing
//!
//! The reader is lenient: a message missing its `<source>` or
//! `<translation>` is skipped and reported as a [`LoadWarning`], and the
//! rest of the file still loads. Only a document that is not XML, or not
//! a `<TS>` document at all, fails with [`crate::LoadError`].

mod reader;
mod writer;

pub use reader::{load, parse_bytes, parse_str};
pub use writer::{to_ts_string, write_file};

use crate::types::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Knobs applied while turning a `.ts` file into a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Repair double-encoded UTF-8 that carries raw C1 controls
    /// (`â\u{80}¢` back to `•`); see [`crate::mojibake`]
    pub repair_mojibake: bool,
    /// Demote finished messages with an empty or whitespace-only
    /// translation to unfinished
    pub normalize_empty_finished: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            repair_mojibake: true,
            normalize_empty_finished: true,
        }
    }
}

impl LoadOptions {
    /// Keep the document exactly as written; used by lint and repair
    pub fn verbatim() -> Self {
        Self {
            repair_mojibake: false,
            normalize_empty_finished: false,
        }
    }
}

/// Result of reading one `.ts` file
#[derive(Debug, Clone)]
pub struct Loaded {
    pub document: Document,
    pub warnings: Vec<LoadWarning>,
    /// BLAKE3 of the raw input, hex encoded
    pub digest: String,
}

/// A non-fatal problem found while loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadWarning {
    /// Byte offset of the element that triggered the warning
    pub position: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub kind: WarningKind,
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "[{}] byte {}: {}", ctx, self.position, self.kind),
            None => write!(f, "byte {}: {}", self.position, self.kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum WarningKind {
    /// Message without `<source>`; skipped
    MissingSource,
    /// Message without `<translation>`; skipped
    MissingTranslation,
    /// Context without `<name>`; skipped with all its messages
    MissingContextName,
    /// Message outside any `<context>`; skipped
    OrphanMessage,
    /// Unrecognised `type` attribute on `<translation>`; message skipped
    UnknownStatus(String),
    /// `line` attribute that is not a number; location kept without a line
    BadLineNumber(String),
    /// Finished message with empty text, demoted to unfinished
    EmptyFinished(String),
    /// Double-encoded text that was repaired
    MojibakeRepaired(String),
    /// Input was not UTF-8 and was decoded as Windows-1252
    NotUtf8,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::MissingSource => f.write_str("message has no <source>, skipped"),
            WarningKind::MissingTranslation => {
                f.write_str("message has no <translation>, skipped")
            }
            WarningKind::MissingContextName => {
                f.write_str("context has no <name>, skipped with its messages")
            }
            WarningKind::OrphanMessage => f.write_str("message outside <context>, skipped"),
            WarningKind::UnknownStatus(value) => {
                write!(f, "unknown translation type '{}', message skipped", value)
            }
            WarningKind::BadLineNumber(value) => {
                write!(f, "location line '{}' is not a number", value)
            }
            WarningKind::EmptyFinished(source) => {
                write!(f, "finished translation of '{}' is empty, treated as unfinished", source)
            }
            WarningKind::MojibakeRepaired(text) => write!(f, "repaired double-encoded text '{}'", text),
            WarningKind::NotUtf8 => f.write_str("input is not UTF-8, decoded as Windows-1252"),
        }
    }
}
