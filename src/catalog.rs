// SPDX-License-Identifier: PMPL-1.0-or-later

//! Immutable lookup table for one `.ts` catalog
//!
//! # Resolution
//!
//! | Entry for `(context, source)` | `resolve` returns |
//! |-------------------------------|-------------------|
//! | finished                      | the translation   |
//! | unfinished or obsolete only   | `source` unchanged |
//! | none                          | `source` unchanged |
//!
//! # Duplicate keys
//!
//! The same `(context, source, comment)` key may appear several times in
//! a file (one per origin location in some catalogs). Entries merge by
//! status rank: finished beats unfinished beats obsolete, whatever the
//! document order. Two finished entries that disagree keep the first one
//! and are recorded as a [`Conflict`].

use crate::error::LoadResult;
use crate::ts::{self, LoadOptions, LoadWarning};
use crate::types::{Document, Status};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    comment: String,
    status: Status,
    text: String,
}

/// Two finished translations for the same key that disagree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub context: String,
    pub source: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub comment: String,
    pub kept: String,
    pub dropped: String,
}

/// Lookup table for one target language
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    language: String,
    source_language: String,
    origin: Option<PathBuf>,
    digest: Option<String>,
    table: HashMap<String, HashMap<String, Vec<Entry>>>,
    conflicts: Vec<Conflict>,
}

impl Catalog {
    /// A catalog with no entries; every lookup passes the source through
    pub fn empty(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            source_language: "en".to_string(),
            ..Self::default()
        }
    }

    /// Load a `.ts` file and build its table.
    ///
    /// Returns the load warnings alongside the catalog so callers can
    /// surface skipped messages.
    pub fn load(path: &Path, options: &LoadOptions) -> LoadResult<(Self, Vec<LoadWarning>)> {
        let loaded = ts::load(path, options)?;
        let mut catalog = Self::from_document(&loaded.document);
        catalog.origin = Some(path.to_path_buf());
        catalog.digest = Some(loaded.digest);
        Ok((catalog, loaded.warnings))
    }

    pub fn from_document(document: &Document) -> Self {
        let mut catalog = Self {
            language: document.language.clone(),
            source_language: document.source_language.clone(),
            ..Self::default()
        };
        for (context, message) in document.messages() {
            catalog.insert(
                context,
                &message.source,
                Entry {
                    comment: message.comment.clone(),
                    status: message.status,
                    text: message.display_text().to_string(),
                },
            );
        }
        catalog
    }

    fn insert(&mut self, context: &str, source: &str, entry: Entry) {
        let entries = self
            .table
            .entry(context.to_string())
            .or_default()
            .entry(source.to_string())
            .or_default();

        let Some(existing) = entries.iter_mut().find(|e| e.comment == entry.comment) else {
            entries.push(entry);
            return;
        };

        if entry.status.rank() < existing.status.rank() {
            *existing = entry;
        } else if entry.status.is_finished()
            && existing.status.is_finished()
            && entry.text != existing.text
        {
            warn!(
                context,
                source, "conflicting finished translations, keeping the first"
            );
            self.conflicts.push(Conflict {
                context: context.to_string(),
                source: source.to_string(),
                comment: entry.comment,
                kept: existing.text.clone(),
                dropped: entry.text,
            });
        }
    }

    /// Translate `source` within `context`, or pass it through unchanged.
    ///
    /// ```
    /// use ts_catalog::{Catalog, Context, Document, Message, Status};
    ///
    /// let doc = Document::new("pl", "en").with_context(
    ///     Context::new("Draft_Arc").with_message(Message::new("Arc", "Łuk", Status::Finished)),
    /// );
    /// let catalog = Catalog::from_document(&doc);
    /// assert_eq!(catalog.resolve("Draft_Arc", "Arc"), "Łuk");
    /// assert_eq!(catalog.resolve("Draft_Arc", "Circle"), "Circle");
    /// ```
    pub fn resolve<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.lookup(context, source, "").unwrap_or(source)
    }

    /// Like [`Catalog::resolve`] with a disambiguation comment. An exact
    /// comment match wins; otherwise the entry without a comment is used.
    pub fn resolve_disambiguated<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: &str,
    ) -> &'a str {
        self.lookup_disambiguated(context, source, comment)
            .unwrap_or(source)
    }

    /// Finished translation for `comment`, falling back to the entry
    /// without a comment
    pub fn lookup_disambiguated(&self, context: &str, source: &str, comment: &str) -> Option<&str> {
        self.lookup(context, source, comment).or_else(|| {
            if comment.is_empty() {
                None
            } else {
                self.lookup(context, source, "")
            }
        })
    }

    /// The finished translation for an exact key, if any
    pub fn lookup(&self, context: &str, source: &str, comment: &str) -> Option<&str> {
        self.entry(context, source, comment)
            .filter(|(status, _)| status.is_finished())
            .map(|(_, text)| text)
    }

    /// Merged status and text for an exact key
    pub fn entry(&self, context: &str, source: &str, comment: &str) -> Option<(Status, &str)> {
        self.table
            .get(context)?
            .get(source)?
            .iter()
            .find(|e| e.comment == comment)
            .map(|e| (e.status, e.text.as_str()))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// BLAKE3 of the file this catalog was loaded from
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    /// Number of distinct keys after merging
    pub fn len(&self) -> usize {
        self.table
            .values()
            .flat_map(|sources| sources.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of distinct keys that resolve to a translation
    pub fn finished_len(&self) -> usize {
        self.table
            .values()
            .flat_map(|sources| sources.values())
            .flatten()
            .filter(|e| e.status.is_finished())
            .count()
    }

    /// Context names, sorted
    pub fn contexts(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.table.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
