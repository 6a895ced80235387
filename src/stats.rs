// SPDX-License-Identifier: PMPL-1.0-or-later

//! Translation coverage statistics

use crate::types::{Context, Document, Status};
use serde::{Deserialize, Serialize};

/// Message counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Counts {
    pub total: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub obsolete: usize,
}

impl Counts {
    fn add(&mut self, status: Status) {
        self.total += 1;
        match status {
            Status::Finished => self.finished += 1,
            Status::Unfinished => self.unfinished += 1,
            Status::Obsolete => self.obsolete += 1,
        }
    }

    /// Finished share of the live (non-obsolete) messages, 0-100.
    /// A catalog with nothing live counts as complete.
    pub fn percent_finished(&self) -> f32 {
        let live = self.finished + self.unfinished;
        if live == 0 {
            100.0
        } else {
            (self.finished as f32 / live as f32) * 100.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextStats {
    pub name: String,
    #[serde(flatten)]
    pub counts: Counts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub language: String,
    pub source_language: String,
    pub contexts: usize,
    #[serde(flatten)]
    pub counts: Counts,
    pub percent_finished: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_context: Vec<ContextStats>,
}

/// Count messages by status; `per_context` also fills the breakdown,
/// least translated contexts first
pub fn compute(document: &Document, per_context: bool) -> CatalogStats {
    let mut counts = Counts::default();
    let mut breakdown = Vec::new();

    for context in &document.contexts {
        let ctx_counts = count_context(context);
        counts.total += ctx_counts.total;
        counts.finished += ctx_counts.finished;
        counts.unfinished += ctx_counts.unfinished;
        counts.obsolete += ctx_counts.obsolete;
        if per_context {
            breakdown.push(ContextStats {
                name: context.name.clone(),
                counts: ctx_counts,
            });
        }
    }

    breakdown.sort_by(|a, b| {
        a.counts
            .percent_finished()
            .total_cmp(&b.counts.percent_finished())
            .then_with(|| a.name.cmp(&b.name))
    });

    CatalogStats {
        language: document.language.clone(),
        source_language: document.source_language.clone(),
        contexts: document.contexts.len(),
        percent_finished: counts.percent_finished(),
        counts,
        per_context: breakdown,
    }
}

fn count_context(context: &Context) -> Counts {
    let mut counts = Counts::default();
    for message in &context.messages {
        counts.add(message.status);
    }
    counts
}
