// SPDX-License-Identifier: PMPL-1.0-or-later

//! Colored terminal output

use crate::lint::{FindingKind, LintReport, Severity};
use crate::locale::LocaleTag;
use crate::stats::{CatalogStats, Counts};
use crate::types::{Document, Status};
use colored::*;

/// How many per-context rows `print_stats` shows
const CONTEXT_ROWS: usize = 25;

pub struct ReportFormatter {
    quiet: bool,
}

impl ReportFormatter {
    pub fn new() -> Self {
        Self { quiet: false }
    }

    /// Suppress headers and tables; only findings and errors print
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn print_stats(&self, stats: &CatalogStats) {
        if !self.quiet {
            println!("\n{}", "=== CATALOG STATISTICS ===".bold().cyan());
        }
        let name = LocaleTag::parse(&stats.language)
            .and_then(|tag| tag.english_name())
            .unwrap_or("unknown");
        println!(
            "  Language: {} {} (source: {})  |  Contexts: {}",
            stats.language.bold(),
            format!("[{}]", name).dimmed(),
            stats.source_language,
            stats.contexts
        );
        self.print_counts("  ", &stats.counts);
        println!("  Finished: {}", percent(stats.percent_finished));

        if stats.per_context.is_empty() || self.quiet {
            return;
        }
        println!();
        println!(
            "  {:<40} {:>6} {:>8} {:>10} {:>8}",
            "Context", "Total", "Finished", "Unfinished", "Done"
        );
        println!("  {}", "-".repeat(76));
        for ctx in stats.per_context.iter().take(CONTEXT_ROWS) {
            println!(
                "  {:<40} {:>6} {:>8} {:>10} {:>8}",
                ctx.name,
                ctx.counts.total,
                ctx.counts.finished,
                ctx.counts.unfinished,
                percent(ctx.counts.percent_finished())
            );
        }
        if stats.per_context.len() > CONTEXT_ROWS {
            println!(
                "  ... and {} more contexts",
                stats.per_context.len() - CONTEXT_ROWS
            );
        }
    }

    fn print_counts(&self, indent: &str, counts: &Counts) {
        println!(
            "{}Messages: {}  |  {} {}  |  {} {}  |  {} {}",
            indent,
            counts.total,
            "finished".green(),
            counts.finished,
            "unfinished".yellow(),
            counts.unfinished,
            "obsolete".dimmed(),
            counts.obsolete
        );
    }

    pub fn print_lint(&self, report: &LintReport) {
        let header = format!(
            "{} ({}, {} messages)",
            report.path.display(),
            if report.language.is_empty() {
                "no language"
            } else {
                report.language.as_str()
            },
            report.messages
        );
        if report.findings.is_empty() {
            if !self.quiet {
                println!("{} {}", "OK".green().bold(), header);
            }
            return;
        }

        println!(
            "{} {}: {} errors, {} warnings",
            if report.errors() > 0 {
                "FAIL".red().bold()
            } else {
                "WARN".yellow().bold()
            },
            header,
            report.errors(),
            report.warnings()
        );
        for finding in &report.findings {
            let tag = match finding.severity {
                Severity::Error => "error".red(),
                Severity::Warning => "warning".yellow(),
            };
            let mut place = String::new();
            if let Some(ctx) = &finding.context {
                place.push_str(ctx);
            }
            if let Some(source) = &finding.source {
                place.push_str(&format!(" \"{}\"", source));
            }
            println!("  {}: {} {}", tag, describe(&finding.kind), place.dimmed());
            if let Some(loc) = &finding.location {
                println!("      at {}", loc.dimmed());
            }
        }
    }

    /// Human-readable dump of a document, one line per message
    pub fn print_document(&self, document: &Document) {
        if !self.quiet {
            println!(
                "{} {} -> {} ({} contexts)",
                "TS".bold().cyan(),
                document.source_language,
                document.language,
                document.contexts.len()
            );
        }
        for context in &document.contexts {
            println!("{}", context.name.bold());
            for message in &context.messages {
                let status = match message.status {
                    Status::Finished => "finished".green(),
                    Status::Unfinished => "unfinished".yellow(),
                    Status::Obsolete => "obsolete".dimmed(),
                };
                let disambiguation = if message.comment.is_empty() {
                    String::new()
                } else {
                    format!(" ({})", message.comment)
                };
                println!(
                    "  [{}] {}{} => {}",
                    status,
                    message.source,
                    disambiguation.dimmed(),
                    message.display_text()
                );
            }
        }
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn percent(value: f32) -> ColoredString {
    let text = format!("{:.1}%", value);
    if value >= 90.0 {
        text.green()
    } else if value >= 50.0 {
        text.yellow()
    } else {
        text.red()
    }
}

fn describe(kind: &FindingKind) -> String {
    match kind {
        FindingKind::Load { detail } => detail.clone(),
        FindingKind::InvalidLanguage { value } if value.is_empty() => {
            "missing language attribute".to_string()
        }
        FindingKind::InvalidLanguage { value } => format!("invalid language '{}'", value),
        FindingKind::ConflictingDuplicate { kept, dropped } => {
            format!("duplicate finished translation: kept '{}', dropped '{}'", kept, dropped)
        }
        FindingKind::Mojibake { field } => format!("double-encoded UTF-8 in {}", field),
        FindingKind::PlaceholderMismatch { missing, extra } => {
            let mut parts = Vec::new();
            if !missing.is_empty() {
                parts.push(format!("missing {}", missing.join(" ")));
            }
            if !extra.is_empty() {
                parts.push(format!("unexpected {}", extra.join(" ")));
            }
            format!("placeholder mismatch: {}", parts.join(", "))
        }
    }
}
