// SPDX-License-Identifier: PMPL-1.0-or-later

//! The process-wide active language
//!
//! A language switch builds a complete [`Translator`] off to the side and
//! publishes it with one atomic pointer swap. Lookups never block: they
//! read whatever translator is published at that instant, and a snapshot
//! taken before a swap keeps answering from the old catalogs until it is
//! dropped. Published translators are never mutated.

use crate::config::LoaderConfig;
use crate::locale::LocaleTag;
use crate::translator::Translator;
use anyhow::Result;
use arc_swap::ArcSwap;
use serde::Serialize;
use std::sync::{Arc, LazyLock};
use tracing::{error, info};

/// What happened on a language switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// New catalogs are live
    Switched {
        language: String,
        catalogs: usize,
        warnings: usize,
    },
    /// The same files are already live; nothing was swapped
    Unchanged { language: String },
    /// Loading failed; an empty translator for `language` is live
    FellBack { language: String, error: String },
}

pub struct ActiveLocale {
    current: ArcSwap<Translator>,
}

impl Default for ActiveLocale {
    fn default() -> Self {
        Self::new(Translator::empty("en"))
    }
}

impl ActiveLocale {
    pub fn new(translator: Translator) -> Self {
        Self {
            current: ArcSwap::from_pointee(translator),
        }
    }

    /// The translator published right now
    pub fn snapshot(&self) -> Arc<Translator> {
        self.current.load_full()
    }

    pub fn language(&self) -> String {
        self.current.load().language().to_string()
    }

    /// Translate through the current translator
    pub fn tr(&self, context: &str, source: &str) -> String {
        self.current.load().resolve(context, source).to_string()
    }

    pub fn tr_disambiguated(&self, context: &str, source: &str, comment: &str) -> String {
        self.current
            .load()
            .resolve_disambiguated(context, source, comment)
            .to_string()
    }

    /// Publish `translator`, returning the one it replaced
    pub fn publish(&self, translator: Translator) -> Arc<Translator> {
        info!(
            language = translator.language(),
            catalogs = translator.catalogs().len(),
            "publishing translator"
        );
        self.current.swap(Arc::new(translator))
    }

    /// Load `language` and publish it. On failure the current translator
    /// stays live and the error is returned.
    pub fn switch(&self, config: &LoaderConfig, language: &str) -> Result<SwitchOutcome> {
        let (translator, warnings) = Translator::load(config, language)?;
        if translator.fingerprint() == self.current.load().fingerprint() {
            info!(language = translator.language(), "catalogs unchanged, keeping");
            return Ok(SwitchOutcome::Unchanged {
                language: translator.language().to_string(),
            });
        }
        let outcome = SwitchOutcome::Switched {
            language: translator.language().to_string(),
            catalogs: translator.catalogs().len(),
            warnings: warnings.len(),
        };
        self.publish(translator);
        Ok(outcome)
    }

    /// Like [`ActiveLocale::switch`], but a failed load publishes an empty
    /// translator so the application falls back to untranslated text.
    pub fn switch_or_empty(&self, config: &LoaderConfig, language: &str) -> SwitchOutcome {
        match self.switch(config, language) {
            Ok(outcome) => outcome,
            Err(err) => {
                let language = LocaleTag::parse(language)
                    .map(|tag| tag.qt_name())
                    .unwrap_or_else(|| language.to_string());
                error!(language = %language, error = %format!("{:#}", err), "language switch failed, using source text");
                self.publish(Translator::empty(language.clone()));
                SwitchOutcome::FellBack {
                    language,
                    error: format!("{:#}", err),
                }
            }
        }
    }
}

static GLOBAL: LazyLock<ActiveLocale> = LazyLock::new(ActiveLocale::default);

/// The application-wide active locale
pub fn global() -> &'static ActiveLocale {
    &GLOBAL
}

/// Translate through the application-wide active locale
pub fn tr(context: &str, source: &str) -> String {
    GLOBAL.tr(context, source)
}
