// SPDX-License-Identifier: PMPL-1.0-or-later

//! One language's worth of catalogs
//!
//! Each workbench ships its own `.ts` file (`Draft_pl.ts`,
//! `PartDesign_pl.ts`). A [`Translator`] stacks them for one language;
//! the catalog installed last is consulted first, so a later module can
//! override an earlier one.

use crate::catalog::Catalog;
use crate::config::LoaderConfig;
use crate::locale::LocaleTag;
use crate::ts::{LoadOptions, LoadWarning};
use anyhow::{anyhow, Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Translator {
    language: String,
    catalogs: Vec<Arc<Catalog>>,
    /// Options the catalogs were loaded with
    options: LoadOptions,
}

impl Translator {
    /// A translator with no catalogs; all lookups return the source text
    pub fn empty(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            catalogs: Vec::new(),
            options: LoadOptions::default(),
        }
    }

    /// Add a catalog on top of the stack
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalogs.push(Arc::new(catalog));
        self
    }

    /// Load every configured module catalog for `language`.
    ///
    /// Modules without a catalog file for the language are skipped; a
    /// file that exists but cannot be parsed fails the whole load.
    pub fn load(config: &LoaderConfig, language: &str) -> Result<(Self, Vec<LoadWarning>)> {
        let tag = LocaleTag::parse(language)
            .ok_or_else(|| anyhow!("invalid language tag '{}'", language))?;
        let mut translator = Self::empty(tag.qt_name()).with_options(config.options);
        let mut warnings = Vec::new();

        for module in &config.modules {
            let Some(path) = discover(&config.search_paths, module, &tag) else {
                debug!(module = %module, language = %tag, "no catalog for module");
                continue;
            };
            let (catalog, notes) = Catalog::load(&path, &config.options)
                .with_context(|| format!("loading {}", path.display()))?;
            warnings.extend(notes);
            translator = translator.with_catalog(catalog);
        }

        Ok((translator, warnings))
    }

    /// Record the options the catalogs were built with
    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolve<'a>(&'a self, context: &str, source: &'a str) -> &'a str {
        self.resolve_disambiguated(context, source, "")
    }

    pub fn resolve_disambiguated<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: &str,
    ) -> &'a str {
        // Each catalog falls back to its own plain entry before the next
        // one is asked, like a stack of QTranslators
        self.catalogs
            .iter()
            .rev()
            .find_map(|catalog| catalog.lookup_disambiguated(context, source, comment))
            .unwrap_or(source)
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn catalogs(&self) -> &[Arc<Catalog>] {
        &self.catalogs
    }

    pub fn is_empty(&self) -> bool {
        self.catalogs.is_empty()
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    /// Identity of the loaded files, in stack order, and the options they
    /// were read with; equal fingerprints mean a reload would change nothing
    pub fn fingerprint(&self) -> String {
        let digests: Vec<&str> = self
            .catalogs
            .iter()
            .map(|c| c.digest().unwrap_or("-"))
            .collect();
        format!(
            "{}:m{}e{}:{}",
            self.language,
            u8::from(self.options.repair_mojibake),
            u8::from(self.options.normalize_empty_finished),
            digests.join(",")
        )
    }
}

/// Find `<module>_<tag>.ts` in the search paths, most specific tag first
pub fn discover(search_paths: &[PathBuf], module: &str, tag: &LocaleTag) -> Option<PathBuf> {
    tag.candidates().iter().find_map(|candidate| {
        search_paths
            .iter()
            .map(|dir| catalog_path(dir, module, candidate))
            .find(|path| path.is_file())
    })
}

fn catalog_path(dir: &Path, module: &str, tag: &str) -> PathBuf {
    dir.join(format!("{}_{}.ts", module, tag))
}
