// SPDX-License-Identifier: PMPL-1.0-or-later

//! Loader configuration
//!
//! Read from YAML (`.yaml` / `.yml`) or JSON (anything else), e.g.
//!
//! ```yaml
//! language: pl
//! modules: [Draft, PartDesign]
//! search_paths:
//!   - src/Mod/Draft/Resources/translations
//!   - src/Mod/PartDesign/Gui/Resources/translations
//! repair_mojibake: true
//! ```

use crate::error::{LoadError, LoadResult};
use crate::ts::LoadOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Language selected at startup; `None` keeps the source language
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Module prefixes of catalog files, installed in this order
    pub modules: Vec<String>,
    /// Directories searched for `<module>_<language>.ts`
    pub search_paths: Vec<PathBuf>,
    #[serde(flatten)]
    pub options: LoadOptions,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            language: None,
            modules: vec!["Draft".to_string(), "PartDesign".to_string()],
            search_paths: vec![PathBuf::from("translations")],
            options: LoadOptions::default(),
        }
    }
}

impl LoaderConfig {
    pub fn load(path: &Path) -> LoadResult<Self> {
        let raw = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| LoadError::ConfigParse {
            path: path.to_path_buf(),
            message,
        };
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::from_str(&raw).map_err(|e| parse_error(e.to_string()))
            }
            _ => serde_json::from_str(&raw).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Load `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> LoadResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn yaml_config_with_partial_fields() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.yaml");
        fs::write(
            &path,
            "language: ko\nsearch_paths: [i18n]\nrepair_mojibake: false\n",
        )
        .expect("write");

        let config = LoaderConfig::load(&path).expect("load");
        assert_eq!(config.language.as_deref(), Some("ko"));
        assert_eq!(config.search_paths, vec![PathBuf::from("i18n")]);
        assert_eq!(config.modules, LoaderConfig::default().modules);
        assert!(!config.options.repair_mojibake);
        assert!(config.options.normalize_empty_finished);
    }

    #[test]
    fn json_config() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(&path, r#"{"modules": ["Draft"], "normalize_empty_finished": false}"#)
            .expect("write");
        let config = LoaderConfig::load(&path).expect("load");
        assert_eq!(config.modules, vec!["Draft".to_string()]);
        assert!(!config.options.normalize_empty_finished);
    }

    #[test]
    fn malformed_config_is_a_parse_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write");
        assert!(matches!(
            LoaderConfig::load(&path),
            Err(LoadError::ConfigParse { .. })
        ));
        assert!(matches!(
            LoaderConfig::load(&dir.path().join("missing.yaml")),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn no_path_means_defaults() {
        assert_eq!(
            LoaderConfig::load_or_default(None).expect("defaults"),
            LoaderConfig::default()
        );
    }
}
