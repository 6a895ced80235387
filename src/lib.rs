// SPDX-License-Identifier: PMPL-1.0-or-later

//! ts-catalog: Qt Linguist `.ts` catalogs with source-text fallback.
//!
//! Loads `.ts` translation catalogs into immutable lookup tables and
//! resolves `(context, source)` pairs to display text. Only messages
//! marked finished are ever shown; unfinished, obsolete and missing
//! messages fall back to the source string.
//!
//! ```
//! use ts_catalog::{Catalog, Context, Document, Message, Status};
//!
//! let doc = Document::new("pl", "en").with_context(
//!     Context::new("Draft_Layer")
//!         .with_message(Message::new("Layer", "Layer", Status::Unfinished)),
//! );
//! let catalog = Catalog::from_document(&doc);
//! assert_eq!(catalog.resolve("Draft_Layer", "Layer"), "Layer");
//! assert_eq!(catalog.resolve("Draft_Layer", "Nonexistent"), "Nonexistent");
//! ```
//!
//! PIECES:
//! 1. **ts**: lenient quick-xml reader and a writer for round trips.
//! 2. **catalog / translator**: merge rule, disambiguation and per-module
//!    catalog stacks.
//! 3. **active**: the process-wide language, swapped atomically.
//! 4. **lint / stats / scan**: maintainer tooling behind the CLI.

pub mod active;
pub mod catalog;
pub mod config;
pub mod error;
pub mod lint;
pub mod locale;
pub mod mojibake;
pub mod report;
pub mod scan;
pub mod stats;
pub mod translator;
pub mod ts;
pub mod types;

pub use active::{ActiveLocale, SwitchOutcome};
pub use catalog::{Catalog, Conflict};
pub use config::LoaderConfig;
pub use error::{LoadError, LoadResult};
pub use locale::LocaleTag;
pub use translator::Translator;
pub use ts::{LoadOptions, LoadWarning, Loaded, WarningKind};
pub use types::{Context, Document, Location, Message, Status};
