// SPDX-License-Identifier: PMPL-1.0-or-later

//! Errors raised when a catalog cannot be loaded as a whole
//!
//! Problems with individual messages are not errors; they surface as
//! [`crate::ts::LoadWarning`]s and the offending message is skipped.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed XML at byte {position}: {message}")]
    Xml { position: u64, message: String },

    #[error("not a Qt Linguist catalog: {0}")]
    NotATsDocument(String),

    #[error("parsing config {}: {message}", path.display())]
    ConfigParse { path: PathBuf, message: String },
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
