// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report output for the command line

pub mod formatter;
pub mod output;

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;

pub use formatter::ReportFormatter;
pub use output::OutputFormat;

/// Serialize `value` in `format` and write it to `path`
pub fn save<T: Serialize>(value: &T, format: OutputFormat, path: &Path) -> Result<()> {
    let rendered = format.serialize(value)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, rendered)?;
    Ok(())
}
