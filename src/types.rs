// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for ts-catalog
//!
//! Mirrors the structure of a Qt Linguist `.ts` document: a `Document`
//! holds named `Context`s, each holding `Message`s with a translation
//! status and zero or more origin locations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Translation status of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Approved for display
    Finished,
    /// Placeholder; the source text is shown instead
    Unfinished,
    /// No longer present in the application source (`obsolete` / `vanished`)
    Obsolete,
}

impl Status {
    /// Map the `type` attribute of `<translation>`.
    ///
    /// Returns `None` for attribute values this crate does not know.
    pub fn from_type_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None | Some("") => Some(Status::Finished),
            Some("unfinished") => Some(Status::Unfinished),
            Some("obsolete") | Some("vanished") => Some(Status::Obsolete),
            Some(_) => None,
        }
    }

    /// The `type` attribute written for this status, if any.
    pub fn type_attr(&self) -> Option<&'static str> {
        match self {
            Status::Finished => None,
            Status::Unfinished => Some("unfinished"),
            Status::Obsolete => Some("obsolete"),
        }
    }

    /// Merge priority when the same key appears more than once.
    /// Lower wins.
    pub fn rank(&self) -> u8 {
        match self {
            Status::Finished => 0,
            Status::Unfinished => 1,
            Status::Obsolete => 2,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, Status::Finished)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Finished => "finished",
            Status::Unfinished => "unfinished",
            Status::Obsolete => "obsolete",
        };
        f.write_str(label)
    }
}

/// Origin of a message in the application source. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.filename, line),
            None => f.write_str(&self.filename),
        }
    }
}

/// One source string and its translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub source: String,
    pub translation: String,
    pub status: Status,
    /// Obsolete message spelled `type="vanished"` in the file
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub vanished: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    /// Disambiguation comment; part of the lookup key
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translator_comment: Option<String>,
    /// Plural forms for `numerus="yes"` messages
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub numerus_forms: Vec<String>,
}

impl Message {
    pub fn new(source: impl Into<String>, translation: impl Into<String>, status: Status) -> Self {
        Self {
            source: source.into(),
            translation: translation.into(),
            status,
            vanished: false,
            locations: Vec::new(),
            comment: String::new(),
            extra_comment: None,
            translator_comment: None,
            numerus_forms: Vec::new(),
        }
    }

    pub fn with_location(mut self, filename: impl Into<String>, line: Option<u32>) -> Self {
        self.locations.push(Location {
            filename: filename.into(),
            line,
        });
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// The `type` attribute to write back, keeping `vanished` as read
    pub fn type_attr(&self) -> Option<&'static str> {
        match self.status {
            Status::Obsolete if self.vanished => Some("vanished"),
            status => status.type_attr(),
        }
    }

    pub fn is_numerus(&self) -> bool {
        !self.numerus_forms.is_empty()
    }

    /// Text shown when this message is finished. Numerus messages use
    /// their first form.
    pub fn display_text(&self) -> &str {
        match self.numerus_forms.first() {
            Some(form) => form,
            None => &self.translation,
        }
    }

    /// Human-readable location list, e.g. `../../Command.cpp:1403`
    pub fn location_label(&self) -> String {
        if self.locations.is_empty() {
            return "unknown".to_string();
        }
        self.locations
            .iter()
            .map(|loc| loc.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A named group of messages, usually one command or dialog class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub name: String,
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            messages: Vec::new(),
        }
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }
}

/// A parsed `.ts` document for one target language
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    /// `<TS version>` attribute, e.g. `2.0` or `2.1`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Target language tag, e.g. `pl` or `zh_CN`
    pub language: String,
    /// Source language tag, usually `en`
    pub source_language: String,
    pub contexts: Vec<Context>,
}

impl Document {
    pub fn new(language: impl Into<String>, source_language: impl Into<String>) -> Self {
        Self {
            version: Some("2.1".to_string()),
            language: language.into(),
            source_language: source_language.into(),
            contexts: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.contexts.push(context);
        self
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|ctx| ctx.name == name)
    }

    /// Iterate over `(context name, message)` pairs in document order
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|ctx| ctx.messages.iter().map(move |msg| (ctx.name.as_str(), msg)))
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|ctx| ctx.messages.len()).sum()
    }

    /// Apply `f` to every message text field that is shown to users
    pub fn for_each_text_mut(&mut self, mut f: impl FnMut(&str, &mut String)) {
        for ctx in &mut self.contexts {
            for msg in &mut ctx.messages {
                f(&ctx.name, &mut msg.source);
                f(&ctx.name, &mut msg.translation);
                for form in &mut msg.numerus_forms {
                    f(&ctx.name, form);
                }
            }
        }
    }
}
