// SPDX-License-Identifier: PMPL-1.0-or-later

//! Streaming `.ts` reader built on quick-xml

use super::{LoadOptions, LoadWarning, Loaded, WarningKind};
use crate::error::{LoadError, LoadResult};
use crate::mojibake;
use crate::types::{Context, Document, Location, Message, Status};
use encoding_rs::WINDOWS_1252;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read and parse a `.ts` file from disk
pub fn load(path: &Path, options: &LoadOptions) -> LoadResult<Loaded> {
    let raw = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let loaded = parse_bytes(&raw, options)?;
    debug!(
        path = %path.display(),
        language = %loaded.document.language,
        contexts = loaded.document.contexts.len(),
        messages = loaded.document.message_count(),
        warnings = loaded.warnings.len(),
        "loaded catalog"
    );
    Ok(loaded)
}

/// Parse raw bytes, falling back to Windows-1252 when they are not UTF-8
pub fn parse_bytes(raw: &[u8], options: &LoadOptions) -> LoadResult<Loaded> {
    let digest = blake3::hash(raw).to_hex().to_string();
    let body = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);

    let mut notes = Vec::new();
    let text: Cow<'_, str> = match std::str::from_utf8(body) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            warn!("catalog is not UTF-8, decoding as Windows-1252");
            notes.push(LoadWarning {
                position: 0,
                context: None,
                kind: WarningKind::NotUtf8,
            });
            let (decoded, _, _) = WINDOWS_1252.decode(body);
            decoded
        }
    };

    let (document, warnings) = parse_document(&text, options)?;
    notes.extend(warnings);
    Ok(Loaded {
        document,
        warnings: notes,
        digest,
    })
}

/// Parse an in-memory `.ts` document
pub fn parse_str(text: &str, options: &LoadOptions) -> LoadResult<Loaded> {
    let (document, warnings) = parse_document(text, options)?;
    Ok(Loaded {
        document,
        warnings,
        digest: blake3::hash(text.as_bytes()).to_hex().to_string(),
    })
}

fn parse_document(text: &str, options: &LoadOptions) -> LoadResult<(Document, Vec<LoadWarning>)> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);
    let mut parser = TsParser::new(*options);

    loop {
        let position = reader.buffer_position() as u64;
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(&e);
                parser.open(&name, &e, position)?;
                parser.stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = local_name(&e);
                parser.open(&name, &e, position)?;
                parser.close(&name);
            }
            Ok(Event::End(_)) => {
                if let Some(name) = parser.stack.pop() {
                    parser.close(&name);
                }
            }
            Ok(Event::Text(e)) => {
                let unescaped = e.unescape().map_err(|err| LoadError::Xml {
                    position,
                    message: err.to_string(),
                })?;
                parser.push_text(&unescaped);
            }
            Ok(Event::CData(e)) => parser.push_text(&String::from_utf8_lossy(&e)),
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(LoadError::Xml {
                    position: reader.error_position() as u64,
                    message: err.to_string(),
                })
            }
        }
    }

    if !parser.saw_root {
        return Err(LoadError::NotATsDocument(
            "no <TS> root element".to_string(),
        ));
    }
    if let Some(open) = parser.stack.last() {
        return Err(LoadError::Xml {
            position: text.len() as u64,
            message: format!("document ends inside <{}>", open),
        });
    }

    Ok((parser.document, parser.warnings))
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attr(e: &BytesStart<'_>, key: &str) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Absolute (`1347`) or relative (`+3`, `-2`) line attribute
fn parse_line(raw: &str, previous: Option<u32>) -> Option<u32> {
    let raw = raw.trim();
    if let Some(delta) = raw.strip_prefix('+') {
        let delta: u32 = delta.parse().ok()?;
        return previous.unwrap_or(0).checked_add(delta);
    }
    if let Some(delta) = raw.strip_prefix('-') {
        let delta: u32 = delta.parse().ok()?;
        return Some(previous.unwrap_or(0).saturating_sub(delta));
    }
    raw.parse().ok()
}

fn excerpt(text: &str) -> String {
    const MAX: usize = 40;
    if text.chars().count() <= MAX {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX).collect();
    format!("{}...", head)
}

struct PendingContext {
    position: u64,
    name: Option<String>,
    messages: Vec<Message>,
}

#[derive(Default)]
struct PendingMessage {
    position: u64,
    numerus: bool,
    source: Option<String>,
    translation: Option<String>,
    status_attr: Option<String>,
    numerus_forms: Vec<String>,
    locations: Vec<Location>,
    comment: Option<String>,
    extra_comment: Option<String>,
    translator_comment: Option<String>,
}

struct TsParser {
    options: LoadOptions,
    document: Document,
    saw_root: bool,
    stack: Vec<String>,
    context: Option<PendingContext>,
    message: Option<PendingMessage>,
    last_file: Option<String>,
    last_lines: HashMap<String, u32>,
    warnings: Vec<LoadWarning>,
}

impl TsParser {
    fn new(options: LoadOptions) -> Self {
        Self {
            options,
            document: Document::default(),
            saw_root: false,
            stack: Vec::new(),
            context: None,
            message: None,
            last_file: None,
            last_lines: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    fn note(&mut self, position: u64, kind: WarningKind) {
        let context = self.context.as_ref().and_then(|ctx| ctx.name.clone());
        warn!(
            position,
            context = context.as_deref().unwrap_or("-"),
            "{}",
            kind
        );
        self.warnings.push(LoadWarning {
            position,
            context,
            kind,
        });
    }

    fn open(&mut self, name: &str, e: &BytesStart<'_>, position: u64) -> LoadResult<()> {
        if !self.saw_root {
            if name != "TS" {
                return Err(LoadError::NotATsDocument(format!(
                    "root element is <{}>",
                    name
                )));
            }
            self.saw_root = true;
            self.document.version = attr(e, "version");
            self.document.language = attr(e, "language").unwrap_or_default();
            self.document.source_language =
                attr(e, "sourcelanguage").unwrap_or_else(|| "en".to_string());
            return Ok(());
        }

        match name {
            "context" => {
                self.context = Some(PendingContext {
                    position,
                    name: None,
                    messages: Vec::new(),
                });
            }
            "name" if self.message.is_none() && self.stack.last().map(String::as_str) == Some("context") => {
                if let Some(ctx) = self.context.as_mut() {
                    ctx.name = Some(String::new());
                }
            }
            "message" => {
                self.message = Some(PendingMessage {
                    position,
                    numerus: attr(e, "numerus").as_deref() == Some("yes"),
                    ..PendingMessage::default()
                });
            }
            "location" => self.location(e, position),
            "byte" => {
                let value = attr(e, "value").unwrap_or_default();
                let digits = value.trim_start_matches('x');
                if let Some(ch) = u32::from_str_radix(digits, 16)
                    .ok()
                    .and_then(char::from_u32)
                {
                    self.push_text(&ch.to_string());
                }
            }
            _ => {
                if let Some(msg) = self.message.as_mut() {
                    match name {
                        "source" => msg.source = Some(String::new()),
                        "comment" => msg.comment = Some(String::new()),
                        "extracomment" => msg.extra_comment = Some(String::new()),
                        "translatorcomment" => msg.translator_comment = Some(String::new()),
                        "translation" => {
                            msg.translation = Some(String::new());
                            msg.status_attr = attr(e, "type");
                        }
                        "numerusform" => msg.numerus_forms.push(String::new()),
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }

    fn close(&mut self, name: &str) {
        match name {
            "message" => self.finish_message(),
            "context" => self.finish_context(),
            _ => {}
        }
    }

    /// The string that character data at the current position belongs to
    fn text_slot(&mut self) -> Option<&mut String> {
        let depth = self.stack.len();
        let top = self.stack.last()?.as_str();
        let parent = depth.checked_sub(2).map(|i| self.stack[i].as_str());
        match (top, parent) {
            ("name", Some("context")) if self.message.is_none() => {
                self.context.as_mut()?.name.as_mut()
            }
            ("source", Some("message")) => self.message.as_mut()?.source.as_mut(),
            ("comment", Some("message")) => self.message.as_mut()?.comment.as_mut(),
            ("extracomment", Some("message")) => self.message.as_mut()?.extra_comment.as_mut(),
            ("translatorcomment", Some("message")) => {
                self.message.as_mut()?.translator_comment.as_mut()
            }
            ("translation", Some("message")) => self.message.as_mut()?.translation.as_mut(),
            ("numerusform", Some("translation")) => self.message.as_mut()?.numerus_forms.last_mut(),
            _ => None,
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(slot) = self.text_slot() {
            if text.contains("\r\n") {
                slot.push_str(&text.replace("\r\n", "\n"));
            } else {
                slot.push_str(text);
            }
        }
    }

    fn location(&mut self, e: &BytesStart<'_>, position: u64) {
        if self.message.is_none() {
            return;
        }
        let filename = attr(e, "filename")
            .or_else(|| self.last_file.clone())
            .unwrap_or_default();
        let line = match attr(e, "line") {
            None => None,
            Some(raw) => match parse_line(&raw, self.last_lines.get(&filename).copied()) {
                Some(line) => Some(line),
                None => {
                    self.note(position, WarningKind::BadLineNumber(raw));
                    None
                }
            },
        };
        if let Some(line) = line {
            self.last_lines.insert(filename.clone(), line);
        }
        self.last_file = Some(filename.clone());
        if let Some(msg) = self.message.as_mut() {
            msg.locations.push(Location { filename, line });
        }
    }

    fn repair(&mut self, text: &mut String, position: u64) {
        if !self.options.repair_mojibake {
            return;
        }
        if let Some(fixed) = mojibake::repair_unambiguous(text) {
            self.note(position, WarningKind::MojibakeRepaired(excerpt(&fixed)));
            *text = fixed;
        }
    }

    fn finish_message(&mut self) {
        let Some(pending) = self.message.take() else {
            return;
        };
        let position = pending.position;
        if self.context.is_none() {
            self.note(position, WarningKind::OrphanMessage);
            return;
        }
        let Some(mut source) = pending.source else {
            self.note(position, WarningKind::MissingSource);
            return;
        };
        let Some(translation) = pending.translation else {
            self.note(position, WarningKind::MissingTranslation);
            return;
        };
        let mut status = match Status::from_type_attr(pending.status_attr.as_deref()) {
            Some(status) => status,
            None => {
                let raw = pending.status_attr.unwrap_or_default();
                self.note(position, WarningKind::UnknownStatus(raw));
                return;
            }
        };

        let (mut translation, mut numerus_forms) =
            if pending.numerus && !pending.numerus_forms.is_empty() {
                (pending.numerus_forms[0].clone(), pending.numerus_forms)
            } else {
                (translation, Vec::new())
            };

        self.repair(&mut source, position);
        self.repair(&mut translation, position);
        for form in &mut numerus_forms {
            self.repair(form, position);
        }

        if status == Status::Finished
            && translation.trim().is_empty()
            && self.options.normalize_empty_finished
        {
            self.note(position, WarningKind::EmptyFinished(excerpt(&source)));
            status = Status::Unfinished;
        }

        let message = Message {
            source,
            translation,
            status,
            vanished: pending.status_attr.as_deref() == Some("vanished"),
            locations: pending.locations,
            comment: pending.comment.unwrap_or_default(),
            extra_comment: pending.extra_comment,
            translator_comment: pending.translator_comment,
            numerus_forms,
        };
        if let Some(ctx) = self.context.as_mut() {
            ctx.messages.push(message);
        }
    }

    fn finish_context(&mut self) {
        let Some(pending) = self.context.take() else {
            return;
        };
        match pending.name {
            Some(name) => self.document.contexts.push(Context {
                name: name.trim().to_string(),
                messages: pending.messages,
            }),
            None => {
                // `note` reads the context name, which is gone by now
                warn!(position = pending.position, "context has no <name>");
                self.warnings.push(LoadWarning {
                    position: pending.position,
                    context: None,
                    kind: WarningKind::MissingContextName,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn parse(xml: &str) -> Loaded {
        parse_str(xml, &LoadOptions::default()).expect("document should parse")
    }

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.1" language="pl" sourcelanguage="en">
  <context>
    <name>Draft_Arc</name>
    <message>
      <location filename="../../DraftTools.py" line="1347"/>
      <source>Arc</source>
      <translation>Łuk</translation>
    </message>
  </context>
  <context>
    <name>Draft_Layer</name>
    <message>
      <location filename="../../DraftTools.py" line="2100"/>
      <source>Layer</source>
      <translation type="unfinished">Layer</translation>
    </message>
  </context>
</TS>
"#;

    #[test]
    fn reads_header_and_contexts() {
        let loaded = parse(SAMPLE);
        let doc = &loaded.document;
        assert_eq!(doc.version.as_deref(), Some("2.1"));
        assert_eq!(doc.language, "pl");
        assert_eq!(doc.source_language, "en");
        assert_eq!(doc.contexts.len(), 2);
        assert!(loaded.warnings.is_empty());

        let arc = &doc.context("Draft_Arc").expect("Draft_Arc").messages[0];
        assert_eq!(arc.translation, "Łuk");
        assert_eq!(arc.status, Status::Finished);
        assert_eq!(arc.locations[0].line, Some(1347));

        let layer = &doc.context("Draft_Layer").expect("Draft_Layer").messages[0];
        assert_eq!(layer.status, Status::Unfinished);
    }

    #[test]
    fn decodes_entities_and_keeps_newlines() {
        let loaded = parse(
            r#"<TS language="pl"><context><name>Draft</name><message>
<source>Select Draft &amp; Arch objects
from menu Tools -&gt; Addon Manager</source>
<translation>Zaznacz obiekty Draft &amp; Arch</translation>
</message></context></TS>"#,
        );
        let msg = &loaded.document.contexts[0].messages[0];
        assert_eq!(
            msg.source,
            "Select Draft & Arch objects\nfrom menu Tools -> Addon Manager"
        );
        assert_eq!(msg.translation, "Zaznacz obiekty Draft & Arch");
    }

    #[test]
    fn skips_malformed_messages_and_keeps_going() {
        let loaded = parse(
            r#"<TS language="ko"><context><name>Ctx</name>
<message><translation>orphan translation</translation></message>
<message><source>No translation</source></message>
<message><source>Weird</source><translation type="bogus">x</translation></message>
<message><source>Good</source><translation>좋음</translation></message>
</context></TS>"#,
        );
        let kinds: Vec<&WarningKind> = loaded.warnings.iter().map(|w| &w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &WarningKind::MissingSource,
                &WarningKind::MissingTranslation,
                &WarningKind::UnknownStatus("bogus".to_string()),
            ]
        );
        let messages = &loaded.document.contexts[0].messages;
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].source, "Good");
        assert_eq!(loaded.warnings[0].context.as_deref(), Some("Ctx"));
    }

    #[test]
    fn context_without_name_is_dropped() {
        let loaded = parse(
            r#"<TS language="pl"><context><message><source>a</source><translation>b</translation></message></context></TS>"#,
        );
        assert!(loaded.document.contexts.is_empty());
        assert_eq!(loaded.warnings[0].kind, WarningKind::MissingContextName);
    }

    #[test]
    fn keeps_every_location() {
        let loaded = parse(
            r#"<TS language="ko"><context><name>CmdPrimitive</name><message>
<location filename="../../CommandPrimitive.cpp" line="69"/>
<location filename="../../CommandPrimitive.cpp" line="70"/>
<source>Create an additive primitive</source>
<translation type="unfinished">Create an additive primitive</translation>
</message></context></TS>"#,
        );
        let msg = &loaded.document.contexts[0].messages[0];
        assert_eq!(msg.locations.len(), 2);
        assert_eq!(msg.locations[1].line, Some(70));
    }

    #[test]
    fn relative_lines_and_bad_lines() {
        let loaded = parse(
            r#"<TS language="pl"><context><name>C</name>
<message><location filename="a.cpp" line="10"/><source>one</source><translation>jeden</translation></message>
<message><location line="+5"/><source>two</source><translation>dwa</translation></message>
<message><location filename="a.cpp" line="ten"/><source>three</source><translation>trzy</translation></message>
</context></TS>"#,
        );
        let messages = &loaded.document.contexts[0].messages;
        assert_eq!(messages[1].locations[0].filename, "a.cpp");
        assert_eq!(messages[1].locations[0].line, Some(15));
        assert_eq!(messages[2].locations[0].line, None);
        assert_eq!(messages.len(), 3);
        assert_eq!(
            loaded.warnings[0].kind,
            WarningKind::BadLineNumber("ten".to_string())
        );
    }

    #[test]
    fn obsolete_and_vanished_are_obsolete() {
        let loaded = parse(
            r#"<TS language="pl"><context><name>C</name>
<message><source>old</source><translation type="obsolete">stary</translation></message>
<message><source>gone</source><translation type="vanished">zniknął</translation></message>
</context></TS>"#,
        );
        assert!(loaded.document.contexts[0]
            .messages
            .iter()
            .all(|m| m.status == Status::Obsolete));
    }

    #[test]
    fn empty_finished_is_demoted() {
        let loaded = parse(
            r#"<TS language="pl"><context><name>C</name>
<message><source>Blank</source><translation></translation></message>
<message><source>Self-closing</source><translation/></message>
</context></TS>"#,
        );
        let messages = &loaded.document.contexts[0].messages;
        assert!(messages.iter().all(|m| m.status == Status::Unfinished));
        assert_eq!(loaded.warnings.len(), 2);

        let blank = parse(
            "<TS language=\"pl\"><context><name>C</name><message><source>Arc</source><translation>  \n </translation></message></context></TS>",
        );
        assert_eq!(blank.document.contexts[0].messages[0].status, Status::Unfinished);
        assert_eq!(
            Catalog::from_document(&blank.document).resolve("C", "Arc"),
            "Arc"
        );

        let verbatim = parse_str(
            r#"<TS language="pl"><context><name>C</name><message><source>Blank</source><translation></translation></message></context></TS>"#,
            &LoadOptions::verbatim(),
        )
        .expect("parse");
        assert_eq!(
            verbatim.document.contexts[0].messages[0].status,
            Status::Finished
        );
    }

    #[test]
    fn numerus_forms_and_comments() {
        let loaded = parse(
            r#"<TS language="pl"><context><name>C</name>
<message numerus="yes">
<source>%n object(s)</source>
<comment>selection</comment>
<extracomment>shown in status bar</extracomment>
<translation>
<numerusform>%n obiekt</numerusform>
<numerusform>%n obiekty</numerusform>
<numerusform>%n obiektów</numerusform>
</translation>
</message></context></TS>"#,
        );
        let msg = &loaded.document.contexts[0].messages[0];
        assert_eq!(msg.numerus_forms.len(), 3);
        assert_eq!(msg.translation, "%n obiekt");
        assert_eq!(msg.comment, "selection");
        assert_eq!(msg.extra_comment.as_deref(), Some("shown in status bar"));
    }

    #[test]
    fn repairs_mojibake_when_enabled() {
        let xml = "<TS language=\"ko\"><context><name>C</name><message><source>\u{e2}\u{80}\u{a2} the active Body</source><translation type=\"unfinished\">\u{e2}\u{80}\u{a2} the active Body</translation></message></context></TS>";
        let repaired = parse(xml);
        assert_eq!(
            repaired.document.contexts[0].messages[0].source,
            "• the active Body"
        );
        assert_eq!(repaired.warnings.len(), 2);

        let verbatim = parse_str(xml, &LoadOptions::verbatim()).expect("parse");
        assert!(verbatim.document.contexts[0].messages[0]
            .source
            .starts_with('\u{e2}'));
        assert!(verbatim.warnings.is_empty());
    }

    #[test]
    fn clean_typographic_text_is_loaded_unchanged() {
        let xml = r#"<TS language="de"><context><name>Draft_Dimension</name>
<message><source>Dimension “Size”</source><translation>„Maß“</translation></message>
<message><source>Foot…</source><translation>Fuß…</translation></message>
<message><source>Windows form</source><translation>â€¢ Punkt</translation></message>
</context></TS>"#;
        let loaded = parse(xml);
        assert!(loaded.warnings.is_empty());
        let catalog = Catalog::from_document(&loaded.document);
        assert_eq!(catalog.resolve("Draft_Dimension", "Dimension “Size”"), "„Maß“");
        assert_eq!(catalog.resolve("Draft_Dimension", "Foot…"), "Fuß…");
        // Only the C1 form is certain enough to rewrite while loading
        assert_eq!(catalog.resolve("Draft_Dimension", "Windows form"), "â€¢ Punkt");
    }

    #[test]
    fn byte_elements_become_characters() {
        let loaded = parse(
            r#"<TS language="pl"><context><name>C</name><message><source>a<byte value="x9"/>b</source><translation>c</translation></message></context></TS>"#,
        );
        assert_eq!(loaded.document.contexts[0].messages[0].source, "a\tb");
    }

    #[test]
    fn wrong_root_is_rejected() {
        let err = parse_str("<html><body/></html>", &LoadOptions::default())
            .expect_err("not a catalog");
        assert!(matches!(err, LoadError::NotATsDocument(_)));
    }

    #[test]
    fn broken_xml_is_rejected() {
        let err = parse_str(
            "<TS language=\"pl\"><context><name>C</name></wrong></TS>",
            &LoadOptions::default(),
        )
        .expect_err("mismatched tags");
        assert!(matches!(err, LoadError::Xml { .. }));

        let truncated = parse_str(
            "<TS language=\"pl\"><context><name>C</name>",
            &LoadOptions::default(),
        );
        assert!(truncated.is_err());
    }

    #[test]
    fn latin1_input_is_decoded_with_warning() {
        let mut raw = b"<TS language=\"fr\"><context><name>C</name><message><source>Cafe</source><translation>Caf".to_vec();
        raw.push(0xE9);
        raw.extend_from_slice(b"</translation></message></context></TS>");
        let loaded = parse_bytes(&raw, &LoadOptions::default()).expect("parse");
        assert_eq!(loaded.warnings[0].kind, WarningKind::NotUtf8);
        assert_eq!(loaded.document.contexts[0].messages[0].translation, "Café");
    }

    #[test]
    fn digest_tracks_content() {
        let a = parse(SAMPLE);
        let b = parse(SAMPLE);
        let c = parse(&SAMPLE.replace("Łuk", "Łuki"));
        assert_eq!(a.digest, b.digest);
        assert_ne!(a.digest, c.digest);
    }
}
