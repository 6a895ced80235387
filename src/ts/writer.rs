// SPDX-License-Identifier: PMPL-1.0-or-later

//! `.ts` serialization in the layout Qt's lupdate produces

use crate::types::{Document, Message};
use anyhow::{Context as _, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs;
use std::path::Path;

type XmlWriter = Writer<Vec<u8>>;

/// Render a document as `.ts` XML
pub fn to_ts_string(document: &Document) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped("TS")))?;

    let mut root = BytesStart::new("TS");
    if let Some(version) = &document.version {
        root.push_attribute(("version", version.as_str()));
    }
    root.push_attribute(("language", document.language.as_str()));
    root.push_attribute(("sourcelanguage", document.source_language.as_str()));
    writer.write_event(Event::Start(root))?;

    for context in &document.contexts {
        writer.write_event(Event::Start(BytesStart::new("context")))?;
        text_element(&mut writer, "name", &context.name)?;
        for message in &context.messages {
            write_message(&mut writer, message)?;
        }
        writer.write_event(Event::End(BytesEnd::new("context")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("TS")))?;
    let mut rendered =
        String::from_utf8(writer.into_inner()).context("serialized catalog is not UTF-8")?;
    rendered.push('\n');
    Ok(rendered)
}

/// Write a document to `path`, creating parent directories
pub fn write_file(document: &Document, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating catalog parent {}", parent.display()))?;
    }
    let rendered = to_ts_string(document)?;
    fs::write(path, rendered).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn write_message(writer: &mut XmlWriter, message: &Message) -> Result<()> {
    let mut start = BytesStart::new("message");
    if message.is_numerus() {
        start.push_attribute(("numerus", "yes"));
    }
    writer.write_event(Event::Start(start))?;

    for location in &message.locations {
        let mut loc = BytesStart::new("location");
        loc.push_attribute(("filename", location.filename.as_str()));
        if let Some(line) = location.line {
            loc.push_attribute(("line", line.to_string().as_str()));
        }
        writer.write_event(Event::Empty(loc))?;
    }

    text_element(writer, "source", &message.source)?;
    if !message.comment.is_empty() {
        text_element(writer, "comment", &message.comment)?;
    }
    if let Some(extra) = &message.extra_comment {
        text_element(writer, "extracomment", extra)?;
    }
    if let Some(note) = &message.translator_comment {
        text_element(writer, "translatorcomment", note)?;
    }

    let mut translation = BytesStart::new("translation");
    if let Some(kind) = message.type_attr() {
        translation.push_attribute(("type", kind));
    }
    if message.is_numerus() {
        writer.write_event(Event::Start(translation))?;
        for form in &message.numerus_forms {
            text_element(writer, "numerusform", form)?;
        }
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    } else {
        writer.write_event(Event::Start(translation))?;
        writer.write_event(Event::Text(BytesText::new(&message.translation)))?;
        writer.write_event(Event::End(BytesEnd::new("translation")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("message")))?;
    Ok(())
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ts::{parse_str, LoadOptions};
    use crate::types::{Context, Status};

    fn sample() -> Document {
        let mut plural = Message::new("%n object(s)", "", Status::Finished)
            .with_location("../../DraftGui.py", Some(77));
        plural.numerus_forms = vec!["%n obiekt".into(), "%n obiekty".into()];
        plural.translation = "%n obiekt".into();

        Document::new("pl", "en").with_context(
            Context::new("Draft")
                .with_message(
                    Message::new("Draft &amp; Arch <objects>", "Obiekty \"Draft\" & Arch", Status::Finished)
                        .with_location("../../DraftTools.py", Some(1347))
                        .with_comment("menu"),
                )
                .with_message(Message::new("Layer", "Layer", Status::Unfinished))
                .with_message(Message::new("Old", "Stary", Status::Obsolete))
                .with_message(plural),
        )
    }

    #[test]
    fn written_catalog_reads_back_equal() {
        let doc = sample();
        let rendered = to_ts_string(&doc).expect("render");
        let loaded = parse_str(&rendered, &LoadOptions::verbatim()).expect("re-parse");
        assert_eq!(loaded.document, doc);
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn layout_matches_lupdate() {
        let rendered = to_ts_string(&sample()).expect("render");
        assert!(rendered.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
        assert!(rendered.contains("<!DOCTYPE TS>"));
        assert!(rendered.contains("<TS version=\"2.1\" language=\"pl\" sourcelanguage=\"en\">"));
        assert!(rendered.contains("<location filename=\"../../DraftTools.py\" line=\"1347\"/>"));
        assert!(rendered.contains("<translation type=\"unfinished\">Layer</translation>"));
        assert!(rendered.contains("<message numerus=\"yes\">"));
    }

    #[test]
    fn vanished_messages_keep_their_type() {
        let xml = r#"<TS language="pl"><context><name>C</name>
<message><source>old</source><translation type="obsolete">stary</translation></message>
<message><source>gone</source><translation type="vanished">zniknął</translation></message>
</context></TS>"#;
        let loaded = parse_str(xml, &LoadOptions::verbatim()).expect("parse");
        let rendered = to_ts_string(&loaded.document).expect("render");
        assert!(rendered.contains("<translation type=\"obsolete\">stary</translation>"));
        assert!(rendered.contains("<translation type=\"vanished\">zniknął</translation>"));
        let reread = parse_str(&rendered, &LoadOptions::verbatim()).expect("re-parse");
        assert_eq!(reread.document, loaded.document);
    }
}
