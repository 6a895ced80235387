// SPDX-License-Identifier: PMPL-1.0-or-later

//! Property tests for resolution and text repair

use proptest::prelude::*;
use ts_catalog::{mojibake, ts, Catalog, Context, Document, LoadOptions, Message, Status};

fn status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Finished),
        Just(Status::Unfinished),
        Just(Status::Obsolete),
    ]
}

fn catalog_of(context: &str, messages: Vec<Message>) -> Catalog {
    let mut ctx = Context::new(context);
    ctx.messages = messages;
    Catalog::from_document(&Document::new("pl", "en").with_context(ctx))
}

proptest! {
    #[test]
    fn single_entry_resolves_by_status(
        source in "[A-Za-z ]{1,20}",
        text in "\\PC{1,20}",
        status in status(),
    ) {
        let catalog = catalog_of("Draft_Arc", vec![Message::new(source.clone(), text.clone(), status)]);
        let expected = if status == Status::Finished { text.as_str() } else { source.as_str() };
        prop_assert_eq!(catalog.resolve("Draft_Arc", &source), expected);
        // Idempotent
        prop_assert_eq!(catalog.resolve("Draft_Arc", &source), expected);
    }

    #[test]
    fn absent_key_returns_source(source in "\\PC{0,30}", context in "[A-Za-z_:]{1,20}") {
        let catalog = catalog_of("Draft_Arc", vec![Message::new("Arc", "Łuk", Status::Finished)]);
        prop_assume!(!(context == "Draft_Arc" && source == "Arc"));
        prop_assert_eq!(catalog.resolve(&context, &source), source.as_str());
    }

    #[test]
    fn merge_is_order_independent(
        first in status(),
        second in status(),
        text in "[a-z]{1,10}",
    ) {
        let forward = catalog_of("Workbench", vec![
            Message::new("Draft", text.clone(), first),
            Message::new("Draft", text.clone(), second),
        ]);
        let backward = catalog_of("Workbench", vec![
            Message::new("Draft", text.clone(), second),
            Message::new("Draft", text.clone(), first),
        ]);
        prop_assert_eq!(
            forward.resolve("Workbench", "Draft"),
            backward.resolve("Workbench", "Draft")
        );
        let finished = first == Status::Finished || second == Status::Finished;
        prop_assert_eq!(forward.resolve("Workbench", "Draft") == text, finished);
    }

    #[test]
    fn repair_leaves_ascii_alone(text in "[ -~\\n\\t]{0,80}") {
        prop_assert_eq!(mojibake::repair(&text), None);
    }

    #[test]
    fn repair_undoes_latin1_double_encoding(
        text in "[a-z \\u{a0}-\\u{17f}\\u{2010}-\\u{2027}]{0,20}[\\u{a0}-\\u{17f}\\u{2010}-\\u{2027}]",
    ) {
        let garbled: String = text.as_bytes().iter().map(|&b| b as char).collect();
        prop_assert_eq!(mojibake::repair(&garbled), Some(text));
    }

    #[test]
    fn clean_european_text_survives_loading(
        text in "[a-zA-Z äöüßÄÖÜéèàçœ„“”‘’…–—«»°²·×Ø]{1,30}",
    ) {
        prop_assert_eq!(mojibake::repair_unambiguous(&text), None);
        let xml = format!(
            "<TS language=\"de\"><context><name>C</name><message><source>Key</source><translation>{}</translation></message></context></TS>",
            text
        );
        let loaded = ts::parse_str(&xml, &LoadOptions::default()).unwrap();
        let catalog = Catalog::from_document(&loaded.document);
        let expected = if text.trim().is_empty() { "Key" } else { text.as_str() };
        prop_assert_eq!(catalog.resolve("C", "Key"), expected);
    }

    #[test]
    fn loader_never_panics(input in "\\PC{0,200}") {
        let _ = ts::parse_str(&input, &LoadOptions::default());
    }
}
