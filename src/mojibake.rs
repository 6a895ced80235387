// SPDX-License-Identifier: PMPL-1.0-or-later

//! Detection and repair of double-encoded UTF-8
//!
//! Some catalogs contain text whose UTF-8 bytes were once decoded as
//! Latin-1 / Windows-1252 and re-encoded, so a bullet `•` (E2 80 A2)
//! shows up as `â\u{80}¢` or `â€¢`. Repair maps each suspicious run back
//! to bytes and decodes it as UTF-8 again.
//!
//! Clean text can contain the same characters (`„Maß“` is `ß` followed
//! by a Windows-1252 quote), so a run is only rewritten when
//!
//! - it decodes to a character double encoding actually produces
//!   (Latin-1 supplement, Latin Extended-A, general punctuation,
//!   currency and letterlike symbols), and
//! - it contains a raw C1 control (U+0080..U+009F), which never occurs in
//!   real text, or every other non-ASCII character of the string also
//!   belongs to such a run.
//!
//! [`repair_unambiguous`] accepts only the C1 form and is what the loader
//! applies.

use crate::types::Document;
use encoding_rs::WINDOWS_1252;
use tracing::debug;

/// Repair double-encoded sequences in `text`.
///
/// Returns `None` when nothing needed repairing.
pub fn repair(text: &str) -> Option<String> {
    rewrite(text, false)
}

/// Repair only runs that carry a raw C1 control character.
pub fn repair_unambiguous(text: &str) -> Option<String> {
    rewrite(text, true)
}

/// Whether `text` contains at least one repairable sequence
pub fn is_suspect(text: &str) -> bool {
    repair(text).is_some()
}

/// Repair every message text in `document`; returns how many strings changed
pub fn repair_document(document: &mut Document) -> usize {
    let mut repaired = 0;
    document.for_each_text_mut(|context, text| {
        if let Some(fixed) = repair(text) {
            debug!(context, before = %text, after = %fixed, "repaired text");
            *text = fixed;
            repaired += 1;
        }
    });
    repaired
}

struct Run {
    start: usize,
    len: usize,
    decoded: char,
    has_c1: bool,
}

fn rewrite(text: &str, c1_only: bool) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut runs = Vec::new();
    let mut stray_non_ascii = false;
    let mut i = 0;

    while i < chars.len() {
        if let Some(run) = decode_run(&chars, i) {
            i += run.len;
            runs.push(run);
        } else {
            stray_non_ascii |= !chars[i].is_ascii();
            i += 1;
        }
    }

    let accept_all = !c1_only && !stray_non_ascii;
    let accepted: Vec<&Run> = runs.iter().filter(|r| r.has_c1 || accept_all).collect();
    if accepted.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(text.len());
    let mut next = 0;
    for run in accepted {
        out.extend(&chars[next..run.start]);
        out.push(run.decoded);
        next = run.start + run.len;
    }
    out.extend(&chars[next..]);
    Some(out)
}

/// Try to decode one UTF-8 character spelled as single-byte chars at
/// `chars[start..]`.
fn decode_run(chars: &[char], start: usize) -> Option<Run> {
    let rest = &chars[start..];
    let lead = single_byte(*rest.first()?)?;
    let continuation = match lead {
        0xC2..=0xDF => 1,
        0xE0..=0xEF => 2,
        0xF0..=0xF4 => 3,
        _ => return None,
    };
    if rest.len() < continuation + 1 {
        return None;
    }

    let mut bytes = Vec::with_capacity(continuation + 1);
    bytes.push(lead);
    let mut has_c1 = false;
    for &c in &rest[1..=continuation] {
        let byte = single_byte(c)?;
        if !(0x80..=0xBF).contains(&byte) {
            return None;
        }
        has_c1 |= ('\u{80}'..='\u{9f}').contains(&c);
        bytes.push(byte);
    }

    let decoded = std::str::from_utf8(&bytes).ok()?;
    let mut it = decoded.chars();
    let ch = it.next()?;
    if it.next().is_some() || !is_plausible(ch) {
        return None;
    }
    Some(Run {
        start,
        len: continuation + 1,
        decoded: ch,
        has_c1,
    })
}

/// Characters whose UTF-8 form shows up double encoded in UI text
fn is_plausible(ch: char) -> bool {
    matches!(
        ch as u32,
        0xA0..=0x17F | 0x2000..=0x206F | 0x20A0..=0x20CF | 0x2100..=0x214F
    )
}

/// Byte value of `c` under Latin-1, or Windows-1252 for the 0x80..0x9F
/// block that Windows-1252 fills with printable characters.
fn single_byte(c: char) -> Option<u8> {
    let code = c as u32;
    if code <= 0xFF {
        return Some(code as u8);
    }
    let mut buf = [0u8; 4];
    let (encoded, _, unmappable) = WINDOWS_1252.encode(c.encode_utf8(&mut buf));
    if unmappable || encoded.len() != 1 {
        return None;
    }
    Some(encoded[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repairs_latin1_bullet() {
        let garbled = "The reason may be that:\n\n  \u{e2}\u{80}\u{a2} the active Body";
        assert_eq!(
            repair(garbled).as_deref(),
            Some("The reason may be that:\n\n  • the active Body")
        );
    }

    #[test]
    fn repairs_windows_1252_bullet() {
        assert_eq!(repair("â€¢ item").as_deref(), Some("• item"));
    }

    #[test]
    fn repairs_two_byte_sequence() {
        assert_eq!(repair("cafÃ©").as_deref(), Some("café"));
    }

    #[test]
    fn leaves_clean_text_alone() {
        assert_eq!(repair("Łuk"), None);
        assert_eq!(repair("Stosuje bieżącą szerokość linii"), None);
        assert_eq!(repair("새로운 바디(Body)를 생성하고"), None);
        assert_eq!(repair("déjà vu"), None);
        assert_eq!(repair(""), None);
    }

    #[test]
    fn truncated_sequence_is_kept() {
        assert_eq!(repair("end â"), None);
        assert!(!is_suspect("â\u{80}"));
    }

    #[test]
    fn repairs_whole_document() {
        use crate::types::{Context, Message, Status};
        let mut doc = Document::new("ko", "en").with_context(
            Context::new("PartDesignGui::TaskFeaturePick")
                .with_message(Message::new(
                    "\u{e2}\u{80}\u{a2} the active Body",
                    "\u{e2}\u{80}\u{a2} 활성 바디",
                    Status::Finished,
                ))
                .with_message(Message::new("Body", "바디", Status::Finished)),
        );
        assert_eq!(repair_document(&mut doc), 2);
        let msg = &doc.contexts[0].messages[0];
        assert_eq!(msg.source, "• the active Body");
        assert_eq!(msg.translation, "• 활성 바디");
        assert_eq!(repair_document(&mut doc), 0);
    }

    #[test]
    fn clean_german_and_french_punctuation_is_kept() {
        for clean in [
            "„Maß“",
            "Fuß…",
            "Straße – Weg",
            "Größe: 5 mm²",
            "×°",
            "Ø·",
            "«Défaut» – voir «Données»",
            "l’élément “sélectionné”",
        ] {
            assert_eq!(repair(clean), None, "{}", clean);
            assert_eq!(repair_unambiguous(clean), None, "{}", clean);
            assert!(!is_suspect(clean), "{}", clean);
        }
    }

    #[test]
    fn printable_runs_need_a_fully_garbled_string() {
        // Ã© next to a real é: the string is not uniformly double encoded
        assert_eq!(repair("cafÃ© déjà"), None);
        assert_eq!(repair("Â°C").as_deref(), Some("°C"));
    }

    #[test]
    fn unambiguous_repair_ignores_windows_1252_form() {
        assert_eq!(repair_unambiguous("â€¢ item"), None);
        assert_eq!(
            repair_unambiguous("\u{e2}\u{80}\u{a2} 활성 바디").as_deref(),
            Some("• 활성 바디")
        );
    }
}
