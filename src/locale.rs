// SPDX-License-Identifier: PMPL-1.0-or-later

//! Locale tags as they appear in `.ts` files and catalog file names
//!
//! Qt writes tags with an underscore (`zh_CN`, `pt_BR`) while other
//! tooling prefers a hyphen (`pt-BR`). Both are accepted; the language
//! subtag must be a known ISO 639-1 code.
//!
//! Reference: <https://www.loc.gov/standards/iso639-2/php/code_list.php>

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed `language[_REGION]` tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocaleTag {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl LocaleTag {
    /// Parse `pl`, `zh_CN`, `pt-BR`, `sr-CS` style tags.
    ///
    /// The language subtag is lowercased and checked against ISO 639-1;
    /// the region must be two ASCII letters (uppercased) or three digits.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let mut parts = value.split(['_', '-']);
        let language = parts.next()?.to_ascii_lowercase();
        if !is_valid_iso639_1(&language) {
            return None;
        }
        let region = match parts.next() {
            None => None,
            Some(r) if r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()) => {
                Some(r.to_ascii_uppercase())
            }
            Some(r) if r.len() == 3 && r.chars().all(|c| c.is_ascii_digit()) => {
                Some(r.to_string())
            }
            Some(_) => return None,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self { language, region })
    }

    /// Qt spelling, e.g. `zh_CN`
    pub fn qt_name(&self) -> String {
        match &self.region {
            Some(region) => format!("{}_{}", self.language, region),
            None => self.language.clone(),
        }
    }

    /// Tags to try when looking for a catalog file, most specific first:
    /// `pt_BR` then `pt`.
    pub fn candidates(&self) -> Vec<String> {
        let mut out = vec![self.qt_name()];
        if self.region.is_some() {
            out.push(self.language.clone());
        }
        out
    }

    pub fn english_name(&self) -> Option<&'static str> {
        language_name(&self.language)
    }
}

impl fmt::Display for LocaleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qt_name())
    }
}

/// ISO 639-1 codes, sorted for binary search
const ISO639_1: &[&str] = &[
    "aa", "ab", "ae", "af", "ak", "am", "an", "ar", "as", "av", "ay", "az", "ba", "be", "bg", "bh",
    "bi", "bm", "bn", "bo", "br", "bs", "ca", "ce", "ch", "co", "cr", "cs", "cu", "cv", "cy", "da",
    "de", "dv", "dz", "ee", "el", "en", "eo", "es", "et", "eu", "fa", "ff", "fi", "fj", "fo", "fr",
    "fy", "ga", "gd", "gl", "gn", "gu", "gv", "ha", "he", "hi", "ho", "hr", "ht", "hu", "hy", "hz",
    "ia", "id", "ie", "ig", "ii", "ik", "io", "is", "it", "iu", "ja", "jv", "ka", "kg", "ki", "kj",
    "kk", "kl", "km", "kn", "ko", "kr", "ks", "ku", "kv", "kw", "ky", "la", "lb", "lg", "li", "ln",
    "lo", "lt", "lu", "lv", "mg", "mh", "mi", "mk", "ml", "mn", "mr", "ms", "mt", "my", "na", "nb",
    "nd", "ne", "ng", "nl", "nn", "no", "nr", "nv", "ny", "oc", "oj", "om", "or", "os", "pa", "pi",
    "pl", "ps", "pt", "qu", "rm", "rn", "ro", "ru", "rw", "sa", "sc", "sd", "se", "sg", "si", "sk",
    "sl", "sm", "sn", "so", "sq", "sr", "ss", "st", "su", "sv", "sw", "ta", "te", "tg", "th", "ti",
    "tk", "tl", "tn", "to", "tr", "ts", "tt", "tw", "ty", "ug", "uk", "ur", "uz", "ve", "vi", "vo",
    "wa", "wo", "xh", "yi", "yo", "za", "zh", "zu",
];

/// Whether `code` is a lowercase ISO 639-1 two-letter code
pub fn is_valid_iso639_1(code: &str) -> bool {
    ISO639_1.binary_search(&code).is_ok()
}

/// English name of the languages the workbench catalogs ship in
pub fn language_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "af" => "Afrikaans",
        "ar" => "Arabic",
        "be" => "Belarusian",
        "ca" => "Catalan",
        "cs" => "Czech",
        "de" => "German",
        "el" => "Greek",
        "en" => "English",
        "es" => "Spanish",
        "eu" => "Basque",
        "fi" => "Finnish",
        "fr" => "French",
        "gl" => "Galician",
        "hr" => "Croatian",
        "hu" => "Hungarian",
        "id" => "Indonesian",
        "it" => "Italian",
        "ja" => "Japanese",
        "ka" => "Georgian",
        "ko" => "Korean",
        "lt" => "Lithuanian",
        "nl" => "Dutch",
        "no" | "nb" => "Norwegian",
        "pl" => "Polish",
        "pt" => "Portuguese",
        "ro" => "Romanian",
        "ru" => "Russian",
        "sk" => "Slovak",
        "sl" => "Slovenian",
        "sr" => "Serbian",
        "sv" => "Swedish",
        "tr" => "Turkish",
        "uk" => "Ukrainian",
        "vi" => "Vietnamese",
        "zh" => "Chinese",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_table_is_sorted() {
        let mut sorted = ISO639_1.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, ISO639_1);
    }

    #[test]
    fn parses_plain_and_regional_tags() {
        let pl = LocaleTag::parse("pl").expect("pl should parse");
        assert_eq!(pl.language, "pl");
        assert_eq!(pl.region, None);

        let zh = LocaleTag::parse("zh_CN").expect("zh_CN should parse");
        assert_eq!(zh.qt_name(), "zh_CN");

        let pt = LocaleTag::parse("pt-br").expect("pt-br should parse");
        assert_eq!(pt.qt_name(), "pt_BR");
        assert_eq!(pt.candidates(), vec!["pt_BR".to_string(), "pt".to_string()]);
    }

    #[test]
    fn rejects_unknown_or_malformed_tags() {
        assert!(LocaleTag::parse("xx").is_none());
        assert!(LocaleTag::parse("").is_none());
        assert!(LocaleTag::parse("eng").is_none());
        assert!(LocaleTag::parse("pt_BRA").is_none());
        assert!(LocaleTag::parse("pt_BR_x").is_none());
    }

    #[test]
    fn names_resolve() {
        assert_eq!(
            LocaleTag::parse("ko").and_then(|t| t.english_name()),
            Some("Korean")
        );
        assert_eq!(language_name("xx"), None);
    }
}
