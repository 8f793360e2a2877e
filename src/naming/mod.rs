//! Identifier derivation from free-text registry labels.
//!
//! Generation is a pure function of its inputs so that regenerating against an
//! unchanged registry always yields the same names.
mod abbreviations;
mod label;

pub use abbreviations::AbbreviationTable;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Naming convention for generated identifiers.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Style {
    /// `CBOR_TAG_2_POSITIVE_BIGNUM`
    #[default]
    Snake,
    /// `CborPositiveBignumTag`
    Pascal,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Snake => "snake",
            Style::Pascal => "pascal",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Knobs that shape a generated identifier beyond the label itself.
#[derive(Debug, Clone, Copy)]
pub struct NamingRules<'a> {
    pub style: Style,
    /// Snake style only: place the numeric id between namespace and label.
    pub embed_id: bool,
    /// Token character count at which long-label compression starts.
    pub compression_threshold: usize,
    pub abbreviations: &'a AbbreviationTable,
}

/// Namespace suffixes that Pascal style moves to the end as `Tag`.
const PASCAL_TAG_SUFFIXES: [&str; 2] = ["KnownTags", "Tags"];

/// Derive the identifier for registry code `id` labelled `raw_label`.
pub fn generate_identifier(
    id: u64,
    raw_label: &str,
    namespace: &str,
    rules: &NamingRules<'_>,
) -> String {
    let cleaned = label::clean_label(raw_label);
    let tokens = label::tokenize(&cleaned);
    let tokens = rules
        .abbreviations
        .shorten(tokens, rules.compression_threshold);
    match rules.style {
        Style::Snake => render_snake(id, &tokens, namespace, rules.embed_id),
        Style::Pascal => render_pascal(&tokens, namespace),
    }
}

fn render_snake(id: u64, tokens: &[String], namespace: &str, embed_id: bool) -> String {
    let mut raw = namespace.to_string();
    if embed_id {
        raw.push('_');
        raw.push_str(&id.to_string());
    }
    let joined = tokens.join("_");
    if !joined.is_empty() {
        raw.push('_');
        raw.push_str(&joined);
    }

    let mut name = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '_' && name.ends_with('_') {
            continue;
        }
        name.push(ch.to_ascii_uppercase());
    }
    name.trim_matches('_').to_string()
}

/// Split a Pascal namespace into its prefix and the suffix re-appended after the label.
pub fn pascal_prefix(namespace: &str) -> (&str, &'static str) {
    for suffix in PASCAL_TAG_SUFFIXES {
        if let Some(prefix) = namespace.strip_suffix(suffix) {
            return (prefix, "Tag");
        }
    }
    (namespace, "")
}

fn render_pascal(tokens: &[String], namespace: &str) -> String {
    let (prefix, suffix) = pascal_prefix(namespace);
    let mut name = String::new();
    if prefix.contains('_') {
        // snake_case namespaces are recased so the whole identifier is Pascal.
        prefix.split('_').for_each(|part| push_capitalized(&mut name, part));
    } else {
        name.push_str(prefix);
    }
    for token in tokens {
        push_capitalized(&mut name, token);
    }
    name.push_str(suffix);
    name
}

fn push_capitalized(name: &mut String, word: &str) {
    let mut chars = word.chars();
    if let Some(first) = chars.next() {
        name.push(first.to_ascii_uppercase());
        name.extend(chars.map(|ch| ch.to_ascii_lowercase()));
    }
}

#[cfg(test)]
#[path = "naming_tests.rs"]
mod tests;
