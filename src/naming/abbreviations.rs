//! Versioned abbreviation data used to shorten identifiers.
//!
//! Tables are ordered `[from, to]` pairs. Lookup is case-insensitive and the
//! first pair whose `from` matches a token wins.
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Current schema version for abbreviation table files.
pub const ABBREVIATION_SCHEMA_VERSION: u32 = 1;

const BUILTIN_TABLE_JSON: &str = include_str!("../../data/abbreviations.json");

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AbbreviationTable {
    pub schema_version: u32,
    /// Applied to every label.
    pub common: Vec<(String, String)>,
    /// Applied only once a label crosses the compression threshold.
    pub long_label: Vec<(String, String)>,
    /// Tokens dropped from long labels after abbreviation.
    pub filler: Vec<String>,
}

impl AbbreviationTable {
    /// The table shipped with the binary.
    pub fn builtin() -> &'static AbbreviationTable {
        static BUILTIN: OnceLock<AbbreviationTable> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            AbbreviationTable::from_json(BUILTIN_TABLE_JSON).expect("embedded abbreviation table")
        })
    }

    /// Parse and validate a table from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let table: AbbreviationTable =
            serde_json::from_str(text).context("parse abbreviation table JSON")?;
        if table.schema_version != ABBREVIATION_SCHEMA_VERSION {
            return Err(anyhow!(
                "unsupported abbreviation table schema_version {}",
                table.schema_version
            ));
        }
        let pairs = table.common.iter().chain(table.long_label.iter());
        for (from, to) in pairs {
            if from.trim().is_empty() || !to.bytes().all(|b| b.is_ascii_alphanumeric()) {
                return Err(anyhow!(
                    "abbreviation {from:?} -> {to:?} must map a word to ASCII letters or digits"
                ));
            }
        }
        Ok(table)
    }

    /// Load a replacement table from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read abbreviation table {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("load {}", path.display()))
    }

    /// Apply the common table, then compress labels at or over `threshold` characters.
    pub(super) fn shorten(&self, tokens: Vec<String>, threshold: usize) -> Vec<String> {
        let tokens: Vec<String> = tokens
            .into_iter()
            .map(|token| abbreviate(&self.common, token))
            .collect();

        let total: usize = tokens.iter().map(|token| token.chars().count()).sum();
        if total < threshold {
            return tokens;
        }

        let compressed: Vec<String> = tokens
            .iter()
            .cloned()
            .map(|token| abbreviate(&self.long_label, token))
            .filter(|token| !self.filler.iter().any(|word| word.eq_ignore_ascii_case(token)))
            .collect();
        tracing::debug!(
            label = %tokens.join(" "),
            shortened = %compressed.join(" "),
            total,
            "compressed long label"
        );
        compressed
    }
}

fn abbreviate(pairs: &[(String, String)], token: String) -> String {
    pairs
        .iter()
        .find(|(from, _)| from.eq_ignore_ascii_case(&token))
        .map(|(_, to)| to.clone())
        .unwrap_or(token)
}
