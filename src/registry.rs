//! Registry CSV parsing.
//!
//! Each registry kind exposes its own column layout; rows that do not name a
//! single assigned code are filtered out here so later stages only ever see
//! concrete `id -> label` assignments.
use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Registry layouts understood by the parser.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    SimpleValues,
    Tags,
}

struct ColumnSchema {
    key: &'static str,
    label: &'static str,
    reference: &'static str,
    data_item: Option<&'static str>,
    other: &'static [&'static str],
}

impl RegistryKind {
    /// Return the stable string identifier used in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKind::SimpleValues => "simple_values",
            RegistryKind::Tags => "tags",
        }
    }

    fn schema(&self) -> ColumnSchema {
        match self {
            RegistryKind::SimpleValues => ColumnSchema {
                key: "Value",
                label: "Semantics",
                reference: "Reference",
                data_item: None,
                other: &[],
            },
            RegistryKind::Tags => ColumnSchema {
                key: "Tag",
                label: "Semantics",
                reference: "Reference",
                data_item: Some("Data Item"),
                other: &["Template"],
            },
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assigned registry code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: u64,
    pub raw_label: String,
    pub reference: String,
}

impl Record {
    /// Human-readable comment carried next to the generated enum entry.
    ///
    /// A `*/` in registry text is split so the comment can never close a block comment.
    pub fn comment(&self) -> String {
        let comment = if self.raw_label.is_empty() {
            format!("Ref: {}", self.reference)
        } else {
            format!("{}; Ref: {}", self.raw_label, self.reference)
        };
        comment.replace("*/", "* /")
    }
}

/// Parse registry CSV text into assigned records keyed by id.
///
/// A later row with an id already seen replaces the earlier one.
pub fn parse_records(text: &str, kind: RegistryKind) -> Result<BTreeMap<u64, Record>, SyncError> {
    let schema = kind.schema();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize, SyncError> {
        headers
            .iter()
            .position(|header| header.trim() == name)
            .ok_or_else(|| SyncError::Schema {
                column: name.to_string(),
            })
    };

    let key_idx = column(schema.key)?;
    let label_idx = column(schema.label)?;
    let reference_idx = column(schema.reference)?;
    let data_item_idx = schema.data_item.map(column).transpose()?;
    for name in schema.other {
        column(name)?;
    }

    let mut records = BTreeMap::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row?;
        let field = |idx: usize| row.get(idx).unwrap_or_default().trim();

        let key = field(key_idx);
        if key.eq_ignore_ascii_case(schema.key) {
            continue;
        }
        let Some(id) = parse_single_id(key) else {
            continue;
        };

        let label = field(label_idx);
        if is_placeholder_label(label) {
            continue;
        }
        if kind == RegistryKind::Tags {
            if label.to_ascii_lowercase().contains("always invalid") {
                continue;
            }
            if data_item_idx.is_some_and(|idx| field(idx).eq_ignore_ascii_case("unassigned")) {
                continue;
            }
        }

        let record = Record {
            id,
            raw_label: label.to_string(),
            reference: field(reference_idx).to_string(),
        };
        if let Some(previous) = records.insert(id, record) {
            tracing::warn!(
                registry = kind.as_str(),
                id,
                row = row_idx + 2,
                replaced = %previous.raw_label,
                "duplicate registry id; keeping the later row"
            );
        }
    }

    Ok(records)
}

fn parse_single_id(key: &str) -> Option<u64> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

fn is_placeholder_label(label: &str) -> bool {
    label.eq_ignore_ascii_case("unassigned") || label.eq_ignore_ascii_case("reserved")
}
