//! Merge generated enum entries into an existing `typedef enum` declaration.
//!
//! Published identifiers are never renamed or removed: an id already bound in
//! the document keeps its name, and ids that vanished from the registry stay.
use crate::document::{append_block, locate_enum, mask_comments, splice};
use crate::error::SyncError;
use crate::ranges::{RangeCursor, RangeMarker};
use regex::Regex;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

/// One `identifier = id` row of an enum block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub id: u64,
    pub identifier: String,
    pub comment: Option<String>,
}

/// Entries keyed by id; iteration order is render order.
pub type EnumBlock = BTreeMap<u64, EnumEntry>;

/// Where and how an enum block is rendered.
#[derive(Debug, Clone, Copy)]
pub struct EnumLayout<'a> {
    pub type_name: &'a str,
    /// Emitted verbatim as the first line(s) of the body.
    pub head_comment: &'a str,
    pub range_markers: &'a [RangeMarker],
    pub indent: &'a str,
}

/// Result of a successful merge.
#[derive(Debug, Clone)]
pub struct MergedEnum {
    pub document: String,
    /// The reconciled entries as rendered into `document`.
    pub block: EnumBlock,
}

/// Merge `generated` into the enum named by `layout.type_name`.
///
/// On error the caller's document is untouched; nothing is partially applied.
pub fn merge(
    document: &str,
    layout: &EnumLayout<'_>,
    generated: &EnumBlock,
) -> Result<MergedEnum, SyncError> {
    let region_label = format!("typedef enum {}", layout.type_name);
    let (base, region) = match locate_enum(document, layout.type_name)? {
        Some(region) => (Cow::Borrowed(document), region),
        None => {
            let seeded = append_block(
                document,
                &format!("typedef enum {{\n}} {};\n\n", layout.type_name),
            );
            let region = locate_enum(&seeded, layout.type_name)?.ok_or_else(|| {
                SyncError::parse(&region_label, "appended declaration could not be located")
            })?;
            (Cow::Owned(seeded), region)
        }
    };

    let existing = parse_bindings(&base[region.body.start..region.body.end])
        .map_err(|detail| SyncError::parse(&region_label, detail))?;
    let block = reconcile(existing, generated);
    let rendered = render_enum(layout, &block);
    Ok(MergedEnum {
        document: splice(&base, region.span, &rendered),
        block,
    })
}

/// Extract `id -> identifier` bindings from an enum body.
pub fn parse_bindings(body: &str) -> Result<BTreeMap<u64, String>, String> {
    let masked = mask_comments(body)?;
    let code = String::from_utf8_lossy(&masked);
    let assignment = Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*=\s*([0-9]+)$")
        .expect("regex for enum assignments");

    let mut bindings = BTreeMap::new();
    for item in code.split(',') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let caps = assignment
            .captures(item)
            .ok_or_else(|| format!("expected `identifier = number`, found {item:?}"))?;
        let identifier = &caps[1];
        let id: u64 = caps[2]
            .parse()
            .map_err(|_| format!("value of {identifier} does not fit in 64 bits"))?;
        if let Some(previous) = bindings.insert(id, identifier.to_string()) {
            return Err(format!(
                "value {id} is bound to both {previous} and {identifier}"
            ));
        }
    }
    Ok(bindings)
}

/// Combine bindings already in the document with freshly generated entries.
pub fn reconcile(existing: BTreeMap<u64, String>, generated: &EnumBlock) -> EnumBlock {
    let mut block = generated.clone();
    for (id, identifier) in existing {
        match block.get_mut(&id) {
            Some(entry) => {
                if entry.identifier != identifier {
                    tracing::debug!(
                        id,
                        kept = %identifier,
                        generated = %entry.identifier,
                        "keeping published identifier"
                    );
                }
                entry.identifier = identifier;
            }
            None => {
                block.insert(
                    id,
                    EnumEntry {
                        id,
                        identifier,
                        comment: None,
                    },
                );
            }
        }
    }
    block
}

/// Render the full `typedef enum` declaration for `block`.
pub fn render_enum(layout: &EnumLayout<'_>, block: &EnumBlock) -> String {
    let indent = layout.indent;
    let mut body = layout.head_comment.to_string();
    let mut cursor = RangeCursor::new(layout.range_markers);
    let last_id = block.keys().next_back().copied();

    for (id, entry) in block {
        push_markers(&mut body, indent, cursor.due_before(*id));
        if let Some(comment) = entry.comment.as_deref() {
            body.push_str(&format!("{indent}// {}\n", line_comment_text(comment)));
        }
        let separator = if Some(*id) == last_id { "" } else { "," };
        body.push_str(&format!("{indent}{} = {id}{separator}\n", entry.identifier));
    }
    push_markers(&mut body, indent, cursor.remaining());

    format!(
        "typedef enum {name} {{\n{body}}} {name};",
        name = layout.type_name
    )
}

fn push_markers(body: &mut String, indent: &str, markers: &[RangeMarker]) {
    for marker in markers {
        body.push_str(&format!(
            "\n{indent}/* {}-{} : {} */\n",
            marker.start, marker.end, marker.description
        ));
    }
}

/// Flatten comment text onto one line that cannot swallow the next one.
fn line_comment_text(comment: &str) -> String {
    let flat = comment.split_whitespace().collect::<Vec<_>>().join(" ");
    flat.trim_end_matches('\\').trim_end().to_string()
}

/// First identifier bound to two different ids, as `(identifier, first, second)`.
pub fn find_duplicate_identifier(block: &EnumBlock) -> Option<(String, u64, u64)> {
    let mut seen: HashMap<&str, u64> = HashMap::new();
    for (id, entry) in block {
        if let Some(first) = seen.insert(entry.identifier.as_str(), *id) {
            return Some((entry.identifier.clone(), first, *id));
        }
    }
    None
}

#[cfg(test)]
#[path = "enum_block_tests.rs"]
mod tests;
