//! Fully regenerated `#define` sections bounded by sentinel comments.
//!
//! Unlike enum blocks these sections carry no identity between runs: whatever
//! sits between the sentinels is replaced wholesale.
use crate::document::{
    append_block, locate_section, section_end_marker, section_start_marker, splice,
};
use crate::enum_block::EnumBlock;
use crate::error::SyncError;
use std::collections::BTreeMap;

/// Right-hand side of one `#define`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroValue {
    pub value: String,
    pub comment: Option<String>,
}

/// Macros keyed by name; iteration order is render order.
pub type MacroSection = BTreeMap<String, MacroValue>;

/// Replace the contents of `section_name` with `entries`.
pub fn replace(
    document: &str,
    section_name: &str,
    head_comment: &str,
    entries: &MacroSection,
) -> Result<String, SyncError> {
    let seeded;
    let (base, span) = match locate_section(document, section_name)? {
        Some(span) => (document, span),
        None => {
            seeded = append_block(
                document,
                &format!(
                    "{}\n{}\n",
                    section_start_marker(section_name),
                    section_end_marker(section_name)
                ),
            );
            let span = locate_section(&seeded, section_name)?.ok_or_else(|| {
                SyncError::parse(
                    format!("section {section_name:?}"),
                    "appended section could not be located",
                )
            })?;
            (seeded.as_str(), span)
        }
    };

    let mut content = String::from("\n");
    content.push_str(head_comment);
    for (name, macro_value) in entries {
        content.push_str(&format!("#define {name} {}", macro_value.value));
        if let Some(comment) = macro_value.comment.as_deref() {
            let flat = comment.split_whitespace().collect::<Vec<_>>().join(" ");
            content.push_str(&format!(" // {}", flat.trim_end_matches('\\').trim_end()));
        }
        content.push('\n');
    }
    Ok(splice(base, span, &content))
}

/// One `#define X X` per enum identifier so C code can test for it with `#ifdef`.
pub fn feature_flags(block: &EnumBlock) -> MacroSection {
    block
        .values()
        .map(|entry| {
            (
                entry.identifier.clone(),
                MacroValue {
                    value: entry.identifier.clone(),
                    comment: None,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enum_block::EnumEntry;

    const HEAD: &str = "/* #define the constants so we can check with #ifdef */\n";

    fn section(pairs: &[(&str, &str)]) -> MacroSection {
        pairs
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    MacroValue {
                        value: value.to_string(),
                        comment: None,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn creates_section_when_missing() {
        let out = replace("int x;", "flags", HEAD, &section(&[("B", "B"), ("A", "A")]))
            .expect("replace");
        assert_eq!(
            out,
            "int x;\n/* Start of flags autogenerated section */\n\
/* #define the constants so we can check with #ifdef */\n\
#define A A\n\
#define B B\n\
/* End of flags autogenerated section */\n"
        );
    }

    #[test]
    fn replaces_previous_contents_entirely() {
        let doc = "a\n/* Start of flags autogenerated section */\n#define STALE 1\n/* End of flags autogenerated section */\nb\n";
        let out = replace(doc, "flags", "", &section(&[("FRESH", "2")])).expect("replace");
        assert_eq!(
            out,
            "a\n/* Start of flags autogenerated section */\n#define FRESH 2\n/* End of flags autogenerated section */\nb\n"
        );
        let again = replace(&out, "flags", "", &section(&[("FRESH", "2")])).expect("replace");
        assert_eq!(again, out);
    }

    #[test]
    fn comments_follow_the_value() {
        let mut entries = section(&[("LIMIT", "10")]);
        entries.get_mut("LIMIT").expect("entry").comment = Some("upper\nbound".to_string());
        let out = replace("", "s", "", &entries).expect("replace");
        assert!(out.contains("#define LIMIT 10 // upper bound\n"));
    }

    #[test]
    fn missing_end_marker_is_rejected() {
        let doc = "/* Start of flags autogenerated section */\n";
        assert!(matches!(
            replace(doc, "flags", HEAD, &MacroSection::new()),
            Err(SyncError::Parse { .. })
        ));
    }

    #[test]
    fn feature_flags_alias_enum_identifiers() {
        let block: EnumBlock = [(
            2,
            EnumEntry {
                id: 2,
                identifier: "CborPositiveBignumTag".to_string(),
                comment: None,
            },
        )]
        .into_iter()
        .collect();
        let flags = feature_flags(&block);
        assert_eq!(flags["CborPositiveBignumTag"].value, "CborPositiveBignumTag");
    }
}
