//! Addressable regions inside a C header document.
//!
//! Every edit follows the same shape: locate a region's byte span, render new
//! text for it, and splice it in. Bytes outside the span are never touched.
use crate::error::SyncError;

/// Half-open byte range into a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Replace `span` in `document` with `replacement`.
pub fn splice(document: &str, span: Span, replacement: &str) -> String {
    let mut out = String::with_capacity(document.len() - (span.end - span.start) + replacement.len());
    out.push_str(&document[..span.start]);
    out.push_str(replacement);
    out.push_str(&document[span.end..]);
    out
}

/// Append `text` on a fresh line at the end of `document`.
pub fn append_block(document: &str, text: &str) -> String {
    let mut out = document.to_string();
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(text);
    out
}

/// A `typedef enum [tag] { body } name;` declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumRegion {
    /// From `typedef` through the closing `;`.
    pub span: Span,
    /// Between the braces.
    pub body: Span,
}

/// Find the single enum typedef named `type_name`.
pub fn locate_enum(document: &str, type_name: &str) -> Result<Option<EnumRegion>, SyncError> {
    let region_label = format!("typedef enum {type_name}");
    let masked = mask_comments(document).map_err(|detail| SyncError::parse(&region_label, detail))?;

    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(offset) = find_word(&masked[pos..], b"typedef") {
        let start = pos + offset;
        pos = start + "typedef".len();
        if let Some((region, name)) = match_enum_typedef(&masked, start) {
            if &document[name.start..name.end] == type_name {
                found.push(region);
            }
        }
    }

    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        count => Err(SyncError::AmbiguousTarget {
            region: region_label,
            count,
        }),
    }
}

fn match_enum_typedef(masked: &[u8], start: usize) -> Option<(EnumRegion, Span)> {
    let mut i = skip_ws(masked, start + "typedef".len());
    let keyword = read_ident(masked, i)?;
    if &masked[keyword.start..keyword.end] != b"enum" {
        return None;
    }
    i = skip_ws(masked, keyword.end);
    if let Some(tag) = read_ident(masked, i) {
        i = skip_ws(masked, tag.end);
    }
    if masked.get(i) != Some(&b'{') {
        return None;
    }
    let body_start = i + 1;
    let body_end = body_start + masked[body_start..].iter().position(|b| *b == b'}')?;
    i = skip_ws(masked, body_end + 1);
    let name = read_ident(masked, i)?;
    i = skip_ws(masked, name.end);
    if masked.get(i) != Some(&b';') {
        return None;
    }
    let region = EnumRegion {
        span: Span { start, end: i + 1 },
        body: Span {
            start: body_start,
            end: body_end,
        },
    };
    Some((region, name))
}

pub fn section_start_marker(section: &str) -> String {
    format!("/* Start of {section} autogenerated section */")
}

pub fn section_end_marker(section: &str) -> String {
    format!("/* End of {section} autogenerated section */")
}

/// Find the content span between a section's start and end sentinels.
pub fn locate_section(document: &str, section: &str) -> Result<Option<Span>, SyncError> {
    let start_marker = section_start_marker(section);
    let end_marker = section_end_marker(section);
    let region_label = format!("section {section:?}");

    let starts: Vec<usize> = document
        .match_indices(&start_marker)
        .map(|(idx, _)| idx)
        .collect();
    let start = match starts.as_slice() {
        [] => return Ok(None),
        [start] => *start,
        many => {
            return Err(SyncError::AmbiguousTarget {
                region: region_label,
                count: many.len(),
            })
        }
    };

    let content_start = start + start_marker.len();
    let content_end = document[content_start..]
        .find(&end_marker)
        .map(|offset| content_start + offset)
        .ok_or_else(|| SyncError::parse(&region_label, "start marker has no matching end marker"))?;
    Ok(Some(Span {
        start: content_start,
        end: content_end,
    }))
}

/// Blank out comments and literal contents, keeping byte offsets and newlines.
///
/// Fails on an unterminated block comment.
pub fn mask_comments(text: &str) -> Result<Vec<u8>, String> {
    let bytes = text.as_bytes();
    let mut masked = bytes.to_vec();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                let end = bytes[i..]
                    .iter()
                    .position(|b| *b == b'\n')
                    .map_or(bytes.len(), |offset| i + offset);
                blank(&mut masked, i, end);
                i = end;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = text[i + 2..]
                    .find("*/")
                    .map(|offset| i + 2 + offset + 2)
                    .ok_or_else(|| format!("unterminated block comment at byte {i}"))?;
                blank(&mut masked, i, end);
                i = end;
            }
            quote @ (b'"' | b'\'') => {
                let mut j = i + 1;
                while j < bytes.len() && bytes[j] != quote && bytes[j] != b'\n' {
                    j += if bytes[j] == b'\\' { 2 } else { 1 };
                }
                let end = (j + 1).min(bytes.len());
                blank(&mut masked, i + 1, end.saturating_sub(1).max(i + 1));
                i = end;
            }
            _ => i += 1,
        }
    }
    Ok(masked)
}

fn blank(masked: &mut [u8], start: usize, end: usize) {
    for b in &mut masked[start..end] {
        if *b != b'\n' {
            *b = b' ';
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
        i += 1;
    }
    i
}

fn read_ident(bytes: &[u8], start: usize) -> Option<Span> {
    let first = *bytes.get(start)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut end = start + 1;
    while bytes.get(end).copied().is_some_and(is_ident_byte) {
        end += 1;
    }
    Some(Span { start, end })
}

fn find_word(haystack: &[u8], word: &[u8]) -> Option<usize> {
    let mut from = 0;
    while from + word.len() <= haystack.len() {
        let offset = haystack[from..]
            .windows(word.len())
            .position(|window| window == word)?;
        let at = from + offset;
        let before_ok = at == 0 || !is_ident_byte(haystack[at - 1]);
        let after_ok = !haystack
            .get(at + word.len())
            .is_some_and(|b| is_ident_byte(*b));
        if before_ok && after_ok {
            return Some(at);
        }
        from = at + 1;
    }
    None
}
