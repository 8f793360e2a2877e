//! Atomic file publication: write a sibling temp file, then rename over the target.
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Replace `dest` with `text` so readers see either the old or the new bytes.
pub fn publish_text(dest: &Path, text: &str) -> Result<()> {
    let parent = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    let file_name = dest
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("staged");
    let mut staged = tempfile::Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .with_context(|| format!("stage {}", dest.display()))?;
    staged
        .write_all(text.as_bytes())
        .with_context(|| format!("stage {}", dest.display()))?;
    staged
        .persist(dest)
        .map_err(|err| err.error)
        .with_context(|| format!("publish {}", dest.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_creates_and_replaces() {
        let root = tempfile::tempdir().expect("tempdir");
        let dest = root.path().join("nested").join("out.h");
        publish_text(&dest, "one").expect("first publish");
        publish_text(&dest, "two").expect("second publish");
        assert_eq!(fs::read_to_string(&dest).expect("read"), "two");
        let leftovers: Vec<_> = fs::read_dir(dest.parent().expect("parent"))
            .expect("read dir")
            .collect();
        assert_eq!(leftovers.len(), 1);
    }
}
