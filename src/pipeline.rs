//! End-to-end sync: every configured registry is merged into one in-memory
//! document, and the header file is written once at the end.
use crate::config::{validate_config, RegistryDescriptor, SyncConfig};
use crate::const_macros;
use crate::enum_block::{self, EnumBlock, EnumEntry, EnumLayout};
use crate::error::SyncError;
use crate::fetch::RegistryFetcher;
use crate::naming::{generate_identifier, AbbreviationTable, NamingRules};
use crate::registry::parse_records;
use crate::staging;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// What `sync_file` did (or would do) to the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Unchanged,
    Written,
    /// Check mode found pending changes; nothing was written.
    WouldChange,
}

/// Sync the configured header file in place.
///
/// Either every registry merges cleanly and the file is replaced atomically,
/// or the file is left exactly as it was.
pub fn sync_file(
    config: &SyncConfig,
    fetcher: &dyn RegistryFetcher,
    check: bool,
) -> Result<SyncStatus> {
    validate_config(config).context("validate config")?;
    let header_path = config.header_path.as_path();
    let existing = read_header(header_path)?;
    let starting = existing.as_deref().unwrap_or(config.preamble.as_str());
    if existing.is_none() {
        tracing::info!(header = %header_path.display(), "header not found; seeding preamble");
    }

    let updated = sync_document(config, fetcher, starting)?;
    if existing.as_deref() == Some(updated.as_str()) {
        tracing::info!(header = %header_path.display(), "header already up to date");
        return Ok(SyncStatus::Unchanged);
    }
    if check {
        tracing::info!(header = %header_path.display(), "header is out of date");
        return Ok(SyncStatus::WouldChange);
    }
    staging::publish_text(header_path, &updated)?;
    tracing::info!(header = %header_path.display(), bytes = updated.len(), "wrote header");
    Ok(SyncStatus::Written)
}

fn read_header(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let text =
        fs::read_to_string(path).with_context(|| format!("read header {}", path.display()))?;
    Ok(Some(text))
}

/// Run every configured registry over `document` and return the result.
pub fn sync_document(
    config: &SyncConfig,
    fetcher: &dyn RegistryFetcher,
    document: &str,
) -> Result<String> {
    let cache_dir = config.resolved_cache_dir()?;
    let abbreviations = config.abbreviation_table()?;
    let mut document = document.to_string();
    for registry in &config.registries {
        let cache_path = registry.cache_path(&cache_dir);
        let text = fetcher
            .fetch(&registry.csv_url, &cache_path)
            .with_context(|| format!("fetch {} registry", registry.namespace))?;
        document = sync_registry(config, registry, &abbreviations, &text, &document)
            .with_context(|| format!("sync {} registry", registry.namespace))?;
    }
    Ok(document)
}

/// Merge one registry's CSV text into `document`.
pub fn sync_registry(
    config: &SyncConfig,
    registry: &RegistryDescriptor,
    abbreviations: &AbbreviationTable,
    csv_text: &str,
    document: &str,
) -> Result<String, SyncError> {
    let records = parse_records(csv_text, registry.kind)?;
    let rules = NamingRules {
        style: config.style,
        embed_id: registry.embed_id,
        compression_threshold: config.compression_threshold,
        abbreviations,
    };
    let generated: EnumBlock = records
        .values()
        .map(|record| {
            let entry = EnumEntry {
                id: record.id,
                identifier: generate_identifier(
                    record.id,
                    &record.raw_label,
                    &registry.namespace,
                    &rules,
                ),
                comment: Some(record.comment()),
            };
            (record.id, entry)
        })
        .collect();

    let type_name = registry.type_name(config.style);
    let head_comment = registry.head_comment(&config.indent);
    let layout = EnumLayout {
        type_name: &type_name,
        head_comment: &head_comment,
        range_markers: &registry.range_markers,
        indent: &config.indent,
    };
    let merged = enum_block::merge(document, &layout, &generated)?;

    if let Some((identifier, first, second)) = enum_block::find_duplicate_identifier(&merged.block)
    {
        if !config.allow_duplicate_identifiers {
            return Err(SyncError::DuplicateIdentifier {
                type_name,
                identifier,
                first,
                second,
            });
        }
        tracing::warn!(
            type_name = %type_name,
            identifier = %identifier,
            first,
            second,
            "identifier bound to more than one id"
        );
    }

    let mut document = merged.document;
    if let Some(flags) = registry.feature_flags.as_ref() {
        document = const_macros::replace(
            &document,
            &flags.section,
            &flags.head_comment,
            &const_macros::feature_flags(&merged.block),
        )?;
    }
    tracing::info!(
        registry = %registry.kind,
        style = %config.style,
        type_name = %type_name,
        records = records.len(),
        entries = merged.block.len(),
        "merged registry"
    );
    Ok(document)
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
