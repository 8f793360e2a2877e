//! Sync configuration: which registries feed which enum blocks, and how.
//!
//! The config is a single JSON document. A missing file is not an error; the
//! built-in defaults describe the two IANA CBOR registries.
use crate::fetch;
use crate::naming::{pascal_prefix, AbbreviationTable, Style};
use crate::ranges::{validate_markers, RangeMarker};
use crate::registry::RegistryKind;
use crate::staging;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Current schema version for `ianagen.json`.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Config path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "ianagen.json";

const DEFAULT_HEADER_PATH: &str = "src/cbor.h";
const DEFAULT_INDENT: &str = "  ";
const DEFAULT_COMPRESSION_THRESHOLD: usize = 40;
const DEFAULT_PREAMBLE: &str =
    "\n// IANA CBOR Headers\n// Source: https://github.com/mofosyne/iana-headers\n\n";
const FEATURE_FLAG_HEAD_COMMENT: &str =
    "/* #define the constants so we can check with #ifdef */\n";
const CACHE_SUBDIR: &str = "ianagen";

const SIMPLE_VALUES_CSV_URL: &str = "https://www.iana.org/assignments/cbor-simple-values/simple.csv";
const SIMPLE_VALUES_SOURCE_URL: &str =
    "https://www.iana.org/assignments/cbor-simple-values/cbor-simple-values.xhtml#simple";
const TAGS_CSV_URL: &str = "https://www.iana.org/assignments/cbor-tags/tags.csv";
const TAGS_SOURCE_URL: &str = "https://www.iana.org/assignments/cbor-tags/cbor-tags.xhtml#tags";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    pub schema_version: u32,
    /// One indentation unit, spaces or tabs.
    pub indent: String,
    pub header_path: PathBuf,
    /// Falls back to the platform cache directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    #[serde(default)]
    pub style: Style,
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviations_path: Option<PathBuf>,
    #[serde(default)]
    pub allow_duplicate_identifiers: bool,
    /// Text a brand new header starts with.
    #[serde(default = "default_preamble")]
    pub preamble: String,
    pub registries: Vec<RegistryDescriptor>,
}

/// One registry and the enum block it feeds.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RegistryDescriptor {
    pub kind: RegistryKind,
    pub namespace: String,
    pub title: String,
    pub csv_url: String,
    pub source_url: String,
    #[serde(default = "default_true")]
    pub embed_id: bool,
    /// Overrides the style-derived enum type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub range_markers: Vec<RangeMarker>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_flags: Option<FeatureFlags>,
}

/// A `#define X X` section mirroring the identifiers of an enum block.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FeatureFlags {
    pub section: String,
    #[serde(default = "default_feature_flag_head")]
    pub head_comment: String,
}

/// Starting points for `ianagen init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Preset {
    /// Snake-case identifiers with `_t` type names.
    #[default]
    Default,
    /// Pascal-case identifiers matching tinycbor's `CborKnownTags`.
    Tinycbor,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub header_path: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub style: Option<Style>,
}

fn default_true() -> bool {
    true
}

fn default_compression_threshold() -> usize {
    DEFAULT_COMPRESSION_THRESHOLD
}

fn default_preamble() -> String {
    DEFAULT_PREAMBLE.to_string()
}

fn default_feature_flag_head() -> String {
    FEATURE_FLAG_HEAD_COMMENT.to_string()
}

impl RegistryDescriptor {
    /// The C type name of this registry's enum under `style`.
    pub fn type_name(&self, style: Style) -> String {
        if let Some(type_name) = self.type_name.as_deref() {
            return type_name.to_string();
        }
        match style {
            Style::Snake => format!("{}_t", self.namespace),
            Style::Pascal => self.namespace.clone(),
        }
    }

    /// First line(s) rendered inside the enum body.
    pub fn head_comment(&self, indent: &str) -> String {
        format!(
            "{indent}/* Autogenerated {} (Source: {}) */\n",
            self.title, self.source_url
        )
    }

    pub fn cache_path(&self, cache_dir: &Path) -> PathBuf {
        fetch::cache_path_for(cache_dir, &self.csv_url)
    }
}

impl SyncConfig {
    /// Cache directory, falling back to `<platform cache>/ianagen`.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self.cache_dir.as_ref() {
            return Ok(dir.clone());
        }
        dirs::cache_dir()
            .map(|dir| dir.join(CACHE_SUBDIR))
            .ok_or_else(|| anyhow!("no platform cache directory; set cache_dir in the config"))
    }

    /// The abbreviation table named by the config, or the built-in one.
    pub fn abbreviation_table(&self) -> Result<AbbreviationTable> {
        match self.abbreviations_path.as_deref() {
            Some(path) => AbbreviationTable::load(path),
            None => Ok(AbbreviationTable::builtin().clone()),
        }
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(header_path) = overrides.header_path {
            self.header_path = header_path;
        }
        if let Some(cache_dir) = overrides.cache_dir {
            self.cache_dir = Some(cache_dir);
        }
        if let Some(style) = overrides.style {
            self.style = style;
        }
    }
}

fn simple_values_registry(namespace: &str) -> RegistryDescriptor {
    RegistryDescriptor {
        kind: RegistryKind::SimpleValues,
        namespace: namespace.to_string(),
        title: "IANA CBOR Content-Formats".to_string(),
        csv_url: SIMPLE_VALUES_CSV_URL.to_string(),
        source_url: SIMPLE_VALUES_SOURCE_URL.to_string(),
        embed_id: false,
        type_name: None,
        range_markers: vec![
            RangeMarker::new(0, 19, "Standards Action"),
            RangeMarker::new(32, 255, "Specification Required"),
        ],
        feature_flags: None,
    }
}

fn tags_registry(namespace: &str) -> RegistryDescriptor {
    RegistryDescriptor {
        kind: RegistryKind::Tags,
        namespace: namespace.to_string(),
        title: "IANA CBOR Tags".to_string(),
        csv_url: TAGS_CSV_URL.to_string(),
        source_url: TAGS_SOURCE_URL.to_string(),
        embed_id: true,
        type_name: None,
        range_markers: vec![
            RangeMarker::new(0, 23, "Standards Action"),
            RangeMarker::new(24, 32767, "Specification Required"),
            RangeMarker::new(32768, u64::MAX, "First Come First Served"),
        ],
        feature_flags: None,
    }
}

/// Build the config used when no config file exists.
pub fn default_config() -> SyncConfig {
    SyncConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        indent: DEFAULT_INDENT.to_string(),
        header_path: PathBuf::from(DEFAULT_HEADER_PATH),
        cache_dir: None,
        style: Style::Snake,
        compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
        abbreviations_path: None,
        allow_duplicate_identifiers: false,
        preamble: default_preamble(),
        registries: vec![
            simple_values_registry("cbor_simple_value"),
            tags_registry("cbor_tag"),
        ],
    }
}

/// Pascal-case names plus a feature-flag section, as tinycbor's `cbor.h` uses.
pub fn tinycbor_config() -> SyncConfig {
    let mut tags = tags_registry("CborKnownTags");
    tags.feature_flags = Some(FeatureFlags {
        section: "cbor known tag feature flag".to_string(),
        head_comment: default_feature_flag_head(),
    });
    SyncConfig {
        style: Style::Pascal,
        registries: vec![simple_values_registry("CborSimpleValue"), tags],
        ..default_config()
    }
}

pub fn preset_config(preset: Preset) -> SyncConfig {
    match preset {
        Preset::Default => default_config(),
        Preset::Tinycbor => tinycbor_config(),
    }
}

/// Render a pretty JSON config stub for `ianagen init`.
pub fn config_stub(preset: Preset) -> String {
    let config = preset_config(preset);
    serde_json::to_string_pretty(&config).expect("serialize config stub")
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<SyncConfig> {
    let bytes = fs::read(path).with_context(|| format!("read config {}", path.display()))?;
    let config: SyncConfig = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse config JSON {}", path.display()))?;
    validate_config(&config).with_context(|| format!("validate {}", path.display()))?;
    Ok(config)
}

/// Load `path`, or fall back to the built-in defaults when it does not exist.
pub fn load_or_default(path: &Path) -> Result<SyncConfig> {
    if path.exists() {
        return load_config(path);
    }
    tracing::warn!(config = %path.display(), "config not found; using built-in defaults");
    Ok(default_config())
}

/// Write the stub for `preset` to `path`.
pub fn write_config(path: &Path, preset: Preset) -> Result<()> {
    let mut text = config_stub(preset);
    text.push('\n');
    staging::publish_text(path, &text).with_context(|| format!("write config {}", path.display()))
}

/// Validate config schema and registry descriptors.
pub fn validate_config(config: &SyncConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported config schema_version {}",
            config.schema_version
        ));
    }
    if config.indent.is_empty() || !config.indent.chars().all(|ch| ch == ' ' || ch == '\t') {
        return Err(anyhow!(
            "indent must be one or more spaces or tabs (got {:?})",
            config.indent
        ));
    }
    if config.compression_threshold == 0 {
        return Err(anyhow!("compression_threshold must be greater than zero"));
    }
    if config.registries.is_empty() {
        return Err(anyhow!("registries must list at least one registry"));
    }

    let mut type_names = BTreeSet::new();
    let mut sections = BTreeSet::new();
    let mut cache_files = BTreeSet::new();
    for registry in &config.registries {
        validate_registry(registry, config.style)
            .with_context(|| format!("registry {:?}", registry.namespace))?;
        let type_name = registry.type_name(config.style);
        if !type_names.insert(type_name.clone()) {
            return Err(anyhow!("type name {type_name} is used by more than one registry"));
        }
        if let Some(flags) = registry.feature_flags.as_ref() {
            if !sections.insert(flags.section.clone()) {
                return Err(anyhow!(
                    "feature flag section {:?} is used by more than one registry",
                    flags.section
                ));
            }
        }
        let cache_file = registry.cache_path(Path::new(""));
        if !cache_files.insert(cache_file.clone()) {
            return Err(anyhow!(
                "registries share the cache file name {}",
                cache_file.display()
            ));
        }
    }
    Ok(())
}

fn validate_registry(registry: &RegistryDescriptor, style: Style) -> Result<()> {
    if !is_c_identifier(&registry.namespace) {
        return Err(anyhow!(
            "namespace must be a C identifier (got {:?})",
            registry.namespace
        ));
    }
    if style == Style::Pascal && pascal_prefix(&registry.namespace).0.is_empty() {
        return Err(anyhow!(
            "namespace {:?} leaves no prefix for pascal identifiers",
            registry.namespace
        ));
    }
    if let Some(type_name) = registry.type_name.as_deref() {
        if !is_c_identifier(type_name) {
            return Err(anyhow!("type_name must be a C identifier (got {type_name:?})"));
        }
    }
    if registry.csv_url.trim().is_empty() {
        return Err(anyhow!("csv_url must be non-empty"));
    }
    for (label, text) in [("title", &registry.title), ("source_url", &registry.source_url)] {
        if text.contains("*/") || text.contains('\n') {
            return Err(anyhow!("{label} must be a single line without \"*/\""));
        }
    }
    validate_markers(&registry.range_markers)?;
    if let Some(flags) = registry.feature_flags.as_ref() {
        if flags.section.trim().is_empty() || flags.section.contains("*/") {
            return Err(anyhow!(
                "feature_flags.section must be non-empty and must not contain \"*/\""
            ));
        }
    }
    Ok(())
}

pub(crate) fn is_c_identifier(text: &str) -> bool {
    let mut bytes = text.bytes();
    match bytes.next() {
        Some(first) if first.is_ascii_alphabetic() || first == b'_' => {}
        _ => return false,
    }
    bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
