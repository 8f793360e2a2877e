//! CLI argument parsing for header synchronization.
use crate::config::{ConfigOverrides, Preset, DEFAULT_CONFIG_PATH};
use crate::naming::Style;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "ianagen",
    version,
    about = "Keep C enum headers in sync with IANA registries",
    after_help = "Examples:\n  ianagen init --preset tinycbor\n  ianagen sync --header src/cbor.h\n  ianagen sync --offline --check\n  ianagen name --namespace cbor_tag --id 2 \"Positive bignum\"",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Sync(SyncArgs),
    Name(NameArgs),
    Init(InitArgs),
}

/// Sync command inputs.
#[derive(Parser, Debug)]
#[command(about = "Fetch registries and merge them into the header")]
pub struct SyncArgs {
    /// Config file; built-in defaults are used when it does not exist
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Header to update (overrides header_path)
    #[arg(long, value_name = "PATH")]
    pub header: Option<PathBuf>,

    /// Registry cache directory (overrides cache_dir)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Identifier style (overrides style)
    #[arg(long, value_enum)]
    pub style: Option<Style>,

    /// Use cached registries only
    #[arg(long)]
    pub offline: bool,

    /// Exit non-zero instead of writing when the header is out of date
    #[arg(long)]
    pub check: bool,

    /// Log fetch and merge decisions
    #[arg(long)]
    pub verbose: bool,
}

impl SyncArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            header_path: self.header.clone(),
            cache_dir: self.cache_dir.clone(),
            style: self.style,
        }
    }
}

/// Name command inputs for previewing a generated identifier.
#[derive(Parser, Debug)]
#[command(about = "Print the identifier generated for a registry label")]
pub struct NameArgs {
    /// Identifier namespace, e.g. cbor_tag or CborKnownTags
    #[arg(long)]
    pub namespace: String,

    /// Registry code
    #[arg(long)]
    pub id: u64,

    #[arg(long, value_enum, default_value_t = Style::Snake)]
    pub style: Style,

    /// Leave the id out of snake-case identifiers
    #[arg(long)]
    pub no_id: bool,

    /// Token character count at which long labels are compressed
    #[arg(long, value_name = "N", default_value_t = 40)]
    pub compression_threshold: usize,

    /// Registry label text
    pub label: String,
}

/// Init command inputs.
#[derive(Parser, Debug)]
#[command(about = "Write a starter config file")]
pub struct InitArgs {
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = Preset::Default)]
    pub preset: Preset,

    /// Overwrite an existing config
    #[arg(long)]
    pub force: bool,
}
