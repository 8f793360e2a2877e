use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod const_macros;
mod document;
mod enum_block;
mod error;
mod fetch;
mod naming;
mod pipeline;
mod ranges;
mod registry;
mod staging;

use cli::{Command, InitArgs, NameArgs, RootArgs, SyncArgs};
use pipeline::SyncStatus;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    let verbose = matches!(&args.command, Command::Sync(sync) if sync.verbose);
    init_tracing(verbose);

    match args.command {
        Command::Sync(args) => run_sync(args),
        Command::Name(args) => run_name(args),
        Command::Init(args) => run_init(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { Level::INFO } else { Level::WARN };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_sync(args: SyncArgs) -> Result<()> {
    let mut config = config::load_or_default(&args.config)?;
    config.apply_overrides(args.overrides());
    let fetcher = fetch::HttpFetcher::new(args.offline);
    match pipeline::sync_file(&config, &fetcher, args.check)? {
        SyncStatus::Unchanged => {
            eprintln!("{} is up to date", config.header_path.display());
            Ok(())
        }
        SyncStatus::Written => {
            eprintln!("updated {}", config.header_path.display());
            Ok(())
        }
        SyncStatus::WouldChange => Err(anyhow!(
            "{} is out of date; run `ianagen sync` to update it",
            config.header_path.display()
        )),
    }
}

fn run_name(args: NameArgs) -> Result<()> {
    if !config::is_c_identifier(&args.namespace) {
        return Err(anyhow!(
            "--namespace must be a C identifier (got {:?})",
            args.namespace
        ));
    }
    if args.compression_threshold == 0 {
        return Err(anyhow!("--compression-threshold must be greater than zero"));
    }
    let rules = naming::NamingRules {
        style: args.style,
        embed_id: !args.no_id,
        compression_threshold: args.compression_threshold,
        abbreviations: naming::AbbreviationTable::builtin(),
    };
    println!(
        "{}",
        naming::generate_identifier(args.id, &args.label, &args.namespace, &rules)
    );
    Ok(())
}

fn run_init(args: InitArgs) -> Result<()> {
    if args.config.exists() && !args.force {
        return Err(anyhow!(
            "{} already exists (use --force to overwrite)",
            args.config.display()
        ));
    }
    config::write_config(&args.config, args.preset)?;
    eprintln!("wrote {}", args.config.display());
    Ok(())
}
