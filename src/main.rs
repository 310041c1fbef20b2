use clap::Parser;
use kopy::backup::backup_config::KopyConfig;
use kopy::backup::command::Command;
use kopy::backup::ignore::IgnorePatterns;
use std::path::PathBuf;
use std::process::exit;
use tracing::error;

/// Copy, archive and restore files
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Location of config file, defaults to ./config.yaml when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Comma separated ignore patterns, replaces the configured list
    #[arg(short, long)]
    ignore: Option<IgnorePatterns>,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let res = KopyConfig::load(args.config.as_deref())
        .map(|config| config.with_ignore(args.ignore.clone()))
        .and_then(|config| args.command.run(&config));

    if let Err(e) = res {
        error!("{e}");
        exit(1);
    }
}
