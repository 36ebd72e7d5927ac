//! Narravox CLI
//!
//! Command-line interface for the Narravox project manager.

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use narravox::cli::{commands, Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Init {
            path,
            script,
            sample_rate,
            loudness,
            model,
            seed,
            crossfade_ms,
            max_words,
        } => commands::init(
            &path,
            &script,
            sample_rate,
            loudness,
            model,
            seed,
            crossfade_ms,
            max_words,
        ),
        Commands::Replace {
            path,
            index,
            timeline,
            seed,
            import,
            params,
        } => commands::replace(&path, index, timeline, seed, import, &params),
        Commands::Build { path } => commands::build(&path),
        Commands::Find { path, timestamp_ms } => commands::find(&path, timestamp_ms),
        Commands::Show { path } => commands::show(&path),
    }?;
    Ok(())
}
