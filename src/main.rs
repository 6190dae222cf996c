use clap::Parser;
use std::path::{Path, PathBuf};

use wikidex::Settings;
use wikidex::cli::commands;
use wikidex::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    let mut settings = loaded.unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration for now.");
        Settings::default()
    });

    if let Some(root) = &cli.root {
        settings.docs_root = absolute(root);
    }

    wikidex::logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Serve { port, no_watch } => commands::serve::run(settings, port, no_watch).await,
        Commands::Index { json } => commands::index::run(&settings, json),
        Commands::Search { query, json } => commands::query::run_search(&settings, &query, json),
        Commands::Resolve { term, scope, file } => {
            commands::query::run_resolve(&settings, &term, scope.as_deref(), file.as_deref())
        }
        Commands::Watch => commands::watch::run(settings).await,
        Commands::Config => commands::config::run(&settings),
    }
}

/// `--root` is relative to where the command runs, not to the workspace.
fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
