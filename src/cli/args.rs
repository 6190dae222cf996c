//! CLI argument parsing using clap.
//!
//! Contains the Cli struct and the Commands enum.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use std::path::PathBuf;

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

/// Live index of a design wiki
#[derive(Parser, Debug)]
#[command(
    name = "wikidex",
    version = env!("CARGO_PKG_VERSION"),
    about = "Live term, alias and formula index for a design wiki",
    long_about = "Index the terms, aliases and formulas of a directory of wiki documents \
                  and keep the index current while the documents change.",
    next_line_help = true,
    styles = clap_cargo_style()
)]
pub struct Cli {
    /// Wiki document root (overrides docs_root from settings)
    #[arg(short, long, global = true, env = "WIKIDEX_ROOT")]
    pub root: Option<PathBuf>,

    /// Path to custom settings.toml file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the index, watch for changes and serve it over HTTP
    Serve {
        /// Port to try first (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve the initial index without watching for changes
        #[arg(long)]
        no_watch: bool,
    },

    /// Build the index once and report what was found
    Index {
        /// Print the full index as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search term aliases (case-insensitive substring)
    Search {
        /// Text to look for
        query: String,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a term reference the way a document would see it
    Resolve {
        /// Term name, optionally prefixed with a scope: `combat/hp`
        term: String,

        /// Scope of the referring document
        #[arg(short, long)]
        scope: Option<String>,

        /// Path of the referring document, relative to the root
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Build the index and print every change message until Ctrl+C
    Watch,

    /// Display active settings
    Config,
}
