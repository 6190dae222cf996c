//! Config command - print effective settings.

use crate::config::Settings;

/// Run the config command.
pub fn run(settings: &Settings) -> anyhow::Result<()> {
    println!("# Effective settings");
    println!("# docs root: {}", settings.docs_root_path().display());
    println!();
    print!("{}", settings.to_toml()?);
    Ok(())
}
