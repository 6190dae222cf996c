//! Index command - one-shot rebuild with a summary.

use anyhow::Context;

use crate::config::Settings;
use crate::index::{RebuildStats, WikiIndex};

/// Build the index for the configured docs root.
pub fn build(settings: &Settings) -> anyhow::Result<(WikiIndex, RebuildStats)> {
    let root = settings.docs_root_path();
    let index = WikiIndex::with_extension(&root, &settings.extension);
    let stats = index
        .rebuild()
        .with_context(|| format!("failed to index {}", root.display()))?;
    Ok((index, stats))
}

/// Run the index command.
pub fn run(settings: &Settings, json: bool) -> anyhow::Result<()> {
    let (index, stats) = build(settings)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&*index.snapshot())?);
        return Ok(());
    }

    let snapshot = index.snapshot();
    println!("Indexed {}", index.root().display());
    println!("  files:    {}", stats.files_indexed);
    println!("  terms:    {} ({} distinct)", stats.terms, snapshot.term_count());
    println!(
        "  formulas: {} ({} distinct)",
        stats.formulas,
        snapshot.formula_count()
    );
    println!("  scopes:   {}", index.scopes().join(", "));
    println!("  time:     {}ms", stats.duration_ms);

    if !stats.errors.is_empty() {
        eprintln!("Skipped {} unreadable files:", stats.errors.len());
        for (path, reason) in &stats.errors {
            eprintln!("  {}: {reason}", path.display());
        }
    }

    Ok(())
}
