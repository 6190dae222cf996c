//! Search and resolve commands.

use std::sync::Arc;

use crate::config::Settings;
use crate::index::{Resolution, resolve};
use crate::parsing::Term;

/// Run the search command.
pub fn run_search(settings: &Settings, query: &str, json: bool) -> anyhow::Result<()> {
    let (index, _) = super::index::build(settings)?;
    let mut results = index.search(query);
    results.sort_by(|a, b| a.identity().cmp(&b.identity()));

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No terms match '{query}'");
        return Ok(());
    }

    for term in &results {
        print_term(term);
    }
    Ok(())
}

/// Run the resolve command.
pub fn run_resolve(
    settings: &Settings,
    term: &str,
    scope: Option<&str>,
    file: Option<&str>,
) -> anyhow::Result<()> {
    let (index, _) = super::index::build(settings)?;
    let snapshot = index.snapshot();
    let resolution = resolve(
        &snapshot,
        term,
        scope.unwrap_or_default(),
        file.unwrap_or_default(),
    );

    print_resolution(term, &resolution);
    Ok(())
}

fn print_resolution(term: &str, resolution: &Resolution) {
    if resolution.exact {
        for (rank, definition) in resolution.definitions.iter().enumerate() {
            print!("{}. ", rank + 1);
            print_term(definition);
        }
        return;
    }

    println!("'{term}' is not defined");
    if !resolution.suggestions.is_empty() {
        println!("Did you mean:");
        for suggestion in &resolution.suggestions {
            println!(
                "  {} (distance {}, {} definitions)",
                suggestion.term,
                suggestion.distance,
                suggestion.sources.len()
            );
        }
    }
}

fn print_term(term: &Arc<Term>) {
    let scope = if term.is_global() {
        "global"
    } else {
        term.scope.as_str()
    };
    println!(
        "{} [{}, {}] {}",
        term.term,
        scope,
        term.definition_type.as_str(),
        term.file_path
    );
    for line in term.definition.lines() {
        println!("    {line}");
    }
    if term.has_more {
        println!("    ...");
    }
}
