//! Scope-aware term resolution.
//!
//! A reference such as `【hp】` from a document in scope `combat` can match
//! several definitions. They are ranked:
//!
//! 0. inline definition in the referring file
//! 1. definition in the current scope (or the explicit scope of `scope/hp`)
//! 2. global definition (empty scope)
//! 3. anything else
//!
//! When nothing matches exactly, nearby aliases are offered as suggestions.

use serde::Serialize;
use std::sync::Arc;

use super::snapshot::IndexSnapshot;
use crate::parsing::Term;

/// Suggestions returned for a miss.
pub const MAX_SUGGESTIONS: usize = 5;

/// Largest edit distance still offered as a suggestion.
pub const MAX_DISTANCE: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Matching definitions, highest priority first.
    pub definitions: Vec<Arc<Term>>,
    pub exact: bool,
    /// Empty when `exact` is true.
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    /// The alias that nearly matched.
    pub term: String,
    pub distance: usize,
    pub sources: Vec<Arc<Term>>,
}

/// Split `scope/term` into its parts. A leading `/` is not a scope separator.
pub fn split_scoped_name(name: &str) -> (Option<&str>, &str) {
    match name.find('/') {
        Some(pos) if pos > 0 => (Some(&name[..pos]), &name[pos + 1..]),
        _ => (None, name),
    }
}

/// Resolve a term reference against a snapshot.
pub fn resolve(
    snapshot: &IndexSnapshot,
    name: &str,
    current_scope: &str,
    current_file: &str,
) -> Resolution {
    let (explicit_scope, lookup_name) = split_scoped_name(name);
    let definitions = snapshot.lookup(lookup_name);

    if definitions.is_empty() {
        return Resolution {
            definitions: Vec::new(),
            exact: false,
            suggestions: suggestions(snapshot, lookup_name),
        };
    }

    let mut sorted = definitions.to_vec();
    // stable: equal priorities keep insertion order
    sorted.sort_by_key(|term| priority(term, explicit_scope, current_scope, current_file));

    Resolution {
        definitions: sorted,
        exact: true,
        suggestions: Vec::new(),
    }
}

/// Keep the definitions visible from the referring document.
///
/// With an explicit scope only that scope and global definitions remain.
/// Otherwise inline definitions from the current file, the current scope and
/// global definitions remain.
pub fn filter_by_scope(
    definitions: &[Arc<Term>],
    explicit_scope: Option<&str>,
    current_scope: &str,
    current_file: &str,
) -> Vec<Arc<Term>> {
    definitions
        .iter()
        .filter(|term| match explicit_scope {
            Some(scope) => term.scope == scope || term.is_global(),
            None => {
                is_local_inline(term, current_file)
                    || (!current_scope.is_empty() && term.scope == current_scope)
                    || term.is_global()
            }
        })
        .cloned()
        .collect()
}

fn priority(
    term: &Term,
    explicit_scope: Option<&str>,
    current_scope: &str,
    current_file: &str,
) -> u8 {
    if is_local_inline(term, current_file) {
        return 0;
    }

    if let Some(scope) = explicit_scope {
        return if term.scope == scope {
            1
        } else if term.is_global() {
            2
        } else {
            3
        };
    }

    if !current_scope.is_empty() && term.scope == current_scope {
        1
    } else if term.is_global() {
        2
    } else {
        3
    }
}

fn is_local_inline(term: &Term, current_file: &str) -> bool {
    term.is_inline() && term.file_path == current_file
}

fn suggestions(snapshot: &IndexSnapshot, query: &str) -> Vec<Suggestion> {
    let mut candidates: Vec<Suggestion> = snapshot
        .terms()
        .iter()
        .filter_map(|(alias, terms)| {
            // char-level so CJK names count one edit per character
            let distance = strsim::levenshtein(query, alias);
            (1..=MAX_DISTANCE).contains(&distance).then(|| Suggestion {
                term: alias.clone(),
                distance,
                sources: terms.clone(),
            })
        })
        .collect();

    candidates.sort_by(|a, b| a.distance.cmp(&b.distance).then_with(|| a.term.cmp(&b.term)));
    candidates.truncate(MAX_SUGGESTIONS);
    candidates
}
