//! Index state: alias and calculated-value mappings.
//!
//! The two mappings are the only store of terms and formulas. Listing every
//! term means flattening the alias mapping and de-duplicating by
//! (file path, term name).

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::parsing::{Formula, ParsedDocument, Term};

/// A complete view of the index, serialized as
/// `{terms, formulas, scopes, buildTime}`.
///
/// Handed out behind an `Arc`; the index copies on write, so a snapshot a
/// caller holds never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSnapshot {
    terms: HashMap<String, Vec<Arc<Term>>>,
    formulas: HashMap<String, Vec<Arc<Formula>>>,
    scopes: Vec<String>,
    build_time: i64,
}

impl IndexSnapshot {
    /// Alias → terms, in insertion order per alias.
    pub fn terms(&self) -> &HashMap<String, Vec<Arc<Term>>> {
        &self.terms
    }

    /// Calculated value → formulas, in insertion order per value.
    pub fn formulas(&self) -> &HashMap<String, Vec<Arc<Formula>>> {
        &self.formulas
    }

    /// Distinct scopes seen by the last full rebuild, sorted.
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    /// Milliseconds since the epoch of the last mutation.
    pub fn build_time(&self) -> i64 {
        self.build_time
    }

    /// Terms registered under an exact alias.
    pub fn lookup(&self, alias: &str) -> &[Arc<Term>] {
        self.terms.get(alias).map(Vec::as_slice).unwrap_or_default()
    }

    /// Formulas that compute the given value.
    pub fn formulas_for(&self, calculated_value: &str) -> &[Arc<Formula>] {
        self.formulas
            .get(calculated_value)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every distinct term, sorted by (file path, term name).
    pub fn all_terms(&self) -> Vec<Arc<Term>> {
        let mut seen = HashSet::new();
        let mut terms: Vec<Arc<Term>> = self
            .terms
            .values()
            .flatten()
            .filter(|term| seen.insert(term.identity()))
            .cloned()
            .collect();
        terms.sort_by(|a, b| a.identity().cmp(&b.identity()));
        terms
    }

    /// Number of distinct terms.
    pub fn term_count(&self) -> usize {
        self.terms
            .values()
            .flatten()
            .map(|term| term.identity())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Number of distinct formulas (by source file and expression).
    pub fn formula_count(&self) -> usize {
        self.formulas
            .values()
            .flatten()
            .map(|formula| (formula.file_path.as_str(), formula.expression.as_str()))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Source paths of every indexed term or formula.
    pub fn file_paths(&self) -> HashSet<&str> {
        let term_paths = self.terms.values().flatten().map(|t| t.file_path.as_str());
        let formula_paths = self
            .formulas
            .values()
            .flatten()
            .map(|f| f.file_path.as_str());
        term_paths.chain(formula_paths).collect()
    }

    /// Case-insensitive substring search over alias keys.
    ///
    /// An empty query matches nothing. Results are de-duplicated by
    /// (file path, term name); their order is unspecified.
    pub fn search(&self, query: &str) -> Vec<Arc<Term>> {
        if query.is_empty() {
            return Vec::new();
        }

        let query = query.to_lowercase();
        let mut seen = HashSet::new();
        let mut results = Vec::new();

        for (alias, terms) in &self.terms {
            if !alias.to_lowercase().contains(&query) {
                continue;
            }
            for term in terms {
                if seen.insert(term.identity()) {
                    results.push(Arc::clone(term));
                }
            }
        }

        results
    }

    /// Add one document's facts. Returns (terms, formulas) inserted.
    pub(crate) fn insert_document(&mut self, document: ParsedDocument) -> (usize, usize) {
        let term_count = document.terms.len();
        let formula_count = document.formulas.len();

        for term in document.terms {
            let term = Arc::new(term);
            let mut keys = HashSet::new();
            for alias in &term.aliases {
                if keys.insert(alias.as_str()) {
                    self.terms
                        .entry(alias.clone())
                        .or_default()
                        .push(Arc::clone(&term));
                }
            }
        }

        for formula in document.formulas {
            let formula = Arc::new(formula);
            let mut keys = HashSet::new();
            for value in &formula.calculated_values {
                if keys.insert(value.as_str()) {
                    self.formulas
                        .entry(value.clone())
                        .or_default()
                        .push(Arc::clone(&formula));
                }
            }
        }

        (term_count, formula_count)
    }

    /// Drop every entry from `relative_path`. Keys left without entries are
    /// deleted. Returns the number of list entries removed.
    pub(crate) fn remove_file(&mut self, relative_path: &str) -> usize {
        let mut removed = 0;

        self.terms.retain(|_, terms| {
            let before = terms.len();
            terms.retain(|term| term.file_path != relative_path);
            removed += before - terms.len();
            !terms.is_empty()
        });

        self.formulas.retain(|_, formulas| {
            let before = formulas.len();
            formulas.retain(|formula| formula.file_path != relative_path);
            removed += before - formulas.len();
            !formulas.is_empty()
        });

        removed
    }

    pub(crate) fn set_scopes(&mut self, scopes: Vec<String>) {
        self.scopes = scopes;
    }

    pub(crate) fn stamp(&mut self, build_time: i64) {
        self.build_time = build_time;
    }
}
