//! Wiki document parsing.
//!
//! Extraction runs as independent passes over the same text:
//! - front matter (`scope`, `alias`) and the file-level term
//! - inline term declarations `【name】：definition`
//! - formulas `%% [calculated] = <design> %%`
//!
//! Parsing never fails: malformed input yields partial or empty results.

pub mod definition;
pub mod formula;
pub mod front_matter;
pub mod inline;
pub mod patterns;
pub mod types;

pub use definition::{Definition, extract_definition};
pub use formula::extract_formulas;
pub use front_matter::{FrontMatter, split_front_matter};
pub use inline::extract_inline_terms;
pub use types::{DefinitionType, Formula, ParsedDocument, Term};

use std::path::Path;

/// Default document extension.
pub const DEFAULT_EXTENSION: &str = "md";

/// Parser for wiki documents with a given extension.
#[derive(Debug, Clone)]
pub struct WikiParser {
    extension: String,
}

impl Default for WikiParser {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSION)
    }
}

impl WikiParser {
    /// Create a parser for documents ending in `.{extension}`.
    pub fn new(extension: impl Into<String>) -> Self {
        let extension = extension.into();
        Self {
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Read and parse one file.
    ///
    /// Only I/O fails; the content itself is always accepted. Invalid UTF-8 is
    /// replaced rather than rejected.
    pub fn parse_file(
        &self,
        full_path: &Path,
        relative_path: &str,
    ) -> std::io::Result<ParsedDocument> {
        let bytes = std::fs::read(full_path)?;
        let text = String::from_utf8_lossy(&bytes);
        Ok(self.parse(&text, relative_path))
    }

    /// Parse document text. `relative_path` is the `/`-separated path below the wiki root.
    pub fn parse(&self, text: &str, relative_path: &str) -> ParsedDocument {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let (front_matter, body) = split_front_matter(text);
        let scope = front_matter
            .as_ref()
            .map(|fm| fm.scope().to_string())
            .unwrap_or_default();

        let mut terms: Vec<Term> = front_matter
            .as_ref()
            .and_then(|fm| self.file_term(fm, body, &scope, relative_path))
            .into_iter()
            .collect();
        terms.extend(extract_inline_terms(text, &scope, relative_path));

        let formulas = extract_formulas(text, &scope, relative_path);

        ParsedDocument {
            terms,
            formulas,
            scope,
        }
    }

    /// Canonical term name for a document: its base name without the extension.
    pub fn term_name<'a>(&self, relative_path: &'a str) -> &'a str {
        term_name_from_path(relative_path, &self.extension)
    }

    fn file_term(
        &self,
        front_matter: &FrontMatter,
        body: &str,
        scope: &str,
        relative_path: &str,
    ) -> Option<Term> {
        let definition = extract_definition(body);
        if definition.text.is_empty() {
            return None;
        }

        let name = self.term_name(relative_path);
        let mut aliases = vec![name.to_string()];
        for alias in front_matter.aliases() {
            if !aliases.iter().any(|existing| existing == alias) {
                aliases.push(alias.to_string());
            }
        }

        Some(Term {
            term: name.to_string(),
            aliases,
            definition: definition.text,
            scope: scope.to_string(),
            file_path: relative_path.to_string(),
            definition_type: DefinitionType::File,
            has_more: definition.has_more,
        })
    }
}

/// Parse with the default `.md` extension.
pub fn parse_document(text: &str, relative_path: &str) -> ParsedDocument {
    WikiParser::default().parse(text, relative_path)
}

/// Strip `.{extension}` and keep the final `/`-separated segment.
pub fn term_name_from_path<'a>(relative_path: &'a str, extension: &str) -> &'a str {
    let stem = relative_path
        .strip_suffix(extension)
        .and_then(|rest| rest.strip_suffix('.'))
        .unwrap_or(relative_path);
    stem.rsplit('/').next().unwrap_or(stem)
}
