//! Facts extracted from wiki documents.

use serde::{Deserialize, Serialize};

/// Where a term's definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefinitionType {
    /// Derived from a document's front matter plus its body.
    File,
    /// Declared with a `【name】：definition` marker inside a document.
    Inline,
}

impl DefinitionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefinitionType::File => "file",
            DefinitionType::Inline => "inline",
        }
    }
}

/// A named concept with its lookup aliases and definition text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    /// Canonical name.
    pub term: String,

    /// Lookup keys. Always contains the canonical name first.
    pub aliases: Vec<String>,

    /// Plain-text definition, possibly cut short by a `<!-- more -->` marker.
    pub definition: String,

    /// Scope label of the source document (empty for global).
    pub scope: String,

    /// Source document path relative to the wiki root, `/`-separated.
    pub file_path: String,

    pub definition_type: DefinitionType,

    /// The source document continues past the cut marker.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_more: bool,
}

impl Term {
    /// Identity used for de-duplication: (source path, canonical name).
    pub fn identity(&self) -> (&str, &str) {
        (&self.file_path, &self.term)
    }

    pub fn is_inline(&self) -> bool {
        self.definition_type == DefinitionType::Inline
    }

    pub fn is_global(&self) -> bool {
        self.scope.is_empty()
    }
}

/// An expression mixing calculated (`[x]`) and design (`<y>`) values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Formula {
    /// Trimmed expression between the `%%` markers.
    pub expression: String,

    /// Square-bracket tokens, computed by the system.
    pub calculated_values: Vec<String>,

    /// Angle-bracket tokens, tuned by a designer.
    pub design_values: Vec<String>,

    pub scope: String,

    pub file_path: String,
}

/// Everything extracted from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub terms: Vec<Term>,
    pub formulas: Vec<Formula>,
    /// Scope declared in front matter, empty when absent.
    pub scope: String,
}

impl ParsedDocument {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.formulas.is_empty()
    }

    /// The file-level term, if the document produced one.
    pub fn file_term(&self) -> Option<&Term> {
        self.terms
            .iter()
            .find(|t| t.definition_type == DefinitionType::File)
    }

    pub fn inline_terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.iter().filter(|t| t.is_inline())
    }
}
