//! Inline term declarations: `【name】：definition`.

use super::patterns;
use super::types::{DefinitionType, Term};

/// Extract every inline term in `text`, front matter included.
///
/// Each term's only alias is its own name. Declarations whose definition is
/// blank are not terms.
pub fn extract_inline_terms(text: &str, scope: &str, file_path: &str) -> Vec<Term> {
    patterns::inline_term()
        .captures_iter(text)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let definition = caps.get(2)?.as_str().trim();
            if definition.is_empty() {
                return None;
            }
            Some(Term {
                term: name.to_string(),
                aliases: vec![name.to_string()],
                definition: definition.to_string(),
                scope: scope.to_string(),
                file_path: file_path.to_string(),
                definition_type: DefinitionType::Inline,
                has_more: false,
            })
        })
        .collect()
}
