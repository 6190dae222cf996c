//! Definition body extraction for file-level terms.

use super::patterns;

/// Definition text taken from a document body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definition {
    pub text: String,
    /// The body continues past a `<!-- more -->` marker.
    pub has_more: bool,
}

/// Reduce a document body (front matter already removed) to its definition.
///
/// Lines are scanned until a standalone cut marker. Blank lines, headings,
/// horizontal rules and inline term declarations are skipped; the rest are
/// joined with newlines and trimmed.
pub fn extract_definition(body: &str) -> Definition {
    let mut kept = Vec::new();
    let mut has_more = false;

    for line in body.lines() {
        if patterns::more_marker().is_match(line) {
            has_more = true;
            break;
        }
        if is_skipped(line) {
            continue;
        }
        kept.push(line);
    }

    Definition {
        text: kept.join("\n").trim().to_string(),
        has_more,
    }
}

fn is_skipped(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || line.starts_with('#')
        || trimmed.starts_with("---")
        || patterns::inline_marker().is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_marker_truncates() {
        let def = extract_definition("Hello\n\n<!-- more -->\n\nWorld");
        assert_eq!(def.text, "Hello");
        assert!(def.has_more);
    }

    #[test]
    fn test_no_marker_keeps_everything() {
        let def = extract_definition("# Title\n\nFirst line\nSecond line\n\nThird\n");
        assert_eq!(def.text, "First line\nSecond line\nThird");
        assert!(!def.has_more);
    }

    #[test]
    fn test_skips_rules_and_inline_terms() {
        let body = "Intro\n---\n【护甲】：减伤数值\n***\nOutro";
        let def = extract_definition(body);
        assert_eq!(def.text, "Intro\n***\nOutro");
    }

    #[test]
    fn test_skips_marker_with_empty_definition() {
        let def = extract_definition("Intro\n【空】：\nMore");
        assert_eq!(def.text, "Intro\nMore");
    }

    #[test]
    fn test_indented_hash_is_not_a_heading() {
        let def = extract_definition("  # not a heading");
        assert_eq!(def.text, "# not a heading");
    }

    #[test]
    fn test_marker_case_insensitive() {
        let def = extract_definition("A\n<!-- MORE -->\nB");
        assert_eq!(def.text, "A");
        assert!(def.has_more);
    }

    #[test]
    fn test_marker_inline_with_text_is_not_a_cut() {
        let def = extract_definition("A <!-- more -->\nB");
        assert_eq!(def.text, "A <!-- more -->\nB");
        assert!(!def.has_more);
    }

    #[test]
    fn test_empty_body() {
        let def = extract_definition("\n\n# Only a heading\n");
        assert!(def.text.is_empty());
        assert!(!def.has_more);
    }

    #[test]
    fn test_crlf_body() {
        let def = extract_definition("Line one\r\nLine two\r\n");
        assert_eq!(def.text, "Line one\nLine two");
    }
}
