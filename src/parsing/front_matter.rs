//! Front matter: a `---` delimited `key: value` block at the top of a document.

use std::collections::HashMap;

const DELIMITER: &str = "---";

/// Parsed front matter fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: HashMap<String, String>,
}

impl FrontMatter {
    /// Parse `key: value` lines. Lines without a colon are ignored,
    /// and a repeated key keeps its last value.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let fields = lines
            .into_iter()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The `scope` field, empty when absent.
    pub fn scope(&self) -> &str {
        self.get("scope").unwrap_or_default()
    }

    /// Entries of the comma-separated `alias` field, trimmed, empties dropped.
    pub fn aliases(&self) -> Vec<&str> {
        self.get("alias")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|alias| !alias.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Split a document into its front matter and the body that follows it.
///
/// The block must open on the very first line with a line that is exactly `---`
/// and close with another such line. An unclosed block is not front matter and
/// the whole text is returned as the body.
pub fn split_front_matter(text: &str) -> (Option<FrontMatter>, &str) {
    let mut lines = text.split_inclusive('\n');

    match lines.next() {
        Some(first) if strip_line_ending(first) == DELIMITER => {
            let mut offset = first.len();
            let mut block = Vec::new();

            for line in lines {
                offset += line.len();
                let content = strip_line_ending(line);
                if content == DELIMITER {
                    return (Some(FrontMatter::from_lines(block)), &text[offset..]);
                }
                block.push(content);
            }

            (None, text)
        }
        _ => (None, text),
    }
}

fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_basic() {
        let text = "---\nscope: combat\nalias: foo, bar\n---\nBody text\n";
        let (fm, body) = split_front_matter(text);
        let fm = fm.unwrap();
        assert_eq!(fm.scope(), "combat");
        assert_eq!(fm.aliases(), vec!["foo", "bar"]);
        assert_eq!(body, "Body text\n");
    }

    #[test]
    fn test_value_keeps_text_after_first_colon() {
        let (fm, _) = split_front_matter("---\nurl: http://example.com\n---\n");
        assert_eq!(fm.unwrap().get("url"), Some("http://example.com"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let (fm, body) = split_front_matter("---\r\nscope: ui\r\n---\r\nHello\r\n");
        assert_eq!(fm.unwrap().scope(), "ui");
        assert_eq!(body, "Hello\r\n");
    }

    #[test]
    fn test_must_start_at_first_line() {
        let (fm, body) = split_front_matter("\n---\nscope: x\n---\n");
        assert!(fm.is_none());
        assert_eq!(body, "\n---\nscope: x\n---\n");
    }

    #[test]
    fn test_unclosed_block_is_body() {
        let text = "---\nscope: x\nno closing line";
        let (fm, body) = split_front_matter(text);
        assert!(fm.is_none());
        assert_eq!(body, text);
    }

    #[test]
    fn test_delimiter_must_be_exact() {
        let (fm, _) = split_front_matter("----\nscope: x\n----\n");
        assert!(fm.is_none());
    }

    #[test]
    fn test_empty_block() {
        let (fm, body) = split_front_matter("---\n---\nBody");
        let fm = fm.unwrap();
        assert!(fm.is_empty());
        assert_eq!(fm.scope(), "");
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_lines_without_colon_ignored() {
        let (fm, _) = split_front_matter("---\njust words\nscope: a\n---\n");
        let fm = fm.unwrap();
        assert_eq!(fm.len(), 1);
        assert_eq!(fm.scope(), "a");
    }

    #[test]
    fn test_aliases_skip_empty_entries() {
        let fm = FrontMatter::from_lines(["alias: , a,,  b ,"]);
        assert_eq!(fm.aliases(), vec!["a", "b"]);
    }
}
