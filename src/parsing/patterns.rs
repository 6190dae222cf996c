//! Compiled patterns for the wiki syntax.
//!
//! Each pattern family is compiled once on first use.

use regex::Regex;
use std::sync::OnceLock;

static INLINE_TERM: OnceLock<Regex> = OnceLock::new();
static INLINE_MARKER: OnceLock<Regex> = OnceLock::new();
static FORMULA: OnceLock<Regex> = OnceLock::new();
static CALCULATED_VALUE: OnceLock<Regex> = OnceLock::new();
static DESIGN_VALUE: OnceLock<Regex> = OnceLock::new();
static MORE_MARKER: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("built-in wiki pattern must compile"))
}

/// `【name】：definition` or `【name】:definition`, definition running to end of line.
pub fn inline_term() -> &'static Regex {
    compiled(&INLINE_TERM, r"【([^】【\n]+)】[：:][^\S\n]*([^\n]+)")
}

/// `【name】：` with or without a definition after it.
pub fn inline_marker() -> &'static Regex {
    compiled(&INLINE_MARKER, r"【[^】【\n]+】[：:]")
}

/// `%% expression %%`.
pub fn formula() -> &'static Regex {
    compiled(&FORMULA, r"%%\s*(.+?)\s*%%")
}

/// `[calculated value]`.
pub fn calculated_value() -> &'static Regex {
    compiled(&CALCULATED_VALUE, r"\[([^\]]+)\]")
}

/// `<design value>`.
pub fn design_value() -> &'static Regex {
    compiled(&DESIGN_VALUE, r"<([^>]+)>")
}

/// A line holding only `<!-- more -->`, any case, any surrounding whitespace.
pub fn more_marker() -> &'static Regex {
    compiled(&MORE_MARKER, r"(?i)^\s*<!--\s*more\s*-->\s*$")
}
