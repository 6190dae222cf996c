//! Design formulas: `%% [calculated] = <design> * 2 %%`.

use regex::Regex;

use super::patterns;
use super::types::Formula;

/// Extract every formula in `text`.
///
/// Candidates with neither calculated nor design values are dropped.
pub fn extract_formulas(text: &str, scope: &str, file_path: &str) -> Vec<Formula> {
    patterns::formula()
        .captures_iter(text)
        .filter_map(|caps| {
            let expression = caps.get(1)?.as_str().trim();
            let calculated_values = tokens(patterns::calculated_value(), expression);
            let design_values = tokens(patterns::design_value(), expression);

            if calculated_values.is_empty() && design_values.is_empty() {
                return None;
            }

            Some(Formula {
                expression: expression.to_string(),
                calculated_values,
                design_values,
                scope: scope.to_string(),
                file_path: file_path.to_string(),
            })
        })
        .collect()
}

fn tokens(pattern: &Regex, expression: &str) -> Vec<String> {
    pattern
        .captures_iter(expression)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_formula() {
        let formulas = extract_formulas("%% [dmg] = <atk> * 2 %%", "", "dmg.md");
        assert_eq!(formulas.len(), 1);
        assert_eq!(formulas[0].expression, "[dmg] = <atk> * 2");
        assert_eq!(formulas[0].calculated_values, vec!["dmg"]);
        assert_eq!(formulas[0].design_values, vec!["atk"]);
    }

    #[test]
    fn test_multiple_tokens_keep_order() {
        let formulas = extract_formulas(
            "%%[最终伤害] = ([基础伤害] + <加成>) * <系数>%%",
            "combat",
            "f.md",
        );
        assert_eq!(formulas[0].calculated_values, vec!["最终伤害", "基础伤害"]);
        assert_eq!(formulas[0].design_values, vec!["加成", "系数"]);
        assert_eq!(formulas[0].scope, "combat");
    }

    #[test]
    fn test_plain_expression_discarded() {
        assert!(extract_formulas("%% 1 + 1 %%", "", "f.md").is_empty());
    }

    #[test]
    fn test_design_only_formula_kept() {
        let formulas = extract_formulas("%% <tick> * 2 %%", "", "f.md");
        assert_eq!(formulas.len(), 1);
        assert!(formulas[0].calculated_values.is_empty());
    }

    #[test]
    fn test_unterminated_marker() {
        assert!(extract_formulas("%% [a] = <b>", "", "f.md").is_empty());
    }
}
