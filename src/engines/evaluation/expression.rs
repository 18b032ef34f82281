use crate::error::{EquigenError, Result};
use std::collections::HashMap;

/// A parsed equation: the left-hand expression template, the single free
/// variable it contains, and the numeric target on the right-hand side.
///
/// The raw form is `<expression> = <target>`, with the free variable written
/// as a bracketed placeholder, e.g. `50 * ((3 * [x]) - 2) + [x] / 3 = 200`.
#[derive(Debug, Clone, PartialEq)]
pub struct Equation {
    pub expression: String,
    pub variable: String,
    pub target: f64,
}

impl Equation {
    pub fn parse(raw: &str) -> Result<Equation> {
        let sides: Vec<&str> = raw.split('=').collect();
        if sides.len() != 2 {
            return Err(EquigenError::InvalidEquation(format!(
                "expected exactly one '=' in {:?}",
                raw.trim()
            )));
        }

        let target: f64 = sides[1].trim().parse().map_err(|_| {
            EquigenError::InvalidEquation(format!(
                "right-hand side {:?} is not a number",
                sides[1].trim()
            ))
        })?;

        let expression = sides[0].trim().to_string();
        let variable = extract_variable(&expression)?;

        Ok(Equation {
            expression,
            variable,
            target,
        })
    }
}

/// Finds the single `[name]` placeholder in an expression template.
fn extract_variable(expression: &str) -> Result<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = expression;

    while let Some(start) = rest.find('[') {
        let after = &rest[start + 1..];
        let end = after.find(']').ok_or_else(|| {
            EquigenError::InvalidEquation(format!("unclosed '[' in {:?}", expression))
        })?;

        let name = after[..end].trim();
        if name.is_empty() {
            return Err(EquigenError::InvalidEquation(format!(
                "empty variable placeholder in {:?}",
                expression
            )));
        }
        if !names.iter().any(|known| known == name) {
            names.push(name.to_string());
        }

        rest = &after[end + 1..];
    }

    let mut names = names.into_iter();
    match (names.next(), names.next()) {
        (Some(name), None) => Ok(name),
        (None, _) => Err(EquigenError::InvalidEquation(format!(
            "no [variable] placeholder in {:?}",
            expression
        ))),
        (Some(first), Some(second)) => Err(EquigenError::InvalidEquation(format!(
            "only one variable is supported, found [{}] and [{}]",
            first, second
        ))),
    }
}

/// Narrow seam to the arithmetic-expression engine.
///
/// Implementations take an expression template with bracketed variable
/// placeholders and a set of variable bindings, and either produce a finite
/// numeric result or fail. Failures are per-call; callers decide whether a
/// failure is fatal.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, expression: &str, bindings: &HashMap<String, f64>) -> Result<f64>;
}

/// Production evaluator backed by the `meval` crate.
#[derive(Debug, Default)]
pub struct MevalEvaluator;

impl ExpressionEvaluator for MevalEvaluator {
    fn evaluate(&self, expression: &str, bindings: &HashMap<String, f64>) -> Result<f64> {
        // Accept the Unicode operators users paste from formatted text.
        let mut text = expression
            .replace('−', "-")
            .replace('×', "*")
            .replace('÷', "/");

        for name in bindings.keys() {
            text = text.replace(&format!("[{}]", name), name);
        }

        let expr: meval::Expr = text.parse()?;

        let mut context = meval::Context::new();
        for (name, value) in bindings {
            context.var(name.clone(), *value);
        }

        let value = expr.eval_with_context(context)?;
        if !value.is_finite() {
            return Err(EquigenError::Evaluation(format!(
                "expression produced a non-finite value ({}) for {:?}",
                value, expression
            )));
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_equation() {
        let equation = Equation::parse("2 * [x] = 10").unwrap();
        assert_eq!(equation.expression, "2 * [x]");
        assert_eq!(equation.variable, "x");
        assert_eq!(equation.target, 10.0);
    }

    #[test]
    fn test_parse_repeated_placeholder() {
        let equation = Equation::parse("50 * ((3 * [x]) - 2) + [x] / 3 = 200").unwrap();
        assert_eq!(equation.variable, "x");
        assert_eq!(equation.target, 200.0);
    }

    #[test]
    fn test_parse_rejects_missing_equals() {
        assert!(Equation::parse("2 * [x]").is_err());
    }

    #[test]
    fn test_parse_rejects_extra_equals() {
        assert!(Equation::parse("2 * [x] = 10 = 4").is_err());
    }

    #[test]
    fn test_parse_rejects_non_numeric_target() {
        assert!(Equation::parse("2 * [x] = ten").is_err());
    }

    #[test]
    fn test_parse_rejects_missing_placeholder() {
        assert!(Equation::parse("2 * 3 = 6").is_err());
    }

    #[test]
    fn test_parse_rejects_two_variables() {
        assert!(Equation::parse("[x] + [y] = 6").is_err());
    }

    #[test]
    fn test_evaluate_with_binding() {
        let evaluator = MevalEvaluator;
        let mut bindings = HashMap::new();
        bindings.insert("x".to_string(), 5.0);

        let value = evaluator.evaluate("2 * [x]", &bindings).unwrap();
        assert_eq!(value, 10.0);
    }

    #[test]
    fn test_evaluate_unicode_operators() {
        let evaluator = MevalEvaluator;
        let mut bindings = HashMap::new();
        bindings.insert("x".to_string(), 4.0);

        let value = evaluator.evaluate("(3 × [x] − 2) ÷ 2", &bindings).unwrap();
        assert_eq!(value, 5.0);
    }

    #[test]
    fn test_evaluate_division_by_zero_fails() {
        let evaluator = MevalEvaluator;
        let mut bindings = HashMap::new();
        bindings.insert("x".to_string(), 5.0);

        let result = evaluator.evaluate("10 / ([x] - 5)", &bindings);
        assert!(result.is_err());
    }

    #[test]
    fn test_evaluate_malformed_expression_fails() {
        let evaluator = MevalEvaluator;
        let bindings = HashMap::new();

        assert!(evaluator.evaluate("2 *** )", &bindings).is_err());
    }
}
