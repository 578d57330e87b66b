//! a module turns a String expression into a symbolic expression
//!# Example
//! ```
//! use RustedHeatLoad::symbolic::symbolic_engine::Expr;
//! let parsed_expression = Expr::parse_expression("3.090366*sqrt(1 - 0.104708072692815*x6^4)").unwrap();
//! let f = parsed_expression.lambdify_guarded(&["x6"]).unwrap();
//! assert!((f(&[0.2]).unwrap() - 3.0901).abs() < 1e-3);
//! ```
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{brackets_are_balanced, find_pair_to_this_bracket};
//                  search recursion diagram
//        "x2 + 28.24*(x0*x3 - 2.37)^2 + 0.84/(x1 + 0.54)"
//                |       left         | right          |
//                |_____________________________________|
//                |     split by rightmost + or -       |
//                |_____________________________________|
//                | x2 + 28.24*(...)^2 |0.84/(x1 + 0.54)|
//                |        |           |        |       |
//                |_______\|/__________|_______\|/______|
//                |   split by +       | split by /     |
//                |____________________|________________|
//                |  x2  | 28.24*(..)^2| 0.84 |(x1+0.54)|
//                |  Ok  | split by *  |  Ok  | brackets|
//                  etc...
// Precedence, from the loosest: binary + -, unary -, * /, ^ (right associative),
// function calls and brackets, numbers and variables.

const FUNCTIONS: [&str; 4] = ["sqrt", "exp", "ln", "log"];

/// true if the operator at `pos` is a binary one: it has an operand on its left and is not
/// the sign of an exponent in scientific notation like 1e-5
fn is_binary_sign(input: &str, pos: usize) -> bool {
    let before = input[..pos].trim_end();
    let Some(prev) = before.chars().last() else {
        return false;
    };
    if matches!(prev, '+' | '-' | '*' | '/' | '^' | '(') {
        return false;
    }
    if matches!(prev, 'e' | 'E') {
        let head = &before[..before.len() - 1];
        let start = head
            .rfind(|c: char| matches!(c, '+' | '-' | '*' | '/' | '^' | '(' | ' '))
            .map_or(0, |i| i + 1);
        let mantissa = &head[start..];
        // a bare `e` is a variable, not an exponent marker
        let is_number = mantissa.starts_with(|c: char| c.is_ascii_digit())
            && mantissa.chars().all(|c| c.is_ascii_digit() || c == '.');
        if is_number {
            return false;
        }
    }
    true
}

/// function to find the rightmost occurrence of operators at the same precedence level,
/// outside of any brackets
fn find_rightmost_operator_outside_brackets(
    input: &str,
    operators: &[char],
    binary_only: bool,
) -> Option<(usize, char)> {
    let mut bracket_depth = 0;
    let mut last_op = None;

    for (i, c) in input.char_indices() {
        match c {
            '(' => bracket_depth += 1,
            ')' => bracket_depth -= 1,
            _ if bracket_depth == 0 && operators.contains(&c) => {
                if !binary_only || is_binary_sign(input, i) {
                    last_op = Some((i, c));
                }
            }
            _ => {}
        }
    }
    last_op
}

/// leftmost '^' outside brackets: power is right associative, x^2^3 = x^(2^3)
fn find_leftmost_power_outside_brackets(input: &str) -> Option<usize> {
    let mut bracket_depth = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => bracket_depth += 1,
            ')' => bracket_depth -= 1,
            '^' if bracket_depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

fn is_identifier(input: &str) -> bool {
    let mut chars = input.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn parse_function_call(name: &str, argument: Expr) -> Result<Expr, String> {
    match name {
        "sqrt" => Ok(Expr::Sqrt(argument.boxed())),
        "exp" => Ok(Expr::Exp(argument.boxed())),
        "ln" | "log" => Ok(Expr::Ln(argument.boxed())),
        _ => Err(format!(
            "unknown function '{}', expected one of {:?}",
            name, FUNCTIONS
        )),
    }
}

pub fn parse_expression_func(input: &str) -> Result<Expr, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty expression".to_string());
    }

    // whole expression in brackets
    if input.starts_with('(') {
        if let Some(end) = find_pair_to_this_bracket(input, 0) {
            if end == input.len() - 1 {
                return parse_expression_func(&input[1..end]);
            }
        }
    }

    // addition and subtraction
    if let Some((pos, op)) = find_rightmost_operator_outside_brackets(input, &['+', '-'], true) {
        let left = parse_expression_func(&input[..pos])?;
        let right = parse_expression_func(&input[pos + 1..])?;
        return Ok(match op {
            '+' => Expr::Add(left.boxed(), right.boxed()),
            _ => Expr::Sub(left.boxed(), right.boxed()),
        });
    }

    // unary signs
    if let Some(rest) = input.strip_prefix('-') {
        let inner = parse_expression_func(rest)?;
        return Ok(match inner {
            Expr::Const(val) => Expr::Const(-val),
            other => -other,
        });
    }
    if let Some(rest) = input.strip_prefix('+') {
        return parse_expression_func(rest);
    }

    // multiplication and division
    if let Some((pos, op)) = find_rightmost_operator_outside_brackets(input, &['*', '/'], false) {
        let left = parse_expression_func(&input[..pos])?;
        let right = parse_expression_func(&input[pos + 1..])?;
        return Ok(match op {
            '*' => Expr::Mul(left.boxed(), right.boxed()),
            _ => Expr::Div(left.boxed(), right.boxed()),
        });
    }

    // power
    if let Some(pos) = find_leftmost_power_outside_brackets(input) {
        let base = parse_expression_func(&input[..pos])?;
        let exponent = parse_expression_func(&input[pos + 1..])?;
        return Ok(Expr::Pow(base.boxed(), exponent.boxed()));
    }

    // function call: name(...)
    if input.ends_with(')') {
        if let Some(open) = input.find('(') {
            let name = input[..open].trim();
            if find_pair_to_this_bracket(input, open) == Some(input.len() - 1) && is_identifier(name) {
                let argument = parse_expression_func(&input[open + 1..input.len() - 1])?;
                return parse_function_call(name, argument);
            }
        }
    }

    // identifiers first: "inf" and "nan" are variable names here, not floats
    if is_identifier(input) {
        return Ok(Expr::Var(input.to_string()));
    }
    if let Ok(val) = input.parse::<f64>() {
        return Ok(Expr::Const(val));
    }
    Err(format!("cannot parse '{}'", input))
}

impl Expr {
    /// Parses a string like "3.3015666 - 0.30122823*x6^4" into a symbolic expression.
    pub fn parse_expression(input: &str) -> Result<Expr, String> {
        if !brackets_are_balanced(input) {
            return Err(format!("unbalanced brackets in '{}'", input));
        }
        parse_expression_func(input)
    }

    /// parses a vector of string expressions
    pub fn parse_vector_expression(inputs: Vec<&str>) -> Result<Vec<Expr>, String> {
        inputs.into_iter().map(Expr::parse_expression).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    #[test]
    fn test_parse_constants_and_variables() {
        assert_eq!(Expr::parse_expression("3.5").unwrap(), Expr::Const(3.5));
        assert_eq!(Expr::parse_expression(" x6 ").unwrap(), var("x6"));
        assert_eq!(Expr::parse_expression("-2").unwrap(), Expr::Const(-2.0));
        assert_eq!(Expr::parse_expression("1e-5").unwrap(), Expr::Const(1e-5));
    }

    #[test]
    fn test_left_associativity() {
        let parsed = Expr::parse_expression("a - b - c").unwrap();
        let expected = (var("a") - var("b")) - var("c");
        assert_eq!(parsed, expected);
        let parsed = Expr::parse_expression("a / b * c").unwrap();
        let expected = (var("a") / var("b")) * var("c");
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_variable_named_e_is_not_an_exponent() {
        let parsed = Expr::parse_expression("2*e - 1").unwrap();
        assert_eq!(parsed, Expr::Const(2.0) * var("e") - Expr::Const(1.0));
        let f = parsed.lambdify_guarded(&["e"]).unwrap();
        assert_eq!(f(&[3.0]).unwrap(), 5.0);

        let parsed = Expr::parse_expression("a - e - 1").unwrap();
        assert_eq!(parsed, (var("a") - var("e")) - Expr::Const(1.0));
        let f = parsed.lambdify_guarded(&["a", "e"]).unwrap();
        assert_eq!(f(&[10.0, 3.0]).unwrap(), 6.0);

        // digits still make a scientific literal
        let parsed = Expr::parse_expression("x - 2.5e-3").unwrap();
        assert_eq!(parsed, var("x") - Expr::Const(2.5e-3));
    }

    #[test]
    fn test_power_precedence() {
        let parsed = Expr::parse_expression("0.30122823*x6^4").unwrap();
        let expected = Expr::Const(0.30122823) * var("x6").pow(Expr::Const(4.0));
        assert_eq!(parsed, expected);
        let parsed = Expr::parse_expression("x^2^3").unwrap();
        let expected = var("x").pow(Expr::Const(2.0).pow(Expr::Const(3.0)));
        assert_eq!(parsed, expected);
        // unary minus binds looser than power
        let parsed = Expr::parse_expression("-x^2").unwrap();
        assert_eq!(parsed, -(var("x").pow(Expr::Const(2.0))));
    }

    #[test]
    fn test_brackets_and_functions() {
        let parsed = Expr::parse_expression("3.090366*sqrt(1 - 0.104708072692815*x6^4)").unwrap();
        let expected = Expr::Const(3.090366)
            * (Expr::Const(1.0)
                - Expr::Const(0.104708072692815) * var("x6").pow(Expr::Const(4.0)))
            .sqrt();
        assert_eq!(parsed, expected);
        let parsed = Expr::parse_expression("0.84/(x1 + 0.54)").unwrap();
        assert_eq!(parsed, Expr::Const(0.84) / (var("x1") + Expr::Const(0.54)));
        let parsed = Expr::parse_expression("log(x)+exp((y))").unwrap();
        assert_eq!(parsed, var("x").ln() + var("y").exp());
    }

    #[test]
    fn test_sign_after_operator() {
        let parsed = Expr::parse_expression("a*-b").unwrap();
        assert_eq!(parsed, var("a") * -var("b"));
        let parsed = Expr::parse_expression("x^-1").unwrap();
        assert_eq!(parsed, var("x").pow(Expr::Const(-1.0)));
    }

    #[test]
    fn test_parse_errors() {
        assert!(Expr::parse_expression("").is_err());
        assert!(Expr::parse_expression("(x + 1").is_err());
        assert!(Expr::parse_expression("x + )1(").is_err());
        assert!(Expr::parse_expression("tan(x)").is_err());
        assert!(Expr::parse_expression("x +").is_err());
        assert!(Expr::parse_expression("2 x").is_err());
    }

    #[test]
    fn test_parse_vector_expression() {
        let parsed = Expr::parse_vector_expression(vec!["x", "2*y"]).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(Expr::parse_vector_expression(vec!["x", "2*"]).is_err());
    }
}
