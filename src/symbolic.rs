#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedHeatLoad::symbolic::symbolic_engine::Expr;
/// let input = "3.3015666 - 0.30122823*x6^4";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// assert_eq!(parsed_expression.all_arguments_are_variables(), vec!["x6".to_string()]);
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// a module
/// 1) holds a symbolic expression as a tree
/// 2) substitutes, renames and lists variables
/// 3) turns a symbolic expression into a string expression for printing and control results
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
///________________________________________________________________________________________________________________________________________________
///
/// turns a symbolic expression into a domain-guarded Rust function
/// Example#
/// ```
/// use RustedHeatLoad::symbolic::symbolic_engine::Expr;
/// let expr = Expr::parse_expression("0.84/(x1 + 0.54)").unwrap();
/// let f = expr.lambdify_guarded(&["x1"]).unwrap();
/// // zero denominator is reported, not turned into inf
/// assert!(f(&[-0.54]).is_err());
/// assert!((f(&[0.46]).unwrap() - 0.84).abs() < 1e-12);
/// ```
pub mod symbolic_lambdify;
///______________________________________________________________________________________________________________________________________________
/// the collection of utility functions for bracket parsing and proceeding
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
