use crate::symbolic::symbolic_engine::Expr;
use std::fmt;

/// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions
///
/// Formulas coming from symbolic regression are only trusted on the data range they were
/// fitted on, so every function produced here is *guarded*:
/// - the argument of a square root (and the base of a fractional power) is floored at zero;
/// - a division by exactly zero, a logarithm of a non-positive number and any non-finite
///   intermediate result give a `DomainError` instead of NaN/inf.

/// Error produced when a guarded sub-expression cannot be made well-defined.
#[derive(Debug, Clone, PartialEq)]
pub struct DomainError {
    /// the sub-expression that failed, in Display form
    pub expression: String,
    pub detail: String,
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "domain error in {}: {}", self.expression, self.detail)
    }
}

impl std::error::Error for DomainError {}

/// compiled guarded function of a slice of arguments
pub type GuardedFn = Box<dyn Fn(&[f64]) -> Result<f64, DomainError> + Send + Sync>;

fn domain_error(node: &str, detail: String) -> DomainError {
    DomainError {
        expression: node.to_string(),
        detail,
    }
}

fn finite(value: f64, node: &str) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(domain_error(node, format!("non-finite result {}", value)))
    }
}

fn guarded_div(num: f64, den: f64, node: &str) -> Result<f64, DomainError> {
    if den == 0.0 {
        return Err(domain_error(node, format!("denominator is zero (numerator {})", num)));
    }
    finite(num / den, node)
}

fn guarded_sqrt(radicand: f64, node: &str) -> Result<f64, DomainError> {
    if radicand.is_nan() {
        return Err(domain_error(node, "radicand is NaN".to_string()));
    }
    finite(radicand.max(0.0).sqrt(), node)
}

fn guarded_pow(base: f64, exponent: f64, node: &str) -> Result<f64, DomainError> {
    // x^4 and friends: exact integer power, sign of the base kept
    if exponent.fract() == 0.0 && (0.0..=i32::MAX as f64).contains(&exponent) {
        return finite(base.powi(exponent as i32), node);
    }
    let base = if exponent.fract() != 0.0 { base.max(0.0) } else { base };
    if base == 0.0 && exponent < 0.0 {
        return Err(domain_error(
            node,
            format!("zero raised to negative power {}", exponent),
        ));
    }
    finite(base.powf(exponent), node)
}

fn guarded_ln(arg: f64, node: &str) -> Result<f64, DomainError> {
    if arg <= 0.0 {
        return Err(domain_error(node, format!("logarithm of non-positive value {}", arg)));
    }
    finite(arg.ln(), node)
}

impl Expr {
    /// Converts the expression into an executable, domain-guarded closure.
    ///
    /// `vars` fixes the order of the arguments: the closure is called with a slice whose
    /// i-th element is the value of `vars[i]`. Fails if the expression uses a variable
    /// that is not listed in `vars`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("0.84/(x1 + 0.54)")?.lambdify_guarded(&["x1"])?;
    /// assert!(f(&[-0.54]).is_err());
    /// ```
    pub fn lambdify_guarded(&self, vars: &[&str]) -> Result<GuardedFn, String> {
        let compiled: GuardedFn = match self {
            Expr::Var(name) => {
                let index = vars
                    .iter()
                    .position(|&x| x == name.as_str())
                    .ok_or_else(|| format!("variable '{}' not found among {:?}", name, vars))?;
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> { Ok(args[index]) })
            }
            Expr::Const(val) => {
                let val = *val;
                Box::new(move |_: &[f64]| -> Result<f64, DomainError> { Ok(val) })
            }
            Expr::Add(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_guarded(vars)?;
                let rhs_fn = rhs.lambdify_guarded(vars)?;
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> {
                    Ok(lhs_fn(args)? + rhs_fn(args)?)
                })
            }
            Expr::Sub(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_guarded(vars)?;
                let rhs_fn = rhs.lambdify_guarded(vars)?;
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> {
                    Ok(lhs_fn(args)? - rhs_fn(args)?)
                })
            }
            Expr::Mul(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_guarded(vars)?;
                let rhs_fn = rhs.lambdify_guarded(vars)?;
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> {
                    Ok(lhs_fn(args)? * rhs_fn(args)?)
                })
            }
            Expr::Div(lhs, rhs) => {
                let lhs_fn = lhs.lambdify_guarded(vars)?;
                let rhs_fn = rhs.lambdify_guarded(vars)?;
                let node = self.to_string();
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> {
                    guarded_div(lhs_fn(args)?, rhs_fn(args)?, &node)
                })
            }
            Expr::Pow(base, exp) => {
                let base_fn = base.lambdify_guarded(vars)?;
                let exp_fn = exp.lambdify_guarded(vars)?;
                let node = self.to_string();
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> {
                    guarded_pow(base_fn(args)?, exp_fn(args)?, &node)
                })
            }
            Expr::Sqrt(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                let node = self.to_string();
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> {
                    guarded_sqrt(expr_fn(args)?, &node)
                })
            }
            Expr::Exp(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                let node = self.to_string();
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> {
                    finite(expr_fn(args)?.exp(), &node)
                })
            }
            Expr::Ln(expr) => {
                let expr_fn = expr.lambdify_guarded(vars)?;
                let node = self.to_string();
                Box::new(move |args: &[f64]| -> Result<f64, DomainError> {
                    guarded_ln(expr_fn(args)?, &node)
                })
            }
        };
        Ok(compiled)
    } // end of lambdify_guarded

    /// single-variable version of `lambdify_guarded`, the variable is found inside the expression
    pub fn lambdify1D_guarded(&self) -> Result<Box<dyn Fn(f64) -> Result<f64, DomainError> + Send + Sync>, String> {
        let vars = self.all_arguments_are_variables();
        if vars.len() > 1 {
            return Err(format!(
                "lambdify1D_guarded can only be used with expressions containing at most one variable, found: {:?}",
                vars
            ));
        }
        let var_refs: Vec<&str> = vars.iter().map(|s| s.as_str()).collect();
        let compiled_func = self.lambdify_guarded(&var_refs)?;
        Ok(Box::new(move |x: f64| compiled_func(&[x])))
    }

    /// Interpreted evaluation with the same guards as `lambdify_guarded`; no closure tree is built.
    pub fn eval_guarded(&self, vars: &[&str], args: &[f64]) -> Result<f64, DomainError> {
        match self {
            Expr::Var(name) => match vars.iter().position(|&x| x == name.as_str()) {
                Some(index) if index < args.len() => Ok(args[index]),
                _ => Err(domain_error(name, "unbound variable".to_string())),
            },
            Expr::Const(val) => Ok(*val),
            Expr::Add(lhs, rhs) => Ok(lhs.eval_guarded(vars, args)? + rhs.eval_guarded(vars, args)?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval_guarded(vars, args)? - rhs.eval_guarded(vars, args)?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval_guarded(vars, args)? * rhs.eval_guarded(vars, args)?),
            Expr::Div(lhs, rhs) => guarded_div(
                lhs.eval_guarded(vars, args)?,
                rhs.eval_guarded(vars, args)?,
                &self.to_string(),
            ),
            Expr::Pow(base, exp) => guarded_pow(
                base.eval_guarded(vars, args)?,
                exp.eval_guarded(vars, args)?,
                &self.to_string(),
            ),
            Expr::Sqrt(expr) => guarded_sqrt(expr.eval_guarded(vars, args)?, &self.to_string()),
            Expr::Exp(expr) => finite(expr.eval_guarded(vars, args)?.exp(), &self.to_string()),
            Expr::Ln(expr) => guarded_ln(expr.eval_guarded(vars, args)?, &self.to_string()),
        }
    }
}
