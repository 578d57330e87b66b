use crate::symbolic::symbolic_lambdify::DomainError;
use std::fmt;

/// Error types of the heating load evaluator
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluatorError {
    /// a guarded sub-expression of a formula is undefined for the given input
    /// (e.g. zero denominator); points to a data-range bug rather than a recoverable condition
    Domain { expression: String, detail: String },
    /// degenerate sampling parameters of a sweep or grid (count < 2, low >= high)
    InvalidRange { detail: String },
    /// malformed or missing features, unknown names, bad task document
    Configuration(String),
    /// failure while writing csv or png artefacts
    Io(String),
}

impl fmt::Display for EvaluatorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EvaluatorError::Domain { expression, detail } => {
                write!(f, "Domain error in {}: {}", expression, detail)
            }
            EvaluatorError::InvalidRange { detail } => write!(f, "Invalid range: {}", detail),
            EvaluatorError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            EvaluatorError::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}
//////////////////////////////////CONVERSIONS/////////////////////////////////
impl std::error::Error for EvaluatorError {}

impl From<DomainError> for EvaluatorError {
    fn from(err: DomainError) -> Self {
        EvaluatorError::Domain {
            expression: err.expression,
            detail: err.detail,
        }
    }
}

impl From<std::io::Error> for EvaluatorError {
    fn from(err: std::io::Error) -> Self {
        EvaluatorError::Io(err.to_string())
    }
}

impl From<csv::Error> for EvaluatorError {
    fn from(err: csv::Error) -> Self {
        EvaluatorError::Io(err.to_string())
    }
}

impl EvaluatorError {
    pub fn invalid_range(detail: impl Into<String>) -> Self {
        EvaluatorError::InvalidRange {
            detail: detail.into(),
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        EvaluatorError::Configuration(msg.into())
    }
}

pub type EvaluatorResult<T> = Result<T, EvaluatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = EvaluatorError::invalid_range("count must be at least 2, got 1");
        assert_eq!(err.to_string(), "Invalid range: count must be at least 2, got 1");
        let err = EvaluatorError::configuration("expected 8 features, got 7");
        assert_eq!(
            err.to_string(),
            "Configuration error: expected 8 features, got 7"
        );
    }

    #[test]
    fn test_from_domain_error() {
        let domain = DomainError {
            expression: "(0.84 / (x1 + 0.54))".to_string(),
            detail: "denominator is zero (numerator 0.84)".to_string(),
        };
        let err: EvaluatorError = domain.into();
        assert!(matches!(err, EvaluatorError::Domain { .. }));
        assert!(err.to_string().contains("denominator is zero"));
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: EvaluatorError = io.into();
        assert_eq!(err, EvaluatorError::Io("no such file".to_string()));
    }
}
