//! Error types for agrupar operations.
//!
//! Provides rich error context for library consumers.

use std::fmt;

/// Main error type for agrupar operations.
///
/// Covers the failure modes of the evaluation pipeline: schema mismatches
/// in the input table, empty inputs, dimension mismatches, and numerical
/// failures during fitting.
///
/// # Examples
///
/// ```
/// use agrupar::error::AgruparError;
///
/// let err = AgruparError::SchemaMismatch {
///     column: "heart_rate".to_string(),
/// };
/// assert!(err.to_string().contains("heart_rate"));
/// ```
#[derive(Debug)]
pub enum AgruparError {
    /// An expected column is missing from the input table.
    SchemaMismatch {
        /// Name of the missing column
        column: String,
    },

    /// A dataset or collection has zero rows.
    EmptyInput {
        /// What was empty
        context: String,
    },

    /// Matrix/vector dimensions don't match for the operation.
    DimensionMismatch {
        /// Expected dimensions description
        expected: String,
        /// Actual dimensions found
        actual: String,
    },

    /// Fitting failed to converge within the iteration limit.
    ConvergenceFailure {
        /// Number of iterations attempted
        iterations: usize,
        /// Final log-likelihood or loss value
        final_loss: f64,
    },

    /// Invalid hyperparameter value provided.
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Generic error with string message.
    Other(String),
}

impl fmt::Display for AgruparError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgruparError::SchemaMismatch { column } => {
                write!(f, "Schema mismatch: column '{column}' not found")
            }
            AgruparError::EmptyInput { context } => {
                write!(f, "Empty input: {context}")
            }
            AgruparError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {expected}, got {actual}")
            }
            AgruparError::ConvergenceFailure {
                iterations,
                final_loss,
            } => {
                write!(
                    f,
                    "Convergence failure after {iterations} iterations, loss = {final_loss}"
                )
            }
            AgruparError::InvalidHyperparameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "Invalid hyperparameter: {param} = {value}, expected {constraint}"
                )
            }
            AgruparError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AgruparError {}

impl From<&str> for AgruparError {
    fn from(msg: &str) -> Self {
        AgruparError::Other(msg.to_string())
    }
}

impl From<String> for AgruparError {
    fn from(msg: String) -> Self {
        AgruparError::Other(msg)
    }
}

impl AgruparError {
    /// Create a schema mismatch error for a missing column.
    #[must_use]
    pub fn missing_column(column: &str) -> Self {
        Self::SchemaMismatch {
            column: column.to_string(),
        }
    }

    /// Create an empty input error with context.
    #[must_use]
    pub fn empty_input(context: &str) -> Self {
        Self::EmptyInput {
            context: context.to_string(),
        }
    }
}

/// Convenience type alias for Results.
pub type Result<T> = std::result::Result<T, AgruparError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_display() {
        let err = AgruparError::missing_column("spo_base");
        let msg = err.to_string();
        assert!(msg.contains("Schema mismatch"));
        assert!(msg.contains("spo_base"));
    }

    #[test]
    fn test_empty_input_display() {
        let err = AgruparError::empty_input("training rows");
        let msg = err.to_string();
        assert!(msg.contains("Empty input"));
        assert!(msg.contains("training rows"));
    }

    #[test]
    fn test_dimension_mismatch_display() {
        let err = AgruparError::DimensionMismatch {
            expected: "200x5".to_string(),
            actual: "200x3".to_string(),
        };
        assert!(err.to_string().contains("200x5"));
        assert!(err.to_string().contains("200x3"));
    }

    #[test]
    fn test_convergence_failure_display() {
        let err = AgruparError::ConvergenceFailure {
            iterations: 100,
            final_loss: -4.2,
        };
        assert!(err.to_string().contains("Convergence failure"));
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_invalid_hyperparameter_display() {
        let err = AgruparError::InvalidHyperparameter {
            param: "n_components".to_string(),
            value: "0".to_string(),
            constraint: ">= 1".to_string(),
        };
        assert!(err.to_string().contains("n_components"));
        assert!(err.to_string().contains(">= 1"));
    }

    #[test]
    fn test_from_str() {
        let err: AgruparError = "test error".into();
        assert!(matches!(err, AgruparError::Other(_)));
        assert_eq!(err.to_string(), "test error");
    }

    #[test]
    fn test_from_string() {
        let err: AgruparError = "test error".to_string().into();
        assert!(matches!(err, AgruparError::Other(_)));
    }

    #[test]
    fn test_error_source_is_none() {
        use std::error::Error;
        let err = AgruparError::empty_input("x");
        assert!(err.source().is_none());
    }
}
