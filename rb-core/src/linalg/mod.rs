//! Minimal linear algebra used by the rigid-body integrator.
//!
//! Every type here is a value type: arithmetic returns a new value and never
//! aliases its operands. Operations that depend on operand shape (sizes,
//! conformant dimensions) return `Result` instead of panicking.
//!
//! - `Vector`: real tuple of runtime size (2, 3 or 4 in practice)
//! - `Matrix`: dense row-major grid with conformance-checked products
//! - `Quaternion`: `[w, x, y, z]` orientation built on the vector operations

pub mod matrix;
pub mod quaternion;
pub mod vector;

pub use matrix::Matrix;
pub use quaternion::Quaternion;
pub use vector::Vector;

use thiserror::Error;

/// Errors raised by vector, matrix and quaternion operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MathError {
    /// Out-of-range index, dimension mismatch or wrongly shaped operand.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the operand.
        reason: String,
    },

    /// Division by a scalar that is not strictly positive.
    #[error("division by non-positive scalar {divisor}")]
    DivideByZero {
        /// The rejected divisor.
        divisor: f64,
    },
}

impl MathError {
    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Check if this is an invalid argument error.
    #[must_use]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// Check if this is a divide-by-zero error.
    #[must_use]
    pub fn is_divide_by_zero(&self) -> bool {
        matches!(self, Self::DivideByZero { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MathError::invalid("size 2 vs 3");
        assert!(err.to_string().contains("size 2 vs 3"));

        let err = MathError::DivideByZero { divisor: -1.5 };
        assert!(err.to_string().contains("-1.5"));
    }

    #[test]
    fn test_error_predicates() {
        assert!(MathError::invalid("x").is_invalid_argument());
        assert!(!MathError::invalid("x").is_divide_by_zero());
        assert!(MathError::DivideByZero { divisor: 0.0 }.is_divide_by_zero());
    }
}
