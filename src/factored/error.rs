use thiserror::Error;

/// Why a sequence of variable indices is not a valid scope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeViolation {
    #[error("scope is empty")]
    Empty,

    #[error("variable {key} is out of range for a space of {variables} variables")]
    OutOfRange { key: usize, variables: usize },

    #[error("keys are not increasing at position {position}")]
    Unsorted { position: usize },

    #[error("variable {key} appears more than once")]
    Duplicate { key: usize },
}

/// Errors raised while building factored structures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FactoredError {
    #[error("Invalid scope: {0}")]
    InvalidScope(ScopeViolation),

    #[error("Size mismatch: expected {expected}, found {found}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("Got {keys} keys but {values} values")]
    LengthMismatch { keys: usize, values: usize },

    #[error("Value {value} of variable {key} is outside its domain of size {domain}")]
    ValueOutOfRange {
        key: usize,
        value: usize,
        domain: usize,
    },

    #[error("Variable {variable} has an empty domain")]
    EmptyDomain { variable: usize },
}

impl From<ScopeViolation> for FactoredError {
    fn from(violation: ScopeViolation) -> Self {
        FactoredError::InvalidScope(violation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_scope_display() {
        let e = FactoredError::from(ScopeViolation::Duplicate { key: 3 });
        assert_eq!(
            e.to_string(),
            "Invalid scope: variable 3 appears more than once"
        );
    }

    #[test]
    fn size_mismatch_display() {
        let e = FactoredError::SizeMismatch {
            expected: 4,
            found: 2,
        };
        assert_eq!(e.to_string(), "Size mismatch: expected 4, found 2");
    }

    #[test]
    fn value_out_of_range_display() {
        let e = FactoredError::ValueOutOfRange {
            key: 1,
            value: 5,
            domain: 3,
        };
        assert!(e.to_string().contains("outside its domain of size 3"));
    }

    #[test]
    fn error_equality() {
        assert_eq!(
            FactoredError::InvalidScope(ScopeViolation::Empty),
            FactoredError::InvalidScope(ScopeViolation::Empty)
        );
        assert_ne!(
            FactoredError::InvalidScope(ScopeViolation::Empty),
            FactoredError::EmptyDomain { variable: 0 }
        );
    }
}
