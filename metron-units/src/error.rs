//! Errors raised by the unit engine

use thiserror::Error;
use metron_core::MetronError;
use crate::Dimension;

/// Error type for parsing, resolution, conversion and registration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// The expression is malformed or combines non-linear units illegally
    #[error("format error in '{expression}': {reason}")]
    Format { expression: String, reason: String },

    #[error("cannot convert {from} ({from_dim}) to {to} ({to_dim}): incompatible dimensions")]
    IncompatibleDimensions {
        from: String,
        to: String,
        from_dim: Dimension,
        to_dim: Dimension,
    },

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),

    #[error("cyclic unit definition: {}", .0.join(" -> "))]
    CyclicDefinition(Vec<String>),

    #[error("invalid definition of '{symbol}': {reason}")]
    InvalidDefinition { symbol: String, reason: String },
}

impl UnitError {
    pub(crate) fn format(expression: &str, reason: impl Into<String>) -> Self {
        UnitError::Format { expression: expression.to_string(), reason: reason.into() }
    }

    pub(crate) fn invalid(symbol: &str, reason: impl Into<String>) -> Self {
        UnitError::InvalidDefinition { symbol: symbol.to_string(), reason: reason.into() }
    }
}

impl From<UnitError> for MetronError {
    fn from(err: UnitError) -> Self {
        match err {
            UnitError::Format { expression, reason } => MetronError::format_error(&expression, reason),
            UnitError::IncompatibleDimensions { from, to, from_dim, to_dim } => {
                MetronError::incompatible_dimensions(&from, &to, &from_dim.to_string(), &to_dim.to_string())
            }
            UnitError::DuplicateSymbol(symbol) => MetronError::duplicate_symbol(&symbol),
            e @ (UnitError::CyclicDefinition(_) | UnitError::InvalidDefinition { .. }) => {
                MetronError::invalid_definition(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metron_core::codes;

    #[test]
    fn test_display() {
        let err = UnitError::CyclicDefinition(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(err.to_string(), "cyclic unit definition: a -> b -> a");
    }

    #[test]
    fn test_into_structured_error() {
        let err: MetronError = UnitError::format("m^x", "invalid exponent 'x'").into();
        assert_eq!(err.code, codes::FORMAT_ERROR);
        assert!(err.message.contains("m^x"));

        let err: MetronError = UnitError::DuplicateSymbol("m".into()).into();
        assert_eq!(err.code, codes::DUPLICATE_SYMBOL);

        let err: MetronError = UnitError::invalid("N", "unknown symbol 'kgg'").into();
        assert_eq!(err.code, codes::INVALID_DEFINITION);
    }
}
