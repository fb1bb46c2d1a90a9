//! Structured errors for programmatic consumers
//!
//! Errors at the plugin and CLI surface are values: they carry a machine
//! readable code, a message and an optional suggestion for fixing the input.

use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const FORMAT_ERROR: &str = "FORMAT_ERROR";
    pub const INCOMPATIBLE_DIMENSIONS: &str = "INCOMPATIBLE_DIMENSIONS";
    pub const DUPLICATE_SYMBOL: &str = "DUPLICATE_SYMBOL";
    pub const INVALID_DEFINITION: &str = "INVALID_DEFINITION";
    pub const UNDEFINED_FUNC: &str = "UNDEFINED_FUNC";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const ARG_TYPE: &str = "ARG_TYPE";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Computation continued with degraded result
    Warning,
    /// The requested operation failed
    Error,
    /// The unit system itself is unusable
    Fatal,
}

/// Context about where an error occurred
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Function that produced the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Unit expression being processed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    /// Propagation notes
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub notes: Vec<String>,
}

/// Structured error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetronError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,

    /// Severity level
    pub severity: Severity,
}

impl MetronError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            context: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: add context
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Builder: set function context
    pub fn in_function(mut self, function: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.function = Some(function.into());
        self
    }

    /// Builder: set expression context
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.expression = Some(expression.into());
        self
    }

    /// Builder: add propagation note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::default);
        ctx.notes.push(note.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    // ========== Common Error Constructors ==========

    pub fn parse_error(details: impl Into<String>) -> Self {
        Self::new(codes::PARSE_ERROR, format!("Parse error: {}", details.into()))
            .with_suggestion("Send one JSON object per line")
    }

    pub fn format_error(expression: &str, reason: impl Into<String>) -> Self {
        Self::new(codes::FORMAT_ERROR,
            format!("Malformed unit expression '{}': {}", expression, reason.into()))
            .with_suggestion("Write units as a space separated product of powers, e.g. \"kg m^2 s^-2\"")
            .with_expression(expression)
    }

    pub fn incompatible_dimensions(from: &str, to: &str, from_dim: &str, to_dim: &str) -> Self {
        Self::new(codes::INCOMPATIBLE_DIMENSIONS,
            format!("Cannot convert {} ({}) to {} ({})", from, from_dim, to, to_dim))
            .with_suggestion("Use convertible() to check units before converting")
    }

    pub fn duplicate_symbol(symbol: &str) -> Self {
        Self::new(codes::DUPLICATE_SYMBOL, format!("Symbol already registered: {}", symbol))
            .with_suggestion("Pick a symbol that is not already a unit or prefix")
    }

    pub fn invalid_definition(details: impl Into<String>) -> Self {
        Self::new(codes::INVALID_DEFINITION, format!("Invalid unit definition: {}", details.into()))
            .with_severity(Severity::Fatal)
    }

    pub fn undefined_func(name: &str) -> Self {
        Self::new(codes::UNDEFINED_FUNC, format!("Unknown function: {}", name))
            .with_suggestion("Use list_functions to see what is available")
    }

    pub fn arg_count(func: &str, expected: usize, got: usize) -> Self {
        Self::new(codes::ARG_COUNT,
            format!("{}() expects {} arguments, got {}", func, expected, got))
            .with_suggestion(format!("Use help('{}') for usage", func))
    }

    pub fn arg_type(func: &str, arg: &str, expected: &str, got: &str) -> Self {
        Self::new(codes::ARG_TYPE,
            format!("{}() argument '{}': expected {}, got {}", func, arg, expected, got))
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_suggestion("This is a bug, please report it")
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for MetronError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for MetronError {}
