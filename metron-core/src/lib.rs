//! Metron Core - Fundamental types
//!
//! This crate provides the core types shared by the Metron crates:
//! - `Value`: Runtime values (numbers, text, lists, errors)
//! - `MetronError`: Structured errors for programmatic consumers

mod value;
mod error;

pub use value::Value;
pub use error::{MetronError, ErrorContext, Severity, codes};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Value, MetronError, Severity};
    pub use crate::error::codes;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod value_tests {
        use super::*;

        #[test]
        fn test_accessors() {
            assert_eq!(Value::Number(2.5).as_number(), Some(2.5));
            assert_eq!(Value::from("km").as_text(), Some("km"));
            assert_eq!(Value::Bool(true).as_bool(), Some(true));
            assert!(Value::Text("m".into()).as_number().is_none());
        }

        #[test]
        fn test_type_name() {
            assert_eq!(Value::Null.type_name(), "Null");
            assert_eq!(Value::List(vec![]).type_name(), "List");
            assert_eq!(Value::Error(MetronError::internal("x")).type_name(), "Error");
        }

        #[test]
        fn test_display() {
            assert_eq!(Value::Number(1000.0).to_string(), "1000");
            assert_eq!(Value::Number(0.25).to_string(), "0.25");
            let list = Value::List(vec![Value::from("J^2 T"), Value::from("N^2 Wb")]);
            assert_eq!(list.to_string(), "[J^2 T, N^2 Wb]");
        }

        #[test]
        fn test_to_json() {
            let list = Value::List(vec![Value::Number(1.5), Value::Bool(false), Value::Null]);
            assert_eq!(list.to_json(), serde_json::json!([1.5, false, null]));

            // Non-finite numbers have no JSON representation
            assert_eq!(Value::Number(f64::NAN).to_json(), serde_json::Value::Null);
        }

        #[test]
        fn test_error_propagates_through_json() {
            let err = Value::Error(MetronError::format_error("m^x", "invalid exponent"));
            let json = err.to_json();
            assert_eq!(json["error"]["code"], codes::FORMAT_ERROR);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_builder() {
            let err = MetronError::new(codes::INTERNAL, "boom")
                .with_suggestion("retry")
                .with_note("while simplifying")
                .with_severity(Severity::Warning);
            assert_eq!(err.code, codes::INTERNAL);
            assert_eq!(err.suggestion.as_deref(), Some("retry"));
            assert_eq!(err.severity, Severity::Warning);
            assert_eq!(err.context.unwrap().notes, vec!["while simplifying".to_string()]);
        }

        #[test]
        fn test_display_includes_suggestion() {
            let err = MetronError::incompatible_dimensions("m", "s", "L", "T");
            let text = err.to_string();
            assert!(text.starts_with("[INCOMPATIBLE_DIMENSIONS]"), "{}", text);
            assert!(text.contains("suggestion"), "{}", text);
        }

        #[test]
        fn test_serialize_skips_empty_fields() {
            let err = MetronError::duplicate_symbol("m");
            let json = serde_json::to_value(&err).unwrap();
            assert_eq!(json["code"], codes::DUPLICATE_SYMBOL);
            assert!(json.get("context").is_none());
            assert_eq!(json["severity"], "error");
        }
    }
}
