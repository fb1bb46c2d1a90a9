//! Unit functions exposed through the plugin registry

use std::collections::HashMap;
use metron_plugin::prelude::*;
use crate::{UnitError, UNITS};

fn unit_error(func: &str, e: UnitError) -> Value {
    Value::Error(MetronError::from(e).in_function(func))
}

// ============ convert ============

pub struct Convert;

static CONVERT_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("value", "Number", "Value to convert"),
    ArgMeta::required("from_unit", "Text", "Source unit expression (e.g., \"km/h\")"),
    ArgMeta::required("to_unit", "Text", "Target unit expression (e.g., \"m s^-1\")"),
];

static CONVERT_EXAMPLES: [&str; 3] = [
    "convert(36, \"km/h\", \"m s^-1\") → 10",
    "convert(100, \"degC\", \"degF\") → 212",
    "convert(30, \"dBm\", \"W\") → 1",
];

static CONVERT_RELATED: [&str; 3] = ["factor", "to_base", "convertible"];

impl FunctionPlugin for Convert {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "convert",
            description: "Convert a value from one unit expression to another",
            usage: "convert(value, from_unit, to_unit)",
            args: &CONVERT_ARGS,
            returns: "Number",
            examples: &CONVERT_EXAMPLES,
            category: "units",
            related: &CONVERT_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 3 {
            return Value::Error(MetronError::arg_count("convert", 3, args.len()));
        }

        let value = match args[0].as_number() {
            Some(n) => n,
            None => return Value::Error(MetronError::arg_type("convert", "value", "Number", args[0].type_name())),
        };

        let from = match args[1].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("convert", "from_unit", "Text", args[1].type_name())),
        };

        let to = match args[2].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("convert", "to_unit", "Text", args[2].type_name())),
        };

        match UNITS.convert(value, from, to) {
            Ok(result) => Value::Number(result),
            Err(e) => unit_error("convert", e),
        }
    }
}

// ============ factor ============

pub struct Factor;

static FACTOR_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("from_unit", "Text", "Source unit expression"),
    ArgMeta::required("to_unit", "Text", "Target unit expression"),
];

static FACTOR_EXAMPLES: [&str; 2] = [
    "factor(\"kg\", \"t\") → 0.001",
    "factor(\"degC\", \"K\") → null",
];

static FACTOR_RELATED: [&str; 1] = ["convert"];

impl FunctionPlugin for Factor {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "factor",
            description: "Multiplicative factor between two linear unit expressions, null when either is affine or logarithmic",
            usage: "factor(from_unit, to_unit)",
            args: &FACTOR_ARGS,
            returns: "Number | Null",
            examples: &FACTOR_EXAMPLES,
            category: "units",
            related: &FACTOR_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 2 {
            return Value::Error(MetronError::arg_count("factor", 2, args.len()));
        }

        let from = match args[0].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("factor", "from_unit", "Text", args[0].type_name())),
        };

        let to = match args[1].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("factor", "to_unit", "Text", args[1].type_name())),
        };

        match UNITS.factor(from, to) {
            Ok(Some(factor)) => Value::Number(factor),
            Ok(None) => Value::Null,
            Err(e) => unit_error("factor", e),
        }
    }
}

// ============ to_base ============

pub struct ToBase;

static TO_BASE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("value", "Number", "Value to convert"),
    ArgMeta::required("unit", "Text", "Source unit expression"),
];

static TO_BASE_EXAMPLES: [&str; 2] = [
    "to_base(5, \"km\") → 5000",
    "to_base(100, \"degC\") → 373.15",
];

static TO_BASE_RELATED: [&str; 2] = ["convert", "base_units"];

impl FunctionPlugin for ToBase {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "to_base",
            description: "Convert a value to coherent SI base units",
            usage: "to_base(value, unit)",
            args: &TO_BASE_ARGS,
            returns: "Number",
            examples: &TO_BASE_EXAMPLES,
            category: "units",
            related: &TO_BASE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 2 {
            return Value::Error(MetronError::arg_count("to_base", 2, args.len()));
        }

        let value = match args[0].as_number() {
            Some(n) => n,
            None => return Value::Error(MetronError::arg_type("to_base", "value", "Number", args[0].type_name())),
        };

        let unit = match args[1].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("to_base", "unit", "Text", args[1].type_name())),
        };

        match UNITS.to_base(value, unit) {
            Ok(result) => Value::Number(result),
            Err(e) => unit_error("to_base", e),
        }
    }
}

// ============ simplify ============

pub struct Simplify;

static SIMPLIFY_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("unit", "Text", "Unit expression to simplify"),
];

static SIMPLIFY_EXAMPLES: [&str; 3] = [
    "simplify(\"kg m s^-2\") → [\"N\"]",
    "simplify(\"kg^3 m^4 s^-6 A^-1\") → [\"J^2 T\", ...]",
    "simplify(\"km/h\") → [\"km h^-1\"]",
];

static SIMPLIFY_RELATED: [&str; 2] = ["base_units", "dimensions"];

impl FunctionPlugin for Simplify {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "simplify",
            description: "Every shortest expression of the same quantity in named units",
            usage: "simplify(unit)",
            args: &SIMPLIFY_ARGS,
            returns: "List<Text>",
            examples: &SIMPLIFY_EXAMPLES,
            category: "units",
            related: &SIMPLIFY_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.is_empty() {
            return Value::Error(MetronError::arg_count("simplify", 1, 0));
        }

        let unit = match args[0].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("simplify", "unit", "Text", args[0].type_name())),
        };

        match UNITS.simplify(unit) {
            Ok(forms) => Value::List(forms.iter().map(|s| Value::Text(s.clone())).collect()),
            Err(e) => unit_error("simplify", e),
        }
    }
}

// ============ convertible ============

pub struct Convertible;

static CONVERTIBLE_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("unit1", "Text", "First unit expression"),
    ArgMeta::required("unit2", "Text", "Second unit expression"),
];

static CONVERTIBLE_EXAMPLES: [&str; 2] = [
    "convertible(\"km\", \"mi\") → true",
    "convertible(\"m\", \"s\") → false",
];

static CONVERTIBLE_RELATED: [&str; 2] = ["equivalent", "convert"];

impl FunctionPlugin for Convertible {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "convertible",
            description: "Check whether two unit expressions measure the same quantity",
            usage: "convertible(unit1, unit2)",
            args: &CONVERTIBLE_ARGS,
            returns: "Bool",
            examples: &CONVERTIBLE_EXAMPLES,
            category: "units",
            related: &CONVERTIBLE_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.len() < 2 {
            return Value::Error(MetronError::arg_count("convertible", 2, args.len()));
        }

        let a = match args[0].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("convertible", "unit1", "Text", args[0].type_name())),
        };

        let b = match args[1].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("convertible", "unit2", "Text", args[1].type_name())),
        };

        match UNITS.convertible(a, b) {
            Ok(result) => Value::Bool(result),
            Err(e) => unit_error("convertible", e),
        }
    }
}

// ============ equivalent ============

pub struct Equivalent;

static EQUIVALENT_ARGS: [ArgMeta; 3] = [
    ArgMeta::required("value", "Number", "Value to compare"),
    ArgMeta::required("unit1", "Text", "First unit expression"),
    ArgMeta::required("unit2", "Text", "Second unit expression"),
];

static EQUIVALENT_EXAMPLES: [&str; 3] = [
    "equivalent(1, \"J\", \"N m\") → true",
    "equivalent(1, \"s\", \"min\") → false",
    "equivalent(0, \"degC\", \"degF\") → false",
];

static EQUIVALENT_RELATED: [&str; 1] = ["convertible"];

impl FunctionPlugin for Equivalent {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "equivalent",
            description: "Check whether a value denotes the same quantity in both unit expressions",
            usage: "equivalent(value, unit1, unit2)",
            args: &EQUIVALENT_ARGS,
            returns: "Bool",
            examples: &EQUIVALENT_EXAMPLES,
            category: "units",
            related: &EQUIVALENT_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.len() < 3 {
            return Value::Error(MetronError::arg_count("equivalent", 3, args.len()));
        }

        let value = match args[0].as_number() {
            Some(n) => n,
            None => return Value::Error(MetronError::arg_type("equivalent", "value", "Number", args[0].type_name())),
        };

        let a = match args[1].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("equivalent", "unit1", "Text", args[1].type_name())),
        };

        let b = match args[2].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("equivalent", "unit2", "Text", args[2].type_name())),
        };

        match UNITS.equivalent_within(value, a, b, ctx.tolerance) {
            Ok(result) => Value::Bool(result),
            Err(e) => unit_error("equivalent", e),
        }
    }
}

// ============ base_units ============

pub struct BaseUnits;

static BASE_UNITS_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("unit", "Text", "Unit expression"),
];

static BASE_UNITS_EXAMPLES: [&str; 2] = [
    "base_units(\"N\") → \"kg m s^-2\"",
    "base_units(\"%\") → \"\"",
];

static BASE_UNITS_RELATED: [&str; 2] = ["to_base", "simplify"];

impl FunctionPlugin for BaseUnits {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "base_units",
            description: "Express a unit's dimension in coherent SI base units",
            usage: "base_units(unit)",
            args: &BASE_UNITS_ARGS,
            returns: "Text",
            examples: &BASE_UNITS_EXAMPLES,
            category: "units",
            related: &BASE_UNITS_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.is_empty() {
            return Value::Error(MetronError::arg_count("base_units", 1, 0));
        }

        let unit = match args[0].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("base_units", "unit", "Text", args[0].type_name())),
        };

        match UNITS.base_units(unit) {
            Ok(text) => Value::Text(text),
            Err(e) => unit_error("base_units", e),
        }
    }
}

// ============ dimensions ============

pub struct Dimensions;

static DIMENSIONS_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("unit", "Text", "Unit expression"),
];

static DIMENSIONS_EXAMPLES: [&str; 2] = [
    "dimensions(\"m/s\") → {formula: \"L T^-1\", name: \"velocity\"}",
    "dimensions(\"m foo\") → {formula: \"L [foo]\", name: null}",
];

static DIMENSIONS_RELATED: [&str; 2] = ["is_dimensionless", "base_units"];

impl FunctionPlugin for Dimensions {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "dimensions",
            description: "Dimension formula of a unit expression, with the quantity name when known",
            usage: "dimensions(unit)",
            args: &DIMENSIONS_ARGS,
            returns: "Object",
            examples: &DIMENSIONS_EXAMPLES,
            category: "units",
            related: &DIMENSIONS_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.is_empty() {
            return Value::Error(MetronError::arg_count("dimensions", 1, 0));
        }

        let unit = match args[0].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("dimensions", "unit", "Text", args[0].type_name())),
        };

        let dimension = match UNITS.dimension(unit) {
            Ok(d) => d,
            Err(e) => return unit_error("dimensions", e),
        };

        let mut result = HashMap::new();
        result.insert("formula".to_string(), Value::Text(dimension.to_string()));
        result.insert(
            "name".to_string(),
            dimension.name().map_or(Value::Null, Value::from),
        );
        Value::Object(result)
    }
}

// ============ is_dimensionless ============

pub struct IsDimensionless;

static IS_DIMLESS_ARGS: [ArgMeta; 1] = [
    ArgMeta::required("unit", "Text", "Unit expression to check"),
];

static IS_DIMLESS_EXAMPLES: [&str; 2] = [
    "is_dimensionless(\"rad\") → true",
    "is_dimensionless(\"m/s\") → false",
];

static IS_DIMLESS_RELATED: [&str; 1] = ["dimensions"];

impl FunctionPlugin for IsDimensionless {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "is_dimensionless",
            description: "Check whether a unit expression has no dimension",
            usage: "is_dimensionless(unit)",
            args: &IS_DIMLESS_ARGS,
            returns: "Bool",
            examples: &IS_DIMLESS_EXAMPLES,
            category: "units",
            related: &IS_DIMLESS_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        if args.is_empty() {
            return Value::Error(MetronError::arg_count("is_dimensionless", 1, 0));
        }

        let unit = match args[0].as_text() {
            Some(s) => s,
            None => return Value::Error(MetronError::arg_type("is_dimensionless", "unit", "Text", args[0].type_name())),
        };

        match UNITS.dimension(unit) {
            Ok(d) => Value::Bool(d.is_dimensionless()),
            Err(e) => unit_error("is_dimensionless", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approx_eq;

    fn eval_ctx() -> EvalContext {
        EvalContext::new()
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_convert_length() {
        let args = vec![Value::Number(1.0), text("km"), text("m")];
        let result = Convert.call(&args, &eval_ctx());
        assert!(approx_eq(result.as_number().unwrap(), 1000.0, 1e-12));
    }

    #[test]
    fn test_convert_temperature() {
        let args = vec![Value::Number(0.0), text("degC"), text("K")];
        let result = Convert.call(&args, &eval_ctx());
        assert!(approx_eq(result.as_number().unwrap(), 273.15, 1e-12));
    }

    #[test]
    fn test_convert_incompatible() {
        let args = vec![Value::Number(1.0), text("m"), text("s")];
        let result = Convert.call(&args, &eval_ctx());
        let err = result.as_error().unwrap();
        assert_eq!(err.code, codes::INCOMPATIBLE_DIMENSIONS);
        assert_eq!(err.context.as_ref().unwrap().function.as_deref(), Some("convert"));
    }

    #[test]
    fn test_convert_arg_checks() {
        let result = Convert.call(&[Value::Number(1.0)], &eval_ctx());
        assert_eq!(result.as_error().unwrap().code, codes::ARG_COUNT);

        let args = vec![text("1"), text("m"), text("km")];
        let result = Convert.call(&args, &eval_ctx());
        assert_eq!(result.as_error().unwrap().code, codes::ARG_TYPE);
    }

    #[test]
    fn test_convert_format_error() {
        let args = vec![Value::Number(1.0), text("m^x"), text("m")];
        let result = Convert.call(&args, &eval_ctx());
        assert_eq!(result.as_error().unwrap().code, codes::FORMAT_ERROR);
    }

    #[test]
    fn test_factor() {
        let result = Factor.call(&[text("kg"), text("t")], &eval_ctx());
        assert!(approx_eq(result.as_number().unwrap(), 1e-3, 1e-12));

        let result = Factor.call(&[text("degC"), text("K")], &eval_ctx());
        assert!(result.is_null());
    }

    #[test]
    fn test_to_base() {
        let result = ToBase.call(&[Value::Number(5.0), text("km")], &eval_ctx());
        assert!(approx_eq(result.as_number().unwrap(), 5000.0, 1e-12));
    }

    #[test]
    fn test_simplify() {
        let result = Simplify.call(&[text("kg m s^-2")], &eval_ctx());
        let forms: Vec<&str> = result.as_list().unwrap().iter().filter_map(|v| v.as_text()).collect();
        assert_eq!(forms, vec!["N"]);
    }

    #[test]
    fn test_convertible() {
        assert_eq!(Convertible.call(&[text("km"), text("mi")], &eval_ctx()).as_bool(), Some(true));
        assert_eq!(Convertible.call(&[text("m"), text("s")], &eval_ctx()).as_bool(), Some(false));
    }

    #[test]
    fn test_equivalent_uses_context_tolerance() {
        let args = vec![Value::Number(1.0), text("in"), text("cm")];
        assert_eq!(Equivalent.call(&args, &eval_ctx()).as_bool(), Some(false));

        // 1 in is 2.54 cm, so only a very loose tolerance accepts it
        let loose = eval_ctx().with_tolerance(0.9);
        assert_eq!(Equivalent.call(&args, &loose).as_bool(), Some(true));

        let args = vec![Value::Number(1.0), text("J"), text("N m")];
        assert_eq!(Equivalent.call(&args, &eval_ctx()).as_bool(), Some(true));
    }

    #[test]
    fn test_base_units() {
        let result = BaseUnits.call(&[text("N")], &eval_ctx());
        assert_eq!(result.as_text(), Some("kg m s^-2"));
    }

    #[test]
    fn test_dimensions() {
        let result = Dimensions.call(&[text("m/s")], &eval_ctx());
        let object = result.as_object().unwrap();
        assert_eq!(object["formula"].as_text(), Some("L T^-1"));
        assert!(object.contains_key("name"));
    }

    #[test]
    fn test_is_dimensionless() {
        assert_eq!(IsDimensionless.call(&[text("rad")], &eval_ctx()).as_bool(), Some(true));
        assert_eq!(IsDimensionless.call(&[text("m/s")], &eval_ctx()).as_bool(), Some(false));
        assert_eq!(IsDimensionless.call(&[text("%")], &eval_ctx()).as_bool(), Some(true));
    }
}
