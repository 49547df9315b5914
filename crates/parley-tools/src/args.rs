//! Lenient readers for model-supplied arguments
//!
//! Models are sloppy with types, so numbers may arrive as floats or
//! strings and empty strings count as absent.

use serde_json::{Map, Value};

use crate::error::ToolError;

pub(crate) type Arguments = Map<String, Value>;

/// Non-empty string argument
pub(crate) fn string_arg<'a>(args: &'a Arguments, name: &str) -> Option<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Positive count, `default` when absent
pub(crate) fn count_arg(args: &Arguments, name: &'static str, default: usize) -> Result<usize, ToolError> {
    let value = match args.get(name) {
        None | Some(Value::Null) => return Ok(default),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    let Some(value) = value.filter(|v| v.is_finite()) else {
        return Err(ToolError::invalid(name, "must be a number"));
    };

    if value < 1.0 {
        return Err(ToolError::invalid(name, "must be at least 1"));
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = value.trunc() as usize;

    Ok(count)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn blank_string_counts_as_missing() {
        let args = args(json!({"query": "   "}));
        assert_eq!(string_arg(&args, "query"), None);
    }

    #[test]
    fn count_accepts_floats_and_numeric_strings() {
        let args = args(json!({"a": 3.0, "b": "7", "c": 2.9}));
        assert_eq!(count_arg(&args, "a", 5).unwrap(), 3);
        assert_eq!(count_arg(&args, "b", 5).unwrap(), 7);
        assert_eq!(count_arg(&args, "c", 5).unwrap(), 2);
        assert_eq!(count_arg(&args, "missing", 5).unwrap(), 5);
    }

    #[test]
    fn count_rejects_zero_and_garbage() {
        let args = args(json!({"zero": 0, "word": "many", "list": [1]}));
        assert!(matches!(count_arg(&args, "zero", 5), Err(ToolError::InvalidArgument { name: "zero", .. })));
        assert!(count_arg(&args, "word", 5).is_err());
        assert!(count_arg(&args, "list", 5).is_err());
    }
}
