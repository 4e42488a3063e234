//! Dimension-spec shorthand used by triggers and data queries.
//!
//! `1:*;2:avg:11,12` becomes `[[1,"*"],[2,"AVG(11,12)"]]`. Input that is
//! already valid JSON is passed through untouched.

use crate::error::DataError;

pub fn parse_dimension_specs(format: &str) -> Result<String, DataError> {
    if serde_json::from_str::<serde_json::Value>(format).is_ok() {
        return Ok(format.to_string());
    }

    let mut items = Vec::new();
    for part in format.split(';') {
        let invalid = || DataError::InvalidDimensionSpecs(part.to_string());

        let elements: Vec<&str> = part.split(':').collect();
        let (dimension, aggregator, values) = match elements.as_slice() {
            [dimension, values] => (*dimension, None, *values),
            [dimension, aggregator, values] => {
                (*dimension, Some(aggregator.to_uppercase()), *values)
            }
            _ => return Err(invalid()),
        };

        if dimension.is_empty() || values.is_empty() {
            return Err(invalid());
        }
        let dimension_id: i64 = dimension.parse().map_err(|_| invalid())?;

        if values != "*" && values.split(',').any(|id| id.parse::<i64>().is_err()) {
            return Err(invalid());
        }

        let spec = match aggregator {
            Some(aggregator) if !aggregator.is_empty() => format!("{aggregator}({values})"),
            _ => values.to_string(),
        };
        items.push(serde_json::json!([dimension_id, spec]));
    }

    Ok(serde_json::Value::Array(items).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_passes_through() {
        let json = r#"[[1,"AVG(*)"]]"#;
        assert_eq!(parse_dimension_specs(json).unwrap(), json);
        assert_eq!(parse_dimension_specs("[]").unwrap(), "[]");
    }

    #[test]
    fn test_shorthand() {
        assert_eq!(
            parse_dimension_specs("1:*;2:avg:11,12").unwrap(),
            r#"[[1,"*"],[2,"AVG(11,12)"]]"#
        );
        assert_eq!(parse_dimension_specs("3:max:*").unwrap(), r#"[[3,"MAX(*)"]]"#);
    }

    #[test]
    fn test_invalid_specs() {
        for case in ["", "1-2", "x:*", "1:", "1:a,b", "1:avg:2:3", ":*", "1:*;"] {
            assert!(
                matches!(
                    parse_dimension_specs(case),
                    Err(DataError::InvalidDimensionSpecs(_))
                ),
                "expected error for {case:?}"
            );
        }
    }
}
