#![forbid(unsafe_code)]

//! Typed reads from a JSON request body. A wrong JSON type is reported the
//! same way as a malformed value.

use serde_json::{Map, Value};
use tracker_core::text::FieldError;

/// Decoded JSON object body.
pub type Args = Map<String, Value>;

pub(crate) fn optional_string(args: &Args, key: &'static str) -> Result<Option<String>, FieldError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.to_string())),
        Some(_) => Err(FieldError::Malformed { field: key }),
    }
}

/// Absent key: leave unchanged. `null`: clear.
pub(crate) fn optional_nullable_string(
    args: &Args,
    key: &'static str,
) -> Result<Option<Option<String>>, FieldError> {
    match args.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(Value::String(value)) => Ok(Some(Some(value.to_string()))),
        Some(_) => Err(FieldError::Malformed { field: key }),
    }
}

pub(crate) fn optional_i64(args: &Args, key: &'static str) -> Result<Option<i64>, FieldError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => as_i64(value)
            .map(Some)
            .ok_or(FieldError::Malformed { field: key }),
    }
}

pub(crate) fn optional_nullable_i64(
    args: &Args,
    key: &'static str,
) -> Result<Option<Option<i64>>, FieldError> {
    match args.get(key) {
        None => Ok(None),
        Some(Value::Null) => Ok(Some(None)),
        Some(value) => as_i64(value)
            .map(|id| Some(Some(id)))
            .ok_or(FieldError::Malformed { field: key }),
    }
}

pub(crate) fn optional_i64_array(
    args: &Args,
    key: &'static str,
) -> Result<Option<Vec<i64>>, FieldError> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let Some(items) = value.as_array() else {
        return Err(FieldError::Malformed { field: key });
    };
    items
        .iter()
        .map(|item| as_i64(item).ok_or(FieldError::Malformed { field: key }))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

/// Integers, or strings holding one, since form-encoded clients send ids as text.
fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Args {
        match value {
            Value::Object(map) => map,
            _ => Args::new(),
        }
    }

    #[test]
    fn nullable_fields_distinguish_absent_from_null() {
        let body = args(json!({"description": null, "assigneeId": 3}));
        assert_eq!(optional_nullable_string(&body, "description"), Ok(Some(None)));
        assert_eq!(optional_nullable_string(&body, "title"), Ok(None));
        assert_eq!(optional_nullable_i64(&body, "assigneeId"), Ok(Some(Some(3))));
    }

    #[test]
    fn ids_accept_numeric_strings() {
        let body = args(json!({"statusId": "2", "tagIds": [1, "4"]}));
        assert_eq!(optional_i64(&body, "statusId"), Ok(Some(2)));
        assert_eq!(optional_i64_array(&body, "tagIds"), Ok(Some(vec![1, 4])));
    }

    #[test]
    fn wrong_types_are_malformed() {
        let body = args(json!({"title": 5, "tagIds": "1,2", "priorityId": 1.5}));
        assert_eq!(
            optional_string(&body, "title"),
            Err(FieldError::Malformed { field: "title" })
        );
        assert_eq!(
            optional_i64_array(&body, "tagIds"),
            Err(FieldError::Malformed { field: "tagIds" })
        );
        assert_eq!(
            optional_i64(&body, "priorityId"),
            Err(FieldError::Malformed { field: "priorityId" })
        );
    }

    #[test]
    fn null_reads_as_absent_for_plain_optionals() {
        let body = args(json!({"statusId": null, "tagIds": null}));
        assert_eq!(optional_i64(&body, "statusId"), Ok(None));
        assert_eq!(optional_i64_array(&body, "tagIds"), Ok(None));
    }
}
