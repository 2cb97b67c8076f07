//! Classification of incoming JSON payloads.
//!
//! A payload is inspected once, at the boundary, and turned into a
//! [`Payload`] variant. The aggregator then dispatches on the variant.

use serde_json::{Map, Value};

use crate::error::{ServiceError, ServiceResult};

pub const NUMBERS_KEY: &str = "numbers";
pub const TEXT_KEY: &str = "text";
pub const DATASET_KEY: &str = "dataset";

/// A payload, keyed by the first recognised field it carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `numbers`: a numeric series.
    Numbers(Vec<f64>),
    /// `text`: a single document.
    Text(String),
    /// `dataset`: a list of records.
    Dataset(Vec<Map<String, Value>>),
    /// No recognised key; the whole object is summarized structurally.
    Generic(Map<String, Value>),
}

impl Payload {
    /// Classify an arbitrary JSON value. Only objects are accepted.
    pub fn classify(value: Value) -> ServiceResult<Self> {
        match value {
            Value::Object(object) => Self::from_object(object),
            other => Err(ServiceError::processing(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Classify an object, honoring `numbers`, then `text`, then `dataset`.
    pub fn from_object(mut object: Map<String, Value>) -> ServiceResult<Self> {
        if let Some(value) = object.remove(NUMBERS_KEY) {
            return parse_numbers(value).map(Payload::Numbers);
        }
        if let Some(value) = object.remove(TEXT_KEY) {
            return parse_text(value).map(Payload::Text);
        }
        if let Some(value) = object.remove(DATASET_KEY) {
            return parse_dataset(value).map(Payload::Dataset);
        }
        Ok(Payload::Generic(object))
    }

    /// Short name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Numbers(_) => "numbers",
            Payload::Text(_) => "text",
            Payload::Dataset(_) => "dataset",
            Payload::Generic(_) => "generic",
        }
    }
}

/// Human-readable JSON type of a value.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_numbers(value: Value) -> ServiceResult<Vec<f64>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_f64().ok_or_else(|| {
                    ServiceError::processing(format!(
                        "'{}' must contain only numbers, found {} at index {}",
                        NUMBERS_KEY,
                        json_type_name(item),
                        i
                    ))
                })
            })
            .collect(),
        other => Err(ServiceError::processing(format!(
            "'{}' must be an array, got {}",
            NUMBERS_KEY,
            json_type_name(&other)
        ))),
    }
}

fn parse_text(value: Value) -> ServiceResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        Value::String(text) => Ok(text),
        other => Err(ServiceError::processing(format!(
            "'{}' must be a string, got {}",
            TEXT_KEY,
            json_type_name(&other)
        ))),
    }
}

fn parse_dataset(value: Value) -> ServiceResult<Vec<Map<String, Value>>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(rows) => rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| match row {
                Value::Object(record) => Ok(record),
                other => Err(ServiceError::processing(format!(
                    "row {} of '{}' is a {}, expected an object",
                    i,
                    DATASET_KEY,
                    json_type_name(&other)
                ))),
            })
            .collect(),
        other => Err(ServiceError::processing(format!(
            "'{}' must be an array, got {}",
            DATASET_KEY,
            json_type_name(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_take_priority() {
        let payload = Payload::classify(json!({
            "dataset": [{"a": 1}],
            "text": "hello",
            "numbers": [1, 2.5]
        }))
        .unwrap();
        assert_eq!(payload, Payload::Numbers(vec![1.0, 2.5]));
    }

    #[test]
    fn test_text_before_dataset() {
        let payload = Payload::classify(json!({"dataset": [], "text": "hi"})).unwrap();
        assert_eq!(payload.kind(), "text");
    }

    #[test]
    fn test_generic_keeps_object() {
        let payload = Payload::classify(json!({"name": "x", "age": 3})).unwrap();
        match payload {
            Payload::Generic(object) => {
                let keys: Vec<_> = object.keys().cloned().collect();
                assert_eq!(keys, vec!["name", "age"]);
            }
            other => panic!("expected generic payload, got {:?}", other),
        }
    }

    #[test]
    fn test_null_values_become_empty() {
        assert_eq!(
            Payload::classify(json!({"numbers": null})).unwrap(),
            Payload::Numbers(Vec::new())
        );
        assert_eq!(
            Payload::classify(json!({"text": null})).unwrap(),
            Payload::Text(String::new())
        );
    }

    #[test]
    fn test_wrong_shapes_fail() {
        let err = Payload::classify(json!({"numbers": [1, "two"]})).unwrap_err();
        assert!(matches!(err, ServiceError::ProcessingFailed(_)));
        assert!(err.to_string().contains("index 1"));

        let err = Payload::classify(json!({"text": 42})).unwrap_err();
        assert!(err.to_string().contains("must be a string"));

        let err = Payload::classify(json!({"dataset": [{"a": 1}, 7]})).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_non_object_payload_fails() {
        let err = Payload::classify(json!([1, 2, 3])).unwrap_err();
        assert_eq!(
            err,
            ServiceError::processing("expected a JSON object, got array")
        );
    }
}
