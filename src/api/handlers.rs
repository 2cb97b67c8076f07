//! Request handlers.
//!
//! Bodies are read as raw bytes and parsed here, so a missing body, an
//! empty object and a missing key can each be answered the same way
//! regardless of the request's content type.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;
use super::AppState;
use crate::models::{
    sample_users, BatchEntry, ModelStats, Prediction, ProcessOutput, ProcessorStats,
    TrainingReport, User,
};

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    pub result: ProcessOutput,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub success: bool,
    pub prediction: Prediction,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub predictions: Vec<BatchEntry>,
}

#[derive(Debug, Serialize)]
pub struct ImportanceResponse {
    pub feature_importance: IndexMap<String, f64>,
}

#[derive(Debug, Serialize)]
pub struct TrainResponse {
    pub success: bool,
    pub training: TrainingReport,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub processor: ProcessorStats,
    pub model: ModelStats,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub success: bool,
    pub message: &'static str,
    pub user: Value,
}

/// Parse a request body. An empty or whitespace-only body reads as `None`.
fn parse_body(body: &Bytes) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
}

/// True for values that carry no data at all.
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(object) => object.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

/// Take `key` out of a body that must be a JSON object.
fn take_field(body: Option<Value>, key: &str) -> Option<Value> {
    match body {
        Some(Value::Object(mut object)) => object.remove(key),
        _ => None,
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        message: "Rust backend is running!",
    })
}

pub async fn process(State(state): State<AppState>, body: Bytes) -> ApiResult<ProcessResponse> {
    let payload = match parse_body(&body)? {
        Some(value) if !is_blank(&value) => value,
        _ => return Err(ApiError::bad_request("No data provided")),
    };

    let result = state.processor.process(payload)?;
    Ok(Json(ProcessResponse {
        success: true,
        result,
    }))
}

pub async fn predict(State(state): State<AppState>, body: Bytes) -> ApiResult<PredictResponse> {
    let features = take_field(parse_body(&body)?, "features")
        .ok_or_else(|| ApiError::bad_request("Features are required"))?;

    let prediction = state.predictor.predict_value(&features)?;
    Ok(Json(PredictResponse {
        success: true,
        prediction,
    }))
}

pub async fn predict_batch(State(state): State<AppState>, body: Bytes) -> ApiResult<BatchResponse> {
    let batch = match take_field(parse_body(&body)?, "batch") {
        Some(Value::Array(items)) => items,
        _ => return Err(ApiError::bad_request("Batch is required")),
    };

    let predictions = state
        .predictor
        .predict_batch_values(&batch)
        .into_iter()
        .map(BatchEntry::from)
        .collect();

    Ok(Json(BatchResponse {
        success: true,
        predictions,
    }))
}

pub async fn feature_importance(State(state): State<AppState>) -> ApiResult<ImportanceResponse> {
    Ok(Json(ImportanceResponse {
        feature_importance: state.predictor.feature_importance()?,
    }))
}

pub async fn train(State(state): State<AppState>, body: Bytes) -> ApiResult<TrainResponse> {
    let samples = match take_field(parse_body(&body)?, "training_data") {
        Some(Value::Array(items)) => items,
        Some(Value::Null) => Vec::new(),
        Some(_) => return Err(ApiError::bad_request("Training data must be an array")),
        None => return Err(ApiError::bad_request("Training data is required")),
    };

    let training = state.predictor.train_mock(&samples)?;
    Ok(Json(TrainResponse {
        success: true,
        training,
    }))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    Ok(Json(StatsResponse {
        processor: state.processor.stats(),
        model: state.predictor.stats()?,
    }))
}

pub async fn list_users() -> Json<UsersResponse> {
    Json(UsersResponse {
        users: sample_users(),
    })
}

/// Echo the submitted user back without storing it.
pub async fn create_user(body: Bytes) -> Result<(StatusCode, Json<CreateUserResponse>), ApiError> {
    let user = parse_body(&body)?.unwrap_or(Value::Null);
    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            success: true,
            message: "User created",
            user,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(&Bytes::from_static(b"")).unwrap(), None);
        assert_eq!(parse_body(&Bytes::from_static(b" \n")).unwrap(), None);
        assert_eq!(
            parse_body(&Bytes::from_static(br#"{"a": 1}"#)).unwrap(),
            Some(json!({"a": 1}))
        );
        assert!(matches!(
            parse_body(&Bytes::from_static(b"{oops")),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(&json!(null)));
        assert!(is_blank(&json!({})));
        assert!(is_blank(&json!([])));
        assert!(is_blank(&json!("")));
        assert!(is_blank(&json!(false)));
        assert!(is_blank(&json!(0)));
        assert!(is_blank(&json!(0.0)));
        assert!(!is_blank(&json!({"a": null})));
        assert!(!is_blank(&json!(true)));
        assert!(!is_blank(&json!(3)));
    }

    #[test]
    fn test_take_field() {
        assert_eq!(
            take_field(Some(json!({"features": [1]})), "features"),
            Some(json!([1]))
        );
        assert_eq!(take_field(Some(json!([1, 2])), "features"), None);
        assert_eq!(take_field(None, "features"), None);
    }
}
