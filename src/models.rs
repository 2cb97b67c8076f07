//! Data models for the backend.
//!
//! This module contains the result structures returned by the aggregator
//! and the predictor, plus the static user records served by the API.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::ServiceResult;

/// Summary of a numeric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// The series as received.
    pub original_data: Vec<f64>,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (denominator N).
    pub std: f64,
    pub min: f64,
    pub max: f64,
    pub processed_at: DateTime<Utc>,
}

/// Summary of a text document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSummary {
    pub original_text: String,
    pub word_count: usize,
    /// Number of characters (Unicode scalar values).
    pub character_count: usize,
    /// Number of characters that are not whitespace.
    pub character_count_no_spaces: usize,
    pub sentence_count: usize,
    pub average_word_length: f64,
    pub processed_at: DateTime<Utc>,
}

/// Inferred type of a record-set column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Every row holds an integer.
    Int64,
    /// Every present value is a number, and at least one is fractional or missing.
    Float64,
    /// Every row holds a boolean.
    Bool,
    /// Anything else.
    Object,
}

impl ColumnType {
    /// Returns true for columns that get a numerical summary.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Int64 | ColumnType::Float64)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::Int64 => write!(f, "int64"),
            ColumnType::Float64 => write!(f, "float64"),
            ColumnType::Bool => write!(f, "bool"),
            ColumnType::Object => write!(f, "object"),
        }
    }
}

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Number of present (non-missing) values.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` when fewer than two values are present.
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub q25: f64,
    #[serde(rename = "50%")]
    pub q50: f64,
    #[serde(rename = "75%")]
    pub q75: f64,
    pub max: f64,
}

/// Structural summary of a record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    /// Union of record keys, in first-seen order.
    pub column_names: Vec<String>,
    pub data_types: IndexMap<String, ColumnType>,
    /// The first few records, verbatim.
    pub sample_data: Vec<Map<String, Value>>,
    pub processed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numerical_summary: Option<IndexMap<String, ColumnSummary>>,
}

/// Fallback summary for payloads with no recognised key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenericSummary {
    pub data_keys: Vec<String>,
    /// Length of the compact JSON form of the payload.
    pub data_size: usize,
    pub data_type: String,
    pub processed_at: DateTime<Utc>,
    pub total_processed: u64,
}

/// Output of the aggregator, one variant per payload shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProcessOutput {
    Numbers(NumericSummary),
    Text(TextSummary),
    Dataset(DatasetSummary),
    Generic(GenericSummary),
}

/// Counters reported by the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorStats {
    pub total_processed: u64,
    pub service_status: String,
}

/// Binary classification label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Positive,
    Negative,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Positive => write!(f, "positive"),
            Classification::Negative => write!(f, "negative"),
        }
    }
}

/// Static description of the model attached to every prediction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(rename = "type")]
    pub model_type: String,
    pub features_count: usize,
    pub trained: bool,
}

/// Result of scoring one feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Linear score before the logistic transform.
    pub raw_prediction: f64,
    pub probability: f64,
    pub classification: Classification,
    /// Distance from the decision boundary, scaled to [0, 1].
    pub confidence: f64,
    /// The normalized feature vector actually scored.
    pub features_used: Vec<f64>,
    pub model_info: ModelInfo,
}

/// One slot of a batch prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Prediction(Prediction),
    Failed { error: String },
}

impl From<ServiceResult<Prediction>> for BatchEntry {
    fn from(result: ServiceResult<Prediction>) -> Self {
        match result {
            Ok(prediction) => BatchEntry::Prediction(prediction),
            Err(e) => BatchEntry::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Outcome of a mock training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub status: String,
    pub samples_used: usize,
    pub new_weights: Vec<f64>,
    /// Placeholder figure; not measured against any data.
    pub accuracy: f64,
    pub epochs: u32,
}

/// Model state reported by the predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelStats {
    pub model_loaded: bool,
    pub predictions_made: u64,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub feature_count: usize,
}

/// A user record served by the sample users endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub name: String,
    pub email: String,
}

/// The fixed list returned by `GET /api/users`.
pub fn sample_users() -> Vec<User> {
    vec![
        User {
            id: 1,
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
        },
        User {
            id: 2,
            name: "Jane Smith".to_string(),
            email: "jane@example.com".to_string(),
        },
    ]
}
