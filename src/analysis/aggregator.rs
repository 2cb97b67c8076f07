//! Payload aggregation and summary statistics.
//!
//! This module provides the [`DataProcessor`] service, which summarizes a
//! numeric series, a text document, a record set, or an arbitrary object,
//! and counts how many payloads it has processed.

use chrono::Utc;
use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

use super::payload::Payload;
use super::stats;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{
    ColumnSummary, ColumnType, DatasetSummary, GenericSummary, NumericSummary, ProcessOutput,
    ProcessorStats, TextSummary,
};

/// Number of records echoed back in a dataset summary.
pub const SAMPLE_ROWS: usize = 5;

/// Summarizes payloads and counts successful calls.
#[derive(Debug, Default)]
pub struct DataProcessor {
    processed_count: AtomicU64,
}

impl DataProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a raw JSON payload and summarize it.
    pub fn process(&self, payload: Value) -> ServiceResult<ProcessOutput> {
        let payload = Payload::classify(payload)?;
        self.process_payload(payload)
    }

    /// Summarize an already classified payload.
    ///
    /// The processed counter is incremented once per successful call and
    /// left alone when the payload is rejected.
    pub fn process_payload(&self, payload: Payload) -> ServiceResult<ProcessOutput> {
        debug!("Processing {} payload", payload.kind());

        let output = match payload {
            Payload::Numbers(values) => ProcessOutput::Numbers(summarize_numbers(values)?),
            Payload::Text(text) => ProcessOutput::Text(summarize_text(text)?),
            Payload::Dataset(rows) => ProcessOutput::Dataset(summarize_dataset(rows)?),
            Payload::Generic(object) => {
                let data_size = serde_json::to_string(&object)
                    .map_err(|e| ServiceError::processing(e.to_string()))?
                    .chars()
                    .count();
                let total_processed = self.processed_count.fetch_add(1, Ordering::Relaxed) + 1;
                return Ok(ProcessOutput::Generic(GenericSummary {
                    data_keys: object.keys().cloned().collect(),
                    data_size,
                    data_type: "object".to_string(),
                    processed_at: Utc::now(),
                    total_processed,
                }));
            }
        };

        self.processed_count.fetch_add(1, Ordering::Relaxed);
        Ok(output)
    }

    /// Number of payloads processed successfully since startup.
    pub fn processed_count(&self) -> u64 {
        self.processed_count.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> ProcessorStats {
        ProcessorStats {
            total_processed: self.processed_count(),
            service_status: "active".to_string(),
        }
    }
}

/// Count, sum, mean, median, population std, min and max of a series.
pub fn summarize_numbers(values: Vec<f64>) -> ServiceResult<NumericSummary> {
    let empty = || ServiceError::empty("No numbers provided");

    Ok(NumericSummary {
        count: values.len(),
        sum: stats::sum(&values),
        mean: stats::mean(&values).ok_or_else(empty)?,
        median: stats::median(&values).ok_or_else(empty)?,
        std: stats::population_std(&values).ok_or_else(empty)?,
        min: stats::min(&values).ok_or_else(empty)?,
        max: stats::max(&values).ok_or_else(empty)?,
        processed_at: Utc::now(),
        original_data: values,
    })
}

/// Word, character and sentence counts of a document.
pub fn summarize_text(text: String) -> ServiceResult<TextSummary> {
    if text.is_empty() {
        return Err(ServiceError::empty("No text provided"));
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let total_word_chars: usize = words.iter().map(|w| w.chars().count()).sum();
    let average_word_length = if words.is_empty() {
        0.0
    } else {
        total_word_chars as f64 / words.len() as f64
    };

    Ok(TextSummary {
        word_count: words.len(),
        character_count: text.chars().count(),
        character_count_no_spaces: text.chars().filter(|c| !c.is_whitespace()).count(),
        sentence_count: count_sentences(&text),
        average_word_length,
        processed_at: Utc::now(),
        original_text: text,
    })
}

/// Segments between periods that hold more than whitespace.
fn count_sentences(text: &str) -> usize {
    text.split('.').filter(|s| !s.trim().is_empty()).count()
}

/// Shape, column types, a sample, and per-column statistics of a record set.
pub fn summarize_dataset(rows: Vec<Map<String, Value>>) -> ServiceResult<DatasetSummary> {
    if rows.is_empty() {
        return Err(ServiceError::empty("Empty dataset"));
    }

    let column_names: Vec<String> = rows
        .iter()
        .flat_map(|row| row.keys())
        .collect::<IndexSet<&String>>()
        .into_iter()
        .cloned()
        .collect();

    let data_types: IndexMap<String, ColumnType> = column_names
        .iter()
        .map(|name| (name.clone(), infer_column_type(&rows, name)))
        .collect();

    let numerical_summary: IndexMap<String, ColumnSummary> = data_types
        .iter()
        .filter(|(_, column_type)| column_type.is_numeric())
        .filter_map(|(name, _)| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|row| row.get(name).and_then(Value::as_f64))
                .collect();
            stats::describe(&values).map(|summary| (name.clone(), summary))
        })
        .collect();

    Ok(DatasetSummary {
        rows: rows.len(),
        columns: column_names.len(),
        sample_data: rows.iter().take(SAMPLE_ROWS).cloned().collect(),
        column_names,
        data_types,
        processed_at: Utc::now(),
        numerical_summary: (!numerical_summary.is_empty()).then_some(numerical_summary),
    })
}

/// Infer a column's type from its present values.
///
/// Absent keys and `null` count as missing. Integers with gaps widen to
/// `Float64`; booleans with gaps fall back to `Object`.
fn infer_column_type(rows: &[Map<String, Value>], column: &str) -> ColumnType {
    let mut present = 0usize;
    let mut has_missing = false;
    let mut all_numbers = true;
    let mut all_integers = true;
    let mut all_bools = true;

    for row in rows {
        match row.get(column) {
            None | Some(Value::Null) => has_missing = true,
            Some(Value::Number(n)) => {
                present += 1;
                all_bools = false;
                if !(n.is_i64() || n.is_u64()) {
                    all_integers = false;
                }
            }
            Some(Value::Bool(_)) => {
                present += 1;
                all_numbers = false;
                all_integers = false;
            }
            Some(_) => {
                present += 1;
                all_numbers = false;
                all_integers = false;
                all_bools = false;
            }
        }
    }

    if present == 0 {
        ColumnType::Object
    } else if all_numbers {
        if all_integers && !has_missing {
            ColumnType::Int64
        } else {
            ColumnType::Float64
        }
    } else if all_bools && !has_missing {
        ColumnType::Bool
    } else {
        ColumnType::Object
    }
}
