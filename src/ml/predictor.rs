//! Mock linear classifier.
//!
//! A fixed-dimension linear model scored through the logistic function.
//! The only way the weights change is [`Predictor::train_mock`], which adds
//! Gaussian noise and reports a placeholder accuracy.

use anyhow::{anyhow, bail, Result};
use indexmap::IndexMap;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde_json::Value;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use crate::analysis::payload::json_type_name;
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Classification, ModelInfo, ModelStats, Prediction, TrainingReport};

pub const DEFAULT_WEIGHTS: [f64; 4] = [0.5, -0.3, 0.8, 0.2];
pub const DEFAULT_BIAS: f64 = 0.1;
pub const DEFAULT_TRAINING_NOISE_STD: f64 = 0.1;

pub const MODEL_TYPE: &str = "linear_classifier";
pub const TRAINING_EPOCHS: u32 = 10;
const MOCK_ACCURACY: RangeInclusive<f64> = 0.8..=0.95;

/// Weights and bias of the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Vec<f64>,
    bias: f64,
}

impl Default for LinearModel {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHTS.to_vec(), DEFAULT_BIAS)
    }
}

impl LinearModel {
    pub fn new(weights: Vec<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    /// Number of features the model expects.
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Pad with trailing zeros or truncate from the end to the model dimension.
    pub fn normalize(&self, features: &[f64]) -> Vec<f64> {
        let mut normalized = features.to_vec();
        normalized.resize(self.dimension(), 0.0);
        normalized
    }

    /// `dot(features, weights) + bias` over normalized features.
    pub fn score(&self, features: &[f64]) -> f64 {
        features
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.bias
    }

    fn perturb<R: Rng>(&mut self, noise: &Normal<f64>, rng: &mut R) {
        for weight in &mut self.weights {
            *weight += noise.sample(rng);
        }
    }
}

/// Standard logistic function.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Read a JSON value as a feature list. `null` reads as an empty list.
pub fn parse_features(value: &Value) -> ServiceResult<Vec<f64>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_f64().ok_or_else(|| {
                    ServiceError::prediction(format!(
                        "feature {} is a {}, expected a number",
                        i,
                        json_type_name(item)
                    ))
                })
            })
            .collect(),
        other => Err(ServiceError::prediction(format!(
            "features must be an array, got {}",
            json_type_name(other)
        ))),
    }
}

/// Scores feature vectors against a shared [`LinearModel`].
#[derive(Debug)]
pub struct Predictor {
    model: RwLock<LinearModel>,
    noise: Normal<f64>,
    prediction_count: AtomicU64,
}

impl Predictor {
    /// Create a predictor; `training_noise_std` is the spread of the
    /// perturbation applied by mock training.
    pub fn new(model: LinearModel, training_noise_std: f64) -> Result<Self> {
        if !training_noise_std.is_finite() || training_noise_std < 0.0 {
            bail!(
                "Training noise std must be finite and non-negative, got {}",
                training_noise_std
            );
        }
        let noise = Normal::new(0.0, training_noise_std)
            .map_err(|e| anyhow!("Invalid training noise std {}: {}", training_noise_std, e))?;

        Ok(Self {
            model: RwLock::new(model),
            noise,
            prediction_count: AtomicU64::new(0),
        })
    }

    fn read_model(&self) -> ServiceResult<RwLockReadGuard<'_, LinearModel>> {
        self.model
            .read()
            .map_err(|_| ServiceError::prediction("model state is poisoned"))
    }

    fn write_model(&self) -> ServiceResult<RwLockWriteGuard<'_, LinearModel>> {
        self.model
            .write()
            .map_err(|_| ServiceError::prediction("model state is poisoned"))
    }

    /// Score one feature vector.
    pub fn predict(&self, features: &[f64]) -> ServiceResult<Prediction> {
        if features.is_empty() {
            return Err(ServiceError::empty("No features provided"));
        }
        if let Some(i) = features.iter().position(|f| !f.is_finite()) {
            return Err(ServiceError::prediction(format!(
                "feature {} is not a finite number",
                i
            )));
        }

        let prediction = {
            let model = self.read_model()?;
            let features_used = model.normalize(features);
            let raw_prediction = model.score(&features_used);
            let probability = sigmoid(raw_prediction);

            Prediction {
                raw_prediction,
                probability,
                classification: if probability > 0.5 {
                    Classification::Positive
                } else {
                    Classification::Negative
                },
                confidence: (probability - 0.5).abs() * 2.0,
                features_used,
                model_info: ModelInfo {
                    model_type: MODEL_TYPE.to_string(),
                    features_count: model.dimension(),
                    trained: true,
                },
            }
        };

        self.prediction_count.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Predicted {} (p={:.4})",
            prediction.classification, prediction.probability
        );
        Ok(prediction)
    }

    /// Score a feature list still in JSON form.
    pub fn predict_value(&self, features: &Value) -> ServiceResult<Prediction> {
        self.predict(&parse_features(features)?)
    }

    /// Score every entry independently, one result per input, in order.
    pub fn predict_batch_values(&self, batch: &[Value]) -> Vec<ServiceResult<Prediction>> {
        batch.iter().map(|f| self.predict_value(f)).collect()
    }

    /// Each weight's share of the total absolute weight, keyed `feature_<i>`.
    pub fn feature_importance(&self) -> ServiceResult<IndexMap<String, f64>> {
        let model = self.read_model()?;
        let total: f64 = model.weights().iter().map(|w| w.abs()).sum();
        if total == 0.0 {
            return Err(ServiceError::prediction(
                "feature importance is undefined for all-zero weights",
            ));
        }

        Ok(model
            .weights()
            .iter()
            .enumerate()
            .map(|(i, w)| (format!("feature_{}", i), w.abs() / total))
            .collect())
    }

    /// Perturb the weights with Gaussian noise. Sample content is ignored.
    pub fn train_mock(&self, samples: &[Value]) -> ServiceResult<TrainingReport> {
        self.train_mock_with(samples, &mut rand::rng())
    }

    pub fn train_mock_with<R: Rng>(
        &self,
        samples: &[Value],
        rng: &mut R,
    ) -> ServiceResult<TrainingReport> {
        if samples.is_empty() {
            return Err(ServiceError::empty("No training data provided"));
        }

        let new_weights = {
            let mut model = self.write_model()?;
            model.perturb(&self.noise, rng);
            model.weights().to_vec()
        };

        info!(
            "Mock training on {} samples, weights now {:?}",
            samples.len(),
            new_weights
        );

        Ok(TrainingReport {
            status: "trained".to_string(),
            samples_used: samples.len(),
            new_weights,
            accuracy: rng.random_range(MOCK_ACCURACY),
            epochs: TRAINING_EPOCHS,
        })
    }

    /// Number of successful predictions since startup.
    pub fn prediction_count(&self) -> u64 {
        self.prediction_count.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> ServiceResult<ModelStats> {
        let model = self.read_model()?;
        Ok(ModelStats {
            model_loaded: true,
            predictions_made: self.prediction_count(),
            weights: model.weights().to_vec(),
            bias: model.bias(),
            feature_count: model.dimension(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn default_predictor() -> Predictor {
        Predictor::new(LinearModel::default(), DEFAULT_TRAINING_NOISE_STD).unwrap()
    }

    #[test]
    fn test_normalize_pads_and_truncates() {
        let model = LinearModel::default();
        assert_eq!(model.normalize(&[1.0, 2.0]), vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(
            model.normalize(&[1.0, 2.0, 3.0, 4.0, 5.0]),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn test_zero_features_hit_bias_only() {
        let prediction = default_predictor().predict(&[0.0, 0.0, 0.0, 0.0]).unwrap();
        assert!((prediction.raw_prediction - 0.1).abs() < 1e-12);
        assert!((prediction.probability - 0.5250).abs() < 1e-4);
        assert_eq!(prediction.classification, Classification::Positive);
        assert!((prediction.confidence - 0.0499).abs() < 1e-4);
    }

    #[test]
    fn test_prediction_details() {
        let predictor = default_predictor();
        let prediction = predictor.predict(&[1.0, 2.0]).unwrap();
        // 1 * 0.5 + 2 * -0.3 + 0.1
        assert!(prediction.raw_prediction.abs() < 1e-12);
        assert_eq!(prediction.classification, Classification::Negative);
        assert!(prediction.confidence.abs() < 1e-12);
        assert_eq!(prediction.features_used, vec![1.0, 2.0, 0.0, 0.0]);
        assert_eq!(prediction.model_info.model_type, "linear_classifier");
        assert_eq!(prediction.model_info.features_count, 4);
        assert!(prediction.model_info.trained);
    }

    #[test]
    fn test_confidence_in_unit_range() {
        let predictor = default_predictor();
        for features in [[100.0, 0.0, 0.0, 0.0], [-100.0, 0.0, 0.0, 0.0], [0.3, -1.0, 2.0, 0.5]] {
            let prediction = predictor.predict(&features).unwrap();
            assert!((0.0..=1.0).contains(&prediction.confidence));
        }
    }

    #[test]
    fn test_predict_errors() {
        let predictor = default_predictor();
        assert_eq!(
            predictor.predict(&[]).unwrap_err(),
            ServiceError::empty("No features provided")
        );
        assert!(matches!(
            predictor.predict(&[1.0, f64::NAN]).unwrap_err(),
            ServiceError::PredictionFailed(_)
        ));
        assert!(matches!(
            predictor.predict_value(&json!(["a", 1])).unwrap_err(),
            ServiceError::PredictionFailed(_)
        ));
        assert!(predictor
            .predict_value(&json!(null))
            .unwrap_err()
            .is_empty_input());
        assert_eq!(predictor.prediction_count(), 0);
    }

    #[test]
    fn test_predict_batch_keeps_order_and_isolates_failures() {
        let predictor = default_predictor();
        let batch = [json!([1]), json!([]), json!("bad"), json!([0, 0, 0, 0])];
        let results = predictor.predict_batch_values(&batch);

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().unwrap().features_used, vec![1.0, 0.0, 0.0, 0.0]);
        assert!(results[1].as_ref().unwrap_err().is_empty_input());
        assert!(matches!(results[2], Err(ServiceError::PredictionFailed(_))));
        assert!(results[3].is_ok());
        assert_eq!(predictor.prediction_count(), 2);
    }

    #[test]
    fn test_feature_importance_sums_to_one() {
        let importance = default_predictor().feature_importance().unwrap();
        assert_eq!(importance.len(), 4);
        assert!(importance.values().all(|v| *v >= 0.0));
        assert!((importance.values().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!((importance["feature_2"] - 0.8 / 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_feature_importance_zero_weights() {
        let predictor = Predictor::new(LinearModel::new(vec![0.0; 3], 0.0), 0.1).unwrap();
        assert!(predictor.feature_importance().is_err());
    }

    #[test]
    fn test_train_mock_reports_fixed_epochs() {
        let predictor = default_predictor();
        let mut rng = StdRng::seed_from_u64(42);
        let report = predictor
            .train_mock_with(&[json!({"x": 1}), json!({"x": 2})], &mut rng)
            .unwrap();

        assert_eq!(report.status, "trained");
        assert_eq!(report.samples_used, 2);
        assert_eq!(report.epochs, 10);
        assert!((0.8..=0.95).contains(&report.accuracy));
        assert_eq!(report.new_weights, predictor.stats().unwrap().weights);
    }

    #[test]
    fn test_train_mock_without_noise_keeps_weights() {
        let predictor = Predictor::new(LinearModel::default(), 0.0).unwrap();
        let report = predictor.train_mock(&[json!({})]).unwrap();
        assert_eq!(report.new_weights, DEFAULT_WEIGHTS.to_vec());
    }

    #[test]
    fn test_train_mock_empty() {
        let predictor = default_predictor();
        let err = predictor.train_mock(&[]).unwrap_err();
        assert_eq!(err, ServiceError::empty("No training data provided"));
        assert_eq!(predictor.stats().unwrap().weights, DEFAULT_WEIGHTS.to_vec());
    }

    #[test]
    fn test_invalid_noise_std() {
        assert!(Predictor::new(LinearModel::default(), -1.0).is_err());
        assert!(Predictor::new(LinearModel::default(), f64::NAN).is_err());
        assert!(Predictor::new(LinearModel::default(), f64::INFINITY).is_err());
        assert!(Predictor::new(LinearModel::default(), 0.0).is_ok());
    }

    #[test]
    fn test_stats() {
        let predictor = default_predictor();
        predictor.predict(&[1.0]).unwrap();
        let stats = predictor.stats().unwrap();
        assert!(stats.model_loaded);
        assert_eq!(stats.predictions_made, 1);
        assert_eq!(stats.bias, DEFAULT_BIAS);
        assert_eq!(stats.feature_count, 4);
    }
}
