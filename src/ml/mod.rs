//! Machine learning modules.

pub mod predictor;

pub use predictor::{LinearModel, Predictor};
