//! Analysis modules.
//!
//! Payload classification, the aggregator service, and the statistics
//! helpers it is built on.

pub mod aggregator;
pub mod payload;
pub mod stats;

pub use aggregator::DataProcessor;

