//! kfold-classifiers: repeated k-fold cross-validation of classifiers.
//!
//! This crate loads pickled datasets, partitions them into folds, trains
//! SVM or random forest models (built on linfa) per fold and reduces the
//! held-out predictions to a confusion matrix with per-class and averaged
//! scores.
pub mod classification;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod metrics;
pub mod models;
pub mod partition;

pub use classification::{classify, classify_with_seed, cross_validate, ClassificationResult};
pub use config::ModelType;
pub use error::{ClassifyError, Result};
