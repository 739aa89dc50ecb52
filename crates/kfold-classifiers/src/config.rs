use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClassifyError;

/// Number of trees grown by the `random_forest` method.
pub const RANDOM_FOREST_ESTIMATORS: usize = 500;

/// How many features each forest tree may look at.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// `ceil(sqrt(n_features))`
    Sqrt,
    All,
    /// Fraction of the features, clamped to at least one.
    Fraction(f64),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let k = match *self {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fraction(p) => (p * n_features as f64).ceil() as usize,
        };
        k.clamp(1, n_features.max(1))
    }
}

/// Supported classifiers and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    Svm {
        /// Penalty applied to both classes of every pairwise machine.
        c: f64,
        /// Gaussian kernel width; `None` derives it from the training data.
        gaussian_kernel_eps: Option<f64>,
        /// Solver stopping tolerance.
        eps: f64,
    },
    RandomForest {
        n_estimators: usize,
        max_depth: Option<usize>,
        max_features: MaxFeatures,
        bootstrap: bool,
    },
}

impl ModelType {
    pub fn svm() -> Self {
        ModelType::Svm {
            c: 1.0,
            gaussian_kernel_eps: None,
            eps: 1e-3,
        }
    }

    pub fn random_forest() -> Self {
        ModelType::RandomForest {
            n_estimators: RANDOM_FOREST_ESTIMATORS,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
        }
    }

    /// The method name this configuration is selected by.
    pub fn name(&self) -> &'static str {
        match self {
            ModelType::Svm { .. } => "svm",
            ModelType::RandomForest { .. } => "random_forest",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelType {
    type Err = ClassifyError;

    /// Method names are matched exactly; there is no case folding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "svm" => Ok(ModelType::svm()),
            "random_forest" => Ok(ModelType::random_forest()),
            _ => Err(ClassifyError::UnsupportedMethod(s.to_string())),
        }
    }
}
