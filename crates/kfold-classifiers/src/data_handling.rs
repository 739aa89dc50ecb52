//! Loading pickled datasets into feature matrices and encoded targets.
//!
//! The pickle must hold a dict with the feature table under `features`
//! (or `data` / `X`) and the labels under `labels` (or `target` / `y`).
//! Labels may be booleans, integers, floats or strings; they are encoded
//! to class indices in sorted label order.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::BufReader;
use std::path::Path;

use ndarray::{Array1, Array2, Axis};
use serde::Deserialize;
use serde_pickle::DeOptions;

use crate::error::{ClassifyError, Result};

/// A non-integral float label, totally ordered via `f64::total_cmp`.
#[derive(Debug, Clone, Copy)]
pub struct FloatLabel(pub f64);

impl PartialEq for FloatLabel {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatLabel {}

impl PartialOrd for FloatLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for FloatLabel {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Label shapes accepted from the pickle, before normalisation.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLabel {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// An original class label as found in the pickle.
///
/// Floats with an integral value are stored as `Int`, so `1.0` and `1`
/// name the same class.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "RawLabel")]
pub enum ClassLabel {
    Bool(bool),
    Int(i64),
    Float(FloatLabel),
    Text(String),
}

impl From<RawLabel> for ClassLabel {
    fn from(raw: RawLabel) -> Self {
        match raw {
            RawLabel::Bool(b) => ClassLabel::Bool(b),
            RawLabel::Int(v) => ClassLabel::Int(v),
            RawLabel::Float(v) => ClassLabel::from(v),
            RawLabel::Text(s) => ClassLabel::Text(s),
        }
    }
}

impl From<f64> for ClassLabel {
    fn from(v: f64) -> Self {
        // i64::MIN..=i64::MAX as f64 bounds; 2^63 itself does not fit.
        if v.fract() == 0.0 && v >= -9.223_372_036_854_776e18 && v < 9.223_372_036_854_776e18 {
            ClassLabel::Int(v as i64)
        } else {
            ClassLabel::Float(FloatLabel(v))
        }
    }
}

impl ClassLabel {
    fn is_finite(&self) -> bool {
        match self {
            ClassLabel::Float(FloatLabel(v)) => v.is_finite(),
            _ => true,
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClassLabel::Bool(true) => f.write_str("True"),
            ClassLabel::Bool(false) => f.write_str("False"),
            ClassLabel::Int(v) => write!(f, "{}", v),
            ClassLabel::Float(FloatLabel(v)) => write!(f, "{}", v),
            ClassLabel::Text(s) => write!(f, "'{}'", s),
        }
    }
}

#[derive(Deserialize, Debug)]
struct PickledDataset {
    #[serde(alias = "data", alias = "X")]
    features: Vec<Vec<f64>>,
    #[serde(alias = "target", alias = "y")]
    labels: Vec<ClassLabel>,
}

/// Feature matrix, encoded targets and the label each class index stands for.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub x: Array2<f64>,
    pub y: Array1<usize>,
    pub classes: Vec<ClassLabel>,
}

impl Dataset {
    /// Build a dataset from raw rows and labels, validating shape and values.
    pub fn from_rows(rows: Vec<Vec<f64>>, labels: Vec<ClassLabel>) -> Result<Self> {
        if rows.is_empty() {
            return Err(ClassifyError::InvalidDataset("dataset has no samples".into()));
        }
        if rows.len() != labels.len() {
            return Err(ClassifyError::InvalidDataset(format!(
                "{} feature rows but {} labels",
                rows.len(),
                labels.len()
            )));
        }

        if let Some(i) = labels.iter().position(|l| !l.is_finite()) {
            return Err(ClassifyError::InvalidDataset(format!(
                "non-finite label at row {}",
                i
            )));
        }

        let n_features = rows[0].len();
        if n_features == 0 {
            return Err(ClassifyError::InvalidDataset("samples have no features".into()));
        }

        let n_samples = rows.len();
        let mut data = Vec::with_capacity(n_samples * n_features);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_features {
                return Err(ClassifyError::InvalidDataset(format!(
                    "row {} has {} features, expected {}",
                    i,
                    row.len(),
                    n_features
                )));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(ClassifyError::InvalidDataset(format!(
                    "non-finite value at row {}, column {}",
                    i, j
                )));
            }
            data.extend(row);
        }

        let x = Array2::from_shape_vec((n_samples, n_features), data)
            .map_err(|e| ClassifyError::InvalidDataset(e.to_string()))?;

        let classes: Vec<ClassLabel> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let y = labels
            .iter()
            .map(|label| {
                classes
                    .binary_search(label)
                    .map_err(|_| ClassifyError::InvalidDataset(format!("unknown label {}", label)))
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(Dataset {
            x,
            y: Array1::from_vec(y),
            classes,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Rows and targets at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> (Array2<f64>, Array1<usize>) {
        (
            self.x.select(Axis(0), indices),
            self.y.select(Axis(0), indices),
        )
    }

    pub fn log_summary(&self) {
        log::info!(
            "Loaded {} samples with {} features across {} classes",
            self.n_samples(),
            self.n_features(),
            self.n_classes()
        );
        for (k, label) in self.classes.iter().enumerate() {
            let count = self.y.iter().filter(|&&c| c == k).count();
            log::debug!("  class {} ({}): {} samples", k, label, count);
        }
    }
}

/// Read a pickled dataset from `path`.
pub fn load_pickle<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ClassifyError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let pickled: PickledDataset =
        serde_pickle::from_reader(BufReader::new(file), DeOptions::new().decode_strings())
            .map_err(|source| ClassifyError::Pickle {
                path: path.to_path_buf(),
                source,
            })?;

    log::debug!("Unpickled {} rows from {}", pickled.features.len(), path.display());
    Dataset::from_rows(pickled.features, pickled.labels)
}
