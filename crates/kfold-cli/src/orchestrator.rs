//! Select a classifier for the requested method, delegate the
//! cross-validation and print its three result fields.
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use kfold_classifiers::{ClassificationResult, ModelType};

/// Parameters of a single `kfold` run.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub method: String,
    pub data_path: PathBuf,
    pub partitions: usize,
    pub iterations: usize,
}

/// The routine the orchestrator hands the actual work to.
pub trait Classify {
    fn classify(
        &self,
        data_path: &Path,
        partitions: usize,
        iterations: usize,
        model: &ModelType,
    ) -> kfold_classifiers::Result<ClassificationResult>;
}

/// Delegates to [`kfold_classifiers::classify`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LibraryClassifier;

impl Classify for LibraryClassifier {
    fn classify(
        &self,
        data_path: &Path,
        partitions: usize,
        iterations: usize,
        model: &ModelType,
    ) -> kfold_classifiers::Result<ClassificationResult> {
        kfold_classifiers::classify(data_path, partitions, iterations, model)
    }
}

/// Map a method name onto its classifier configuration.
pub fn select_model(method: &str) -> Result<ModelType> {
    let model: ModelType = method.parse()?;
    let config_json =
        serde_json::to_string(&model).context("Failed to serialize model configuration")?;
    log::debug!("Model configuration: {}", config_json);
    Ok(model)
}

/// Run one invocation, writing the confusion matrix, the per-class scores
/// and the average scores to `out`, one per line.
///
/// Nothing is written unless the classification succeeds.
pub fn run<C, W>(invocation: &Invocation, classifier: &C, out: &mut W) -> Result<()>
where
    C: Classify + ?Sized,
    W: Write,
{
    let model = select_model(&invocation.method)?;

    log::info!(
        "[kfold] Classifying {:?} with {} ({} partitions, {} iterations)",
        invocation.data_path,
        model,
        invocation.partitions,
        invocation.iterations
    );

    let result = classifier
        .classify(
            &invocation.data_path,
            invocation.partitions,
            invocation.iterations,
            &model,
        )
        .with_context(|| format!("Classification of {:?} failed", invocation.data_path))?;

    writeln!(out, "{}", result.confusion_matrix)?;
    writeln!(out, "{}", result.scores_per_class)?;
    writeln!(out, "{}", result.average_scores)?;
    out.flush()?;
    Ok(())
}
