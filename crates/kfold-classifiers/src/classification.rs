//! Repeated k-fold cross-validation of a classifier over a pickled dataset.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ModelType;
use crate::data_handling::{load_pickle, Dataset};
use crate::error::{ClassifyError, Result};
use crate::metrics::{AverageScores, ConfusionMatrix, ScoresPerClass};
use crate::models::factory::build_model;
use crate::partition::KFold;

/// Outcome of a cross-validation run.
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Summed over every fold of every iteration.
    pub confusion_matrix: ConfusionMatrix,
    pub scores_per_class: ScoresPerClass,
    pub average_scores: AverageScores,
}

/// Load `data_path` and cross-validate `model` on it with a random seed.
///
/// # Arguments
///
/// * `data_path` - Pickled dataset (see [`load_pickle`]).
/// * `partitions` - Number of equal sized folds per iteration.
/// * `iterations` - How many times the whole k-fold procedure is repeated.
/// * `model` - Classifier configuration to build a fresh model from per fold.
pub fn classify<P: AsRef<Path>>(
    data_path: P,
    partitions: usize,
    iterations: usize,
    model: &ModelType,
) -> Result<ClassificationResult> {
    let seed: u64 = rand::thread_rng().gen();
    log::info!("Using random seed {}", seed);
    classify_with_seed(data_path, partitions, iterations, model, seed)
}

/// Same as [`classify`] but reproducible for a given `seed`.
pub fn classify_with_seed<P: AsRef<Path>>(
    data_path: P,
    partitions: usize,
    iterations: usize,
    model: &ModelType,
    seed: u64,
) -> Result<ClassificationResult> {
    let dataset = load_pickle(&data_path)?;
    dataset.log_summary();
    cross_validate(&dataset, partitions, iterations, model, seed)
}

/// Run `iterations` rounds of `partitions`-fold cross-validation.
///
/// Every fold gets a freshly built model; predictions on the held-out rows
/// are accumulated into a single confusion matrix from which all scores
/// are derived.
pub fn cross_validate(
    dataset: &Dataset,
    partitions: usize,
    iterations: usize,
    model_type: &ModelType,
    seed: u64,
) -> Result<ClassificationResult> {
    if iterations == 0 {
        return Err(ClassifyError::InvalidIterations);
    }

    let kfold = KFold::new(partitions);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut matrix = ConfusionMatrix::new(dataset.n_classes());

    for iteration in 0..iterations {
        let folds = kfold.split(dataset.n_samples(), &mut rng)?;
        log::info!(
            "Iteration {}/{}: {}-fold cross-validation with {}",
            iteration + 1,
            iterations,
            kfold.partitions(),
            model_type
        );

        for (fold_idx, fold) in folds.iter().enumerate() {
            let (x_train, y_train) = dataset.select(&fold.train);
            let (x_test, y_test) = dataset.select(&fold.test);

            let mut model = build_model(model_type, rng.gen());
            model.fit(&x_train, &y_train, dataset.n_classes())?;
            let predicted = model.predict(&x_test)?;

            let correct = predicted.iter().zip(&y_test).filter(|(p, a)| p == a).count();
            log::debug!(
                "Fold {}: trained {} on {} samples, {}/{} test samples correct",
                fold_idx,
                model.name(),
                fold.train.len(),
                correct,
                fold.test.len()
            );

            matrix.record(&y_test, &predicted);
        }
    }

    let scores_per_class = ScoresPerClass::from_matrix(&matrix, &dataset.classes);
    let average_scores = AverageScores::from_matrix(&matrix);
    log::info!(
        "Cross-validation finished: accuracy {:.4} over {} predictions",
        average_scores.accuracy,
        matrix.total()
    );

    Ok(ClassificationResult {
        confusion_matrix: matrix,
        scores_per_class,
        average_scores,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MaxFeatures;
    use crate::data_handling::ClassLabel;

    fn two_clusters(n_per_class: usize) -> Dataset {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n_per_class {
            let d = i as f64 * 0.05;
            rows.push(vec![d, 1.0 - d]);
            labels.push(ClassLabel::Text("low".into()));
            rows.push(vec![20.0 + d, 21.0 - d]);
            labels.push(ClassLabel::Text("high".into()));
        }
        Dataset::from_rows(rows, labels).unwrap()
    }

    fn quick_forest() -> ModelType {
        ModelType::RandomForest {
            n_estimators: 15,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
        }
    }

    #[test]
    fn every_sample_is_tested_once_per_iteration() {
        let dataset = two_clusters(10);
        let result = cross_validate(&dataset, 4, 3, &quick_forest(), 5).unwrap();
        assert_eq!(result.confusion_matrix.total(), 20 * 3);
        assert_eq!(result.confusion_matrix.n_classes(), 2);
    }

    #[test]
    fn separable_clusters_score_perfectly() {
        let dataset = two_clusters(10);
        for model in [ModelType::svm(), quick_forest()] {
            let result = cross_validate(&dataset, 5, 2, &model, 11).unwrap();
            assert_eq!(result.average_scores.accuracy, 1.0, "{} misclassified", model);
            assert_eq!(result.average_scores.f1, 1.0);
        }
    }

    #[test]
    fn per_class_support_sums_iterations() {
        let dataset = two_clusters(6);
        let result = cross_validate(&dataset, 3, 2, &ModelType::svm(), 1).unwrap();
        let high = result
            .scores_per_class
            .get(&ClassLabel::Text("high".into()))
            .unwrap();
        assert_eq!(high.support, 12);
    }

    #[test]
    fn zero_iterations_rejected() {
        let dataset = two_clusters(4);
        let err = cross_validate(&dataset, 2, 0, &ModelType::svm(), 0).unwrap_err();
        assert!(matches!(err, ClassifyError::InvalidIterations));
    }

    #[test]
    fn too_many_partitions_rejected() {
        let dataset = two_clusters(2);
        let err = cross_validate(&dataset, 5, 1, &ModelType::svm(), 0).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InvalidPartitions {
                partitions: 5,
                samples: 4
            }
        ));
    }
}
