use linfa::prelude::*;
use linfa_trees::DecisionTree;
use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::config::{MaxFeatures, ModelType};
use crate::error::{ClassifyError, Result};
use crate::models::classifier_trait::{argmax_vote, ClassifierModel};

const NAME: &str = "random_forest";

/// A decision tree together with the feature columns it was grown on.
struct ForestTree {
    features: Vec<usize>,
    tree: DecisionTree<f64, usize>,
}

impl ForestTree {
    fn predict(&self, x: &Array2<f64>) -> Array1<usize> {
        let view = x.select(Axis(1), &self.features);
        self.tree.predict(&view)
    }
}

/// Bagged ensemble of decision trees, each on a random feature subspace.
pub struct RandomForestClassifier {
    params: ModelType,
    seed: u64,
    n_classes: usize,
    trees: Vec<ForestTree>,
}

impl RandomForestClassifier {
    pub fn new(params: ModelType, seed: u64) -> Self {
        RandomForestClassifier {
            params,
            seed,
            n_classes: 0,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Draw the rows and feature columns one tree is grown on.
fn draw_sample<R: Rng>(
    rng: &mut R,
    n_samples: usize,
    n_features: usize,
    max_features: MaxFeatures,
    bootstrap: bool,
) -> (Vec<usize>, Vec<usize>) {
    let rows = if bootstrap {
        (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
    } else {
        (0..n_samples).collect()
    };

    let k = max_features.resolve(n_features);
    let mut features = rand::seq::index::sample(rng, n_features, k).into_vec();
    features.sort_unstable();

    (rows, features)
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        let ModelType::RandomForest {
            n_estimators,
            max_depth,
            max_features,
            bootstrap,
        } = self.params
        else {
            return Err(ClassifyError::Fit {
                model: NAME,
                reason: format!("expected random_forest parameters, got {}", self.params),
            });
        };

        if x.nrows() == 0 {
            return Err(ClassifyError::Fit {
                model: NAME,
                reason: "empty training set".into(),
            });
        }
        if n_estimators == 0 {
            return Err(ClassifyError::Fit {
                model: NAME,
                reason: "n_estimators must be at least 1".into(),
            });
        }

        let (n_samples, n_features) = x.dim();
        let seed = self.seed;
        log::trace!(
            "Growing {} trees on {} samples, {} of {} features each",
            n_estimators,
            n_samples,
            max_features.resolve(n_features),
            n_features
        );

        let trees = (0..n_estimators)
            .into_par_iter()
            .map(|t| -> Result<ForestTree> {
                let mut rng = StdRng::seed_from_u64(seed.wrapping_add(t as u64));
                let (rows, features) =
                    draw_sample(&mut rng, n_samples, n_features, max_features, bootstrap);

                let records = x.select(Axis(0), &rows).select(Axis(1), &features);
                let targets = y.select(Axis(0), &rows);
                let dataset = Dataset::new(records, targets);

                let tree = DecisionTree::<f64, usize>::params()
                    .max_depth(max_depth)
                    .fit(&dataset)
                    .map_err(|e| ClassifyError::Fit {
                        model: NAME,
                        reason: e.to_string(),
                    })?;

                Ok(ForestTree { features, tree })
            })
            .collect::<Result<Vec<_>>>()?;

        self.n_classes = n_classes;
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        if self.trees.is_empty() {
            return Err(ClassifyError::NotFitted(NAME));
        }

        let per_tree: Vec<Array1<usize>> = self.trees.par_iter().map(|t| t.predict(x)).collect();

        let mut votes = Array2::<usize>::zeros((x.nrows(), self.n_classes));
        for predictions in &per_tree {
            for (row, &class) in predictions.iter().enumerate() {
                votes[(row, class)] += 1;
            }
        }
        Ok(votes.rows().into_iter().map(argmax_vote).collect())
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_forest(n_estimators: usize) -> ModelType {
        ModelType::RandomForest {
            n_estimators,
            max_depth: None,
            max_features: MaxFeatures::All,
            bootstrap: true,
        }
    }

    #[test]
    fn separates_threshold_data() {
        let x = Array2::from_shape_vec((8, 1), vec![0.0, 0.5, 1.0, 1.5, 8.0, 8.5, 9.0, 9.5]).unwrap();
        let y = Array1::from_vec(vec![0, 0, 0, 0, 1, 1, 1, 1]);
        let mut forest = RandomForestClassifier::new(small_forest(25), 3);
        forest.fit(&x, &y, 2).unwrap();
        assert_eq!(forest.n_trees(), 25);

        let unseen = Array2::from_shape_vec((2, 1), vec![0.2, 9.2]).unwrap();
        assert_eq!(forest.predict(&unseen).unwrap().to_vec(), vec![0, 1]);
    }

    #[test]
    fn single_class_fold_predicts_that_class() {
        let x = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let y = Array1::from_vec(vec![2, 2, 2]);
        let mut forest = RandomForestClassifier::new(small_forest(5), 8);
        forest.fit(&x, &y, 3).unwrap();

        let unseen = Array2::from_shape_vec((2, 1), vec![-4.0, 7.5]).unwrap();
        assert_eq!(forest.predict(&unseen).unwrap().to_vec(), vec![2, 2]);
    }

    #[test]
    fn same_seed_same_predictions() {
        let x = Array2::from_shape_vec(
            (6, 2),
            vec![0.0, 1.0, 1.0, 0.0, 0.5, 0.5, 5.0, 6.0, 6.0, 5.0, 5.5, 5.5],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0, 0, 0, 1, 1, 1]);
        let params = ModelType::RandomForest {
            n_estimators: 11,
            max_depth: Some(2),
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
        };

        let mut a = RandomForestClassifier::new(params.clone(), 99);
        let mut b = RandomForestClassifier::new(params, 99);
        a.fit(&x, &y, 2).unwrap();
        b.fit(&x, &y, 2).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn bootstrap_sample_has_requested_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let (rows, features) = draw_sample(&mut rng, 10, 9, MaxFeatures::Sqrt, true);
        assert_eq!(rows.len(), 10);
        assert!(rows.iter().all(|&r| r < 10));
        assert_eq!(features.len(), 3);
        assert!(features.windows(2).all(|w| w[0] < w[1]));

        let (rows, _) = draw_sample(&mut rng, 4, 2, MaxFeatures::All, false);
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn predict_before_fit_errors() {
        let forest = RandomForestClassifier::new(small_forest(3), 0);
        let x = Array2::zeros((2, 1));
        assert!(matches!(
            forest.predict(&x),
            Err(ClassifyError::NotFitted("random_forest"))
        ));
    }
}
