use linfa::prelude::*;
use linfa_svm::Svm;
use ndarray::{Array1, Array2, Axis};

use crate::config::ModelType;
use crate::error::{ClassifyError, Result};
use crate::models::classifier_trait::{argmax_vote, ClassifierModel};

const NAME: &str = "svm";

/// One binary machine deciding between classes `pos` and `neg`.
struct PairwiseMachine {
    pos: usize,
    neg: usize,
    model: Svm<f64, bool>,
}

enum Fitted {
    /// The training fold held a single class.
    Constant(usize),
    Pairwise {
        n_classes: usize,
        machines: Vec<PairwiseMachine>,
    },
}

/// Multi-class Gaussian-kernel SVM built from one-vs-one binary machines.
pub struct SVMClassifier {
    params: ModelType,
    fitted: Option<Fitted>,
}

impl SVMClassifier {
    pub fn new(params: ModelType) -> Self {
        SVMClassifier {
            params,
            fitted: None,
        }
    }
}

/// Kernel width matching the "scale" heuristic: `n_features * var(x)`.
fn scaled_kernel_eps(x: &Array2<f64>) -> f64 {
    let n = x.len();
    if n == 0 {
        return 1.0;
    }
    let mean = x.sum() / n as f64;
    let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;
    if var > 0.0 {
        x.ncols() as f64 * var
    } else {
        1.0
    }
}

impl ClassifierModel for SVMClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()> {
        let ModelType::Svm {
            c,
            gaussian_kernel_eps,
            eps,
        } = &self.params
        else {
            return Err(ClassifyError::Fit {
                model: NAME,
                reason: format!("expected svm parameters, got {}", self.params),
            });
        };

        let present: Vec<usize> = (0..n_classes).filter(|k| y.iter().any(|label| label == k)).collect();
        match present.as_slice() {
            [] => {
                return Err(ClassifyError::Fit {
                    model: NAME,
                    reason: "empty training set".into(),
                })
            }
            [only] => {
                log::trace!("SVM training fold holds only class {}", only);
                self.fitted = Some(Fitted::Constant(*only));
                return Ok(());
            }
            _ => {}
        }

        let width = gaussian_kernel_eps.unwrap_or_else(|| scaled_kernel_eps(x));
        log::trace!("SVM gaussian kernel eps = {:.6}", width);

        let mut machines = Vec::with_capacity(present.len() * (present.len() - 1) / 2);
        for (i, &pos) in present.iter().enumerate() {
            for &neg in &present[i + 1..] {
                let rows: Vec<usize> = y
                    .iter()
                    .enumerate()
                    .filter_map(|(r, &k)| (k == pos || k == neg).then_some(r))
                    .collect();
                let records = x.select(Axis(0), &rows);
                let targets = rows.iter().map(|&r| y[r] == pos).collect::<Array1<bool>>();
                let dataset = Dataset::new(records, targets);

                let model = Svm::<f64, bool>::params()
                    .eps(*eps)
                    .pos_neg_weights(*c, *c)
                    .gaussian_kernel(width)
                    .fit(&dataset)
                    .map_err(|e| ClassifyError::Fit {
                        model: NAME,
                        reason: e.to_string(),
                    })?;

                machines.push(PairwiseMachine { pos, neg, model });
            }
        }

        log::trace!("Fitted {} pairwise SVM machines", machines.len());
        self.fitted = Some(Fitted::Pairwise {
            n_classes,
            machines,
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>> {
        match self.fitted.as_ref().ok_or(ClassifyError::NotFitted(NAME))? {
            Fitted::Constant(class) => Ok(Array1::from_elem(x.nrows(), *class)),
            Fitted::Pairwise {
                n_classes,
                machines,
            } => {
                let mut votes = Array2::<usize>::zeros((x.nrows(), *n_classes));
                for machine in machines {
                    let decisions: Array1<bool> = machine.model.predict(x);
                    for (row, &is_pos) in decisions.iter().enumerate() {
                        let winner = if is_pos { machine.pos } else { machine.neg };
                        votes[(row, winner)] += 1;
                    }
                }
                Ok(votes.rows().into_iter().map(argmax_vote).collect())
            }
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_blobs() -> (Array2<f64>, Array1<usize>) {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        let centres = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)];
        for (k, (cx, cy)) in centres.iter().enumerate() {
            for i in 0..8 {
                let jitter = (i as f64) * 0.1;
                data.push(cx + jitter);
                data.push(cy - jitter);
                labels.push(k);
            }
        }
        (
            Array2::from_shape_vec((labels.len(), 2), data).unwrap(),
            Array1::from_vec(labels),
        )
    }

    #[test]
    fn separates_three_blobs() {
        let (x, y) = three_blobs();
        let mut svm = SVMClassifier::new(ModelType::svm());
        svm.fit(&x, &y, 3).unwrap();
        let predicted = svm.predict(&x).unwrap();
        assert_eq!(predicted, y);
    }

    #[test]
    fn single_class_fold_predicts_that_class() {
        let x = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let y = Array1::from_vec(vec![2, 2, 2]);
        let mut svm = SVMClassifier::new(ModelType::svm());
        svm.fit(&x, &y, 3).unwrap();
        assert_eq!(svm.predict(&x).unwrap().to_vec(), vec![2, 2, 2]);
    }

    #[test]
    fn predict_before_fit_errors() {
        let svm = SVMClassifier::new(ModelType::svm());
        let x = Array2::zeros((1, 1));
        assert!(matches!(svm.predict(&x), Err(ClassifyError::NotFitted("svm"))));
    }

    #[test]
    fn kernel_width_scales_with_variance() {
        let x = Array2::from_shape_vec((2, 2), vec![0.0, 0.0, 2.0, 2.0]).unwrap();
        // mean 1, variance 1, two features
        assert!((scaled_kernel_eps(&x) - 2.0).abs() < 1e-12);
        assert_eq!(scaled_kernel_eps(&Array2::ones((3, 2))), 1.0);
    }
}
