//! Confusion matrix accumulation and the scores derived from it.

use std::fmt;

use ndarray::Array2;

use crate::data_handling::ClassLabel;

/// Square table of counts, rows = actual class, columns = predicted class.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionMatrix {
    counts: Array2<usize>,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> Self {
        ConfusionMatrix {
            counts: Array2::zeros((n_classes, n_classes)),
        }
    }

    pub fn n_classes(&self) -> usize {
        self.counts.nrows()
    }

    pub fn counts(&self) -> &Array2<usize> {
        &self.counts
    }

    /// Add one (actual, predicted) pair per test sample.
    pub fn record<'a, A, P>(&mut self, actual: A, predicted: P)
    where
        A: IntoIterator<Item = &'a usize>,
        P: IntoIterator<Item = &'a usize>,
    {
        for (&a, &p) in actual.into_iter().zip(predicted) {
            self.counts[(a, p)] += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.counts.sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.counts.diag().sum(), self.total())
    }

    pub fn precision(&self, class: usize) -> f64 {
        ratio(self.counts[(class, class)], self.counts.column(class).sum())
    }

    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.counts[(class, class)], self.support(class))
    }

    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// Number of samples whose actual class is `class`.
    pub fn support(&self, class: usize) -> usize {
        self.counts.row(class).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.counts)
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

impl fmt::Display for ClassScores {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{precision: {:.4}, recall: {:.4}, f1: {:.4}, support: {}}}",
            self.precision, self.recall, self.f1, self.support
        )
    }
}

/// Scores for each class, in class-index order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoresPerClass(pub Vec<(ClassLabel, ClassScores)>);

impl ScoresPerClass {
    pub fn from_matrix(matrix: &ConfusionMatrix, classes: &[ClassLabel]) -> Self {
        let scores = classes
            .iter()
            .enumerate()
            .map(|(k, label)| {
                (
                    label.clone(),
                    ClassScores {
                        precision: matrix.precision(k),
                        recall: matrix.recall(k),
                        f1: matrix.f1(k),
                        support: matrix.support(k),
                    },
                )
            })
            .collect();
        ScoresPerClass(scores)
    }

    pub fn get(&self, label: &ClassLabel) -> Option<&ClassScores> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, s)| s)
    }
}

impl fmt::Display for ScoresPerClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("{")?;
        for (i, (label, scores)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", label, scores)?;
        }
        f.write_str("}")
    }
}

/// Accuracy and macro-averaged precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageScores {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl AverageScores {
    pub fn from_matrix(matrix: &ConfusionMatrix) -> Self {
        let n = matrix.n_classes();
        let mean = |score: &dyn Fn(usize) -> f64| {
            if n == 0 {
                0.0
            } else {
                (0..n).map(score).sum::<f64>() / n as f64
            }
        };
        AverageScores {
            accuracy: matrix.accuracy(),
            precision: mean(&|k| matrix.precision(k)),
            recall: mean(&|k| matrix.recall(k)),
            f1: mean(&|k| matrix.f1(k)),
        }
    }
}

impl fmt::Display for AverageScores {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{accuracy: {:.4}, precision: {:.4}, recall: {:.4}, f1: {:.4}}}",
            self.accuracy, self.precision, self.recall, self.f1
        )
    }
}
