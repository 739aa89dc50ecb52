use ndarray::{Array1, Array2, ArrayView1};

use crate::error::Result;

/// Contract shared by the classifiers the cross-validation loop drives.
///
/// Targets are class indices in `0..n_classes`; a model is fitted once per
/// fold and then asked to predict that fold's held-out rows.
pub trait ClassifierModel {
    /// Fit on `x` (rows are samples) against class indices `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<usize>, n_classes: usize) -> Result<()>;

    /// Predict a class index for every row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<usize>>;

    /// Optional human readable name for the model
    fn name(&self) -> &'static str {
        "classifier"
    }
}

/// Index of the highest vote; ties go to the lowest index.
pub(crate) fn argmax_vote(votes: ArrayView1<usize>) -> usize {
    let mut best = 0;
    for (k, &v) in votes.indexed_iter() {
        if v > votes[best] {
            best = k;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::argmax_vote;
    use ndarray::aview1;

    #[test]
    fn ties_favour_lower_index() {
        assert_eq!(argmax_vote(aview1(&[1, 3, 3])), 1);
        assert_eq!(argmax_vote(aview1(&[2, 2])), 0);
        assert_eq!(argmax_vote(aview1(&[0, 0, 1])), 2);
    }
}
