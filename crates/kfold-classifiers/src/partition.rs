use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::{ClassifyError, Result};

/// Train/test indices for one cross-validation fold.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffled k-fold splitter producing near-equal partitions.
#[derive(Debug, Clone, Copy)]
pub struct KFold {
    partitions: usize,
}

impl KFold {
    pub fn new(partitions: usize) -> Self {
        KFold { partitions }
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Shuffle `0..n_samples` and cut it into `partitions` folds.
    ///
    /// Fold sizes differ by at most one; the first `n_samples % partitions`
    /// folds take the extra sample.
    pub fn split<R: Rng + ?Sized>(&self, n_samples: usize, rng: &mut R) -> Result<Vec<Fold>> {
        if self.partitions < 2 || self.partitions > n_samples {
            return Err(ClassifyError::InvalidPartitions {
                partitions: self.partitions,
                samples: n_samples,
            });
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(rng);

        let base = n_samples / self.partitions;
        let extra = n_samples % self.partitions;

        let mut bounds = Vec::with_capacity(self.partitions);
        let mut start = 0;
        for i in 0..self.partitions {
            let len = base + usize::from(i < extra);
            bounds.push(start..start + len);
            start += len;
        }

        let folds = bounds
            .into_iter()
            .map(|range| {
                let test = indices[range.clone()].to_vec();
                let train = indices[..range.start]
                    .iter()
                    .chain(&indices[range.end..])
                    .copied()
                    .collect();
                Fold { train, test }
            })
            .collect();

        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn folds_cover_every_sample_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let folds = KFold::new(3).split(10, &mut rng).unwrap();
        assert_eq!(folds.len(), 3);

        let mut tested: Vec<usize> = folds.iter().flat_map(|f| f.test.clone()).collect();
        tested.sort_unstable();
        assert_eq!(tested, (0..10).collect::<Vec<_>>());

        let sizes: Vec<usize> = folds.iter().map(|f| f.test.len()).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.test.len(), 10);
            assert!(fold.train.iter().all(|i| !fold.test.contains(i)));
        }
    }

    #[test]
    fn rejects_degenerate_partition_counts() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(KFold::new(1).split(10, &mut rng).is_err());
        assert!(KFold::new(0).split(10, &mut rng).is_err());
        assert!(KFold::new(11).split(10, &mut rng).is_err());
        assert!(KFold::new(10).split(10, &mut rng).is_ok());
    }

    #[test]
    fn same_seed_same_split() {
        let a = KFold::new(4).split(20, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = KFold::new(4).split(20, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }
}
