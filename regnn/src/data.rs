use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::{Dim2, RowMajor, Tensor, Tensor1, Tensor2, TensorBase, TensorView2};
use rand::Rng;
use rand::seq::SliceRandom;
use std::ops::Range;

/// Feature rows paired with a single target column.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset<T> {
    features: Tensor2<T>,
    targets: Tensor2<T>,
}

impl<T: DType> Dataset<T> {
    /// Creates a dataset after checking that it is non-empty, that every feature row has a
    /// target and that every value is finite.
    pub fn new(features: Tensor2<T>, targets: Tensor2<T>) -> Result<Self> {
        if features.rows() == 0 || features.cols() == 0 {
            return Err(Error::EmptyDataset);
        }
        if targets.rows() != features.rows() {
            return Err(Error::DimensionMismatch {
                context: "target rows",
                expected: features.rows(),
                actual: targets.rows(),
            });
        }
        if targets.cols() != 1 {
            return Err(Error::DimensionMismatch {
                context: "target columns",
                expected: 1,
                actual: targets.cols(),
            });
        }
        check_finite("dataset features", &features)?;
        check_finite("dataset targets", &targets)?;
        Ok(Dataset { features, targets })
    }

    pub fn from_targets(features: Tensor2<T>, targets: Tensor1<T>) -> Result<Self> {
        Self::new(features, Tensor2::column(targets))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.rows()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.features.cols()
    }

    #[inline]
    pub fn features(&self) -> &Tensor2<T> {
        &self.features
    }

    #[inline]
    pub fn targets(&self) -> &Tensor2<T> {
        &self.targets
    }

    /// Replaces the features, keeping the targets. Used after standardization.
    pub fn with_features(self, features: Tensor2<T>) -> Result<Self> {
        Self::new(features, self.targets)
    }

    /// Randomly partitions the rows into a train and a test set.
    ///
    /// The train set receives `floor(len * train_fraction)` rows, the test set the rest.
    /// Both sides must end up non-empty.
    pub fn train_test_split<R: Rng + ?Sized>(&self, train_fraction: f64, rng: &mut R) -> Result<(Self, Self)> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(Error::invalid_config(format!(
                "train fraction must be in (0, 1), got {train_fraction}"
            )));
        }
        let len = self.len();
        let n_train = (len as f64 * train_fraction).floor() as usize;
        if n_train == 0 || n_train == len {
            return Err(Error::invalid_config(format!(
                "a train fraction of {train_fraction} over {len} rows leaves one split empty"
            )));
        }
        let mut indices: Vec<usize> = (0..len).collect();
        indices.shuffle(rng);
        let (train_idx, test_idx) = indices.split_at(n_train);
        Ok((self.select_rows(train_idx), self.select_rows(test_idx)))
    }

    fn select_rows(&self, indices: &[usize]) -> Self {
        let cols = self.num_features();
        let mut features = Vec::with_capacity(indices.len() * cols);
        let mut targets = Vec::with_capacity(indices.len());
        for &idx in indices {
            features.extend_from_slice(self.features.row(idx));
            targets.push(self.targets[idx]);
        }
        Dataset {
            features: Tensor::from_vec(features, Dim2(indices.len(), cols)),
            targets: Tensor::from_vec(targets, Dim2(indices.len(), 1)),
        }
    }

    /// Contiguous mini-batches in row order, the last one may be shorter.
    pub fn batches(&self, batch_size: usize) -> impl Iterator<Item = Batch<'_, T>> + '_ {
        batch_ranges(self.len(), batch_size).map(move |range| Batch {
            features: self.features.slice_rows(range.clone()),
            targets: self.targets.slice_rows(range.clone()),
            range,
        })
    }
}

/// Borrowed rows `range` of a [`Dataset`]
#[derive(Clone, Debug)]
pub struct Batch<'a, T> {
    pub range: Range<usize>,
    pub features: TensorView2<'a, T>,
    pub targets: TensorView2<'a, T>,
}

/// Splits `0..len` into `[0, b), [b, 2b), ...`, the last range holding the remainder.
///
/// # Panics
/// When `batch_size` is zero.
pub fn batch_ranges(len: usize, batch_size: usize) -> impl Iterator<Item = Range<usize>> {
    assert!(batch_size > 0, "batch size must be positive");
    (0..len)
        .step_by(batch_size)
        .map(move |start| start..(start + batch_size).min(len))
}

pub(crate) fn check_finite<T, X>(context: &'static str, tensor: &X) -> Result<()>
where
    T: DType,
    X: TensorBase<T, Dim2> + ?Sized,
{
    match tensor.as_ref().iter().find(|v| !v.is_finite()) {
        Some(value) => Err(Error::non_finite(context, value.as_f64())),
        None => Ok(()),
    }
}
