use crate::data::Dataset;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::tensor::{Dim2, RowMajor, Tensor, Tensor2, TensorBase};
use log::warn;

/// Per-column z-score standardization, `z = (x - mean) / std`.
///
/// Statistics are computed in `f64` with the population standard deviation (ddof = 0). A
/// column without variance keeps a divisor of 1.0 so it is only centered.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    pub fn fit<T, X>(features: &X) -> Result<Self>
    where
        T: DType,
        X: TensorBase<T, Dim2> + ?Sized,
    {
        let (rows, cols) = (features.rows(), features.cols());
        if rows == 0 || cols == 0 {
            return Err(Error::EmptyDataset);
        }

        let mut mean = vec![0.0; cols];
        for row in features.iter_rows() {
            mean.iter_mut().zip(row).for_each(|(m, &x)| *m += x.as_f64());
        }
        mean.iter_mut().for_each(|m| *m /= rows as f64);

        let mut var = vec![0.0; cols];
        for row in features.iter_rows() {
            var.iter_mut().zip(row).zip(&mean).for_each(|((v, &x), m)| {
                let d = x.as_f64() - m;
                *v += d * d;
            });
        }

        let std = var
            .iter()
            .enumerate()
            .map(|(col, v)| {
                let s = (v / rows as f64).sqrt();
                if s < f64::EPSILON {
                    warn!("feature column {col} has zero variance, it will only be centered");
                    1.0
                } else {
                    s
                }
            })
            .collect();
        Ok(StandardScaler { mean, std })
    }

    pub fn apply<T, X>(&self, features: &X) -> Result<Tensor2<T>>
    where
        T: DType,
        X: TensorBase<T, Dim2> + ?Sized,
    {
        if features.cols() != self.num_features() {
            return Err(Error::DimensionMismatch {
                context: "scaler features",
                expected: self.num_features(),
                actual: features.cols(),
            });
        }
        let mut data = Vec::with_capacity(features.len());
        for row in features.iter_rows() {
            data.extend(
                row.iter()
                    .zip(self.mean.iter().zip(&self.std))
                    .map(|(&x, (m, s))| T::from_f64((x.as_f64() - m) / s)),
            );
        }
        Ok(Tensor::from_vec(data, *features.dims()))
    }

    /// Standardizes the features of `dataset`, targets are left untouched.
    pub fn apply_dataset<T: DType>(&self, dataset: Dataset<T>) -> Result<Dataset<T>> {
        let features = self.apply(dataset.features())?;
        dataset.with_features(features)
    }

    #[inline]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    #[inline]
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.mean.len()
    }
}
