use crate::error::{Error, Result};
use crate::tensor::dims::{Dim1, Dim2, Dims};
use crate::tensor::{ITensor, TensorBase};
use num_traits::Zero;
use rand::distributions::Distribution;
use rand::Rng;
use std::slice::{Iter, IterMut};
use std::vec::IntoIter;

pub struct Tensor<T, D>
where
    D: Dims,
{
    data: Vec<T>,
    dims: D,
}

pub type Tensor1<T> = Tensor<T, Dim1>;
pub type Tensor2<T> = Tensor<T, Dim2>;

impl<T, D: Dims> Tensor<T, D> {
    pub fn from_vec(data: Vec<T>, dims: D) -> Self {
        assert_eq!(
            data.len(),
            dims.tensor_len(),
            "Mismatched data length {} and dimension {dims}",
            data.len()
        );
        Tensor { data, dims }
    }

    /// Like [`Tensor::from_vec`] but reports a length mismatch as an error
    pub fn try_from_vec(data: Vec<T>, dims: D) -> Result<Self> {
        if data.len() != dims.tensor_len() {
            return Err(Error::DimensionMismatch {
                context: "tensor data length",
                expected: dims.tensor_len(),
                actual: data.len(),
            });
        }
        Ok(Tensor { data, dims })
    }

    pub fn from_distribution<R, S>(rng: &mut R, dist: S, dims: D) -> Self
    where
        R: Rng,
        S: Distribution<T>,
    {
        let data: Vec<T> = dist.sample_iter(rng).take(dims.tensor_len()).collect();
        Tensor { data, dims }
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        self.data.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        self.data.iter_mut()
    }
}

impl<T> Tensor1<T> {
    pub fn from_vec_1d(data: Vec<T>) -> Self {
        let len = data.len();
        Tensor { data, dims: Dim1(len) }
    }
}

impl<T> Tensor2<T> {
    pub fn from_rows<const N: usize>(rows: Vec<[T; N]>) -> Self {
        let num_rows = rows.len();
        let data: Vec<T> = rows.into_iter().flatten().collect();
        Tensor {
            data,
            dims: Dim2(num_rows, N),
        }
    }

    /// Reinterprets a 1d tensor as a single column matrix
    pub fn column(data: Tensor1<T>) -> Self {
        let len = data.len();
        Tensor {
            data: data.data,
            dims: Dim2(len, 1),
        }
    }
}

impl<T: Clone, D: Dims> Tensor<T, D> {
    pub fn filled(value: T, dims: D) -> Self {
        Tensor {
            data: vec![value; dims.tensor_len()],
            dims,
        }
    }

    pub fn resize(&mut self, fill: T, dims: D) {
        if self.dims != dims {
            let new_len = dims.tensor_len();
            if self.data.len() != new_len {
                self.data.resize(new_len, fill);
            }
            self.dims = dims;
        }
    }

    #[inline]
    pub fn resize_first(&mut self, fill: T, size: usize) {
        self.resize(fill, self.dims.with_resized_first(size))
    }

    #[inline]
    pub fn fill(&mut self, fill: T) {
        self.data.fill(fill);
    }
}

impl<T: Zero + Clone, D: Dims> Tensor<T, D> {
    #[inline]
    pub fn zeroed(dims: D) -> Self {
        Self::filled(T::zero(), dims)
    }
    #[inline]
    pub fn fill_zero(&mut self) {
        self.data.fill(T::zero());
    }
}

impl<T, D: Dims> ITensor<D> for Tensor<T, D> {
    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }
    #[inline]
    fn dims(&self) -> &D {
        &self.dims
    }
}

impl<T, D: Dims> AsRef<[T]> for Tensor<T, D> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T, D: Dims> AsMut<[T]> for Tensor<T, D> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}

impl<T, D: Dims> TensorBase<T, D> for Tensor<T, D> {}

impl<T, D: Dims> std::ops::Index<usize> for Tensor<T, D> {
    type Output = T;
    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T, D: Dims> std::ops::IndexMut<usize> for Tensor<T, D> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T> std::ops::Index<[usize; 2]> for Tensor2<T> {
    type Output = T;
    #[inline]
    fn index(&self, [row, col]: [usize; 2]) -> &Self::Output {
        debug_assert!(col < self.dims.cols());
        &self.data[row * self.dims.cols() + col]
    }
}

impl<T> std::ops::IndexMut<[usize; 2]> for Tensor2<T> {
    #[inline]
    fn index_mut(&mut self, [row, col]: [usize; 2]) -> &mut Self::Output {
        debug_assert!(col < self.dims.cols());
        let cols = self.dims.cols();
        &mut self.data[row * cols + col]
    }
}

impl<'a, T, D: Dims> IntoIterator for &'a Tensor<T, D> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<'a, T, D: Dims> IntoIterator for &'a mut Tensor<T, D> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter_mut()
    }
}

impl<T, D: Dims> IntoIterator for Tensor<T, D> {
    type Item = T;
    type IntoIter = IntoIter<T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<T: Clone, D: Dims> Clone for Tensor<T, D> {
    fn clone(&self) -> Self {
        Tensor {
            data: self.data.clone(),
            dims: self.dims,
        }
    }
}

impl<T: PartialEq, D: Dims> PartialEq for Tensor<T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.dims == other.dims && self.data == other.data
    }
}

#[macro_export]
macro_rules! tensor {
    ($([$($x:expr),* $(,)*]),+ $(,)*) => {
        $crate::tensor::Tensor2::from_rows(vec![$([$($x,)*],)*])
    };
    ($($x:expr),* $(,)*) => {
        $crate::tensor::Tensor1::from_vec_1d(vec![$($x,)*])
    };
}
