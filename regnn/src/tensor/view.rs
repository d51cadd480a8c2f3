use crate::tensor::dims::{Dim2, Dims};
use crate::tensor::{ITensor, TensorBase};
use std::slice::Iter;

/// Borrowed, read only tensor. Mostly used to hand out contiguous batches of
/// rows without copying.
pub struct TensorView<'a, T, D: Dims> {
    data: &'a [T],
    dims: D,
}

pub type TensorView2<'a, T> = TensorView<'a, T, Dim2>;

impl<'a, T, D: Dims> TensorView<'a, T, D> {
    pub fn from_slice(data: &'a [T], dims: D) -> Self {
        assert_eq!(
            data.len(),
            dims.tensor_len(),
            "Mismatched data length {} and dimension {dims}",
            data.len()
        );
        TensorView { data, dims }
    }

    #[inline]
    pub fn iter(&self) -> Iter<'a, T> {
        self.data.iter()
    }
}

impl<T, D: Dims> Clone for TensorView<'_, T, D> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, D: Dims> Copy for TensorView<'_, T, D> {}

impl<T, D: Dims> ITensor<D> for TensorView<'_, T, D> {
    #[inline]
    fn len(&self) -> usize {
        self.data.len()
    }
    #[inline]
    fn dims(&self) -> &D {
        &self.dims
    }
}

impl<T, D: Dims> AsRef<[T]> for TensorView<'_, T, D> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.data
    }
}

impl<T, D: Dims> TensorBase<T, D> for TensorView<'_, T, D> {}

impl<'a, T, D: Dims> IntoIterator for TensorView<'a, T, D> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

impl<'a, T, D: Dims> IntoIterator for &TensorView<'a, T, D> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
