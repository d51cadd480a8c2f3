#[cfg(feature = "approx")]
mod approx;
mod debug;
mod dims;
mod owned;
mod view;

pub use dims::*;
pub use owned::*;
pub use view::*;

use std::ops::Range;
use std::slice::ChunksExact;

/// Shape information shared by owned tensors and views
pub trait ITensor<D: Dims> {
    fn len(&self) -> usize;
    fn dims(&self) -> &D;
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub trait TensorBase<T, D: Dims>: ITensor<D> + AsRef<[T]> {
    #[inline]
    fn view(&self) -> TensorView<'_, T, D> {
        TensorView::from_slice(self.as_ref(), *self.dims())
    }
}

/// Row access for 2d tensors stored in row-major order.
pub trait RowMajor<T>: TensorBase<T, Dim2> {
    #[inline]
    fn rows(&self) -> usize {
        self.dims().rows()
    }

    #[inline]
    fn cols(&self) -> usize {
        self.dims().cols()
    }

    fn row(&self, idx: usize) -> &[T] {
        let cols = self.cols();
        &self.as_ref()[idx * cols..(idx + 1) * cols]
    }

    fn iter_rows(&self) -> ChunksExact<'_, T> {
        // a zero width matrix has no data, any chunk size yields nothing
        self.as_ref().chunks_exact(self.cols().max(1))
    }

    fn slice_rows(&self, range: Range<usize>) -> TensorView2<'_, T> {
        assert!(
            range.start <= range.end && range.end <= self.rows(),
            "Row range {range:?} out of bounds for dims {}",
            self.dims()
        );
        let cols = self.cols();
        TensorView::from_slice(
            &self.as_ref()[range.start * cols..range.end * cols],
            Dim2(range.end - range.start, cols),
        )
    }
}

impl<T, X> RowMajor<T> for X where X: TensorBase<T, Dim2> + ?Sized {}
