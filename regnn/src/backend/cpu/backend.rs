use super::math::DTypeOps;
use crate::backend::{Backend, BackendOps, MatrixMultiplication, TensorTyped};
use crate::tensor::{Dim2, ITensor, RowMajor, Tensor1, Tensor2, TensorBase};
use std::fmt::{Debug, Formatter, Write};
use std::iter::zip;
use std::marker::PhantomData;

/// Single threaded backend operating on native tensors
pub struct CpuBackend<DT: DTypeOps> {
    _dtype: PhantomData<DT>,
}

impl<DT: DTypeOps> CpuBackend<DT> {
    pub fn new() -> Self {
        CpuBackend { _dtype: PhantomData }
    }
}

impl<DT: DTypeOps> Default for CpuBackend<DT> {
    fn default() -> Self {
        Self::new()
    }
}

impl<DT: DTypeOps> Clone for CpuBackend<DT> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<DT: DTypeOps> TensorTyped for CpuBackend<DT> {
    type Float = DT;
}

impl<DT: DTypeOps> MatrixMultiplication for CpuBackend<DT> {
    #[inline]
    fn matmul<A, B>(&self, alpha: DT, a: &A, ta: bool, b: &B, tb: bool, beta: DT, c: &mut Tensor2<DT>)
    where
        A: TensorBase<DT, Dim2> + ?Sized,
        B: TensorBase<DT, Dim2> + ?Sized,
    {
        let c_dims = *c.dims();
        DT::matrix_multiply(
            alpha,
            a.as_ref(),
            *a.dims(),
            ta,
            b.as_ref(),
            *b.dims(),
            tb,
            beta,
            c.as_mut(),
            c_dims,
        );
    }
}

impl<DT: DTypeOps> BackendOps for CpuBackend<DT> {
    fn column_sum(&self, alpha: DT, a: &Tensor2<DT>, beta: DT, b: &mut Tensor1<DT>) {
        assert_eq!(b.len(), a.cols());
        let sums = b.as_mut();
        for s in sums.iter_mut() {
            *s *= beta;
        }
        for row in a.iter_rows() {
            for (s, &x) in zip(sums.iter_mut(), row) {
                *s += alpha * x;
            }
        }
    }

    fn add_row(&self, row: &Tensor1<DT>, target: &mut Tensor2<DT>) {
        let cols = target.cols();
        assert_eq!(row.len(), cols);
        if cols == 0 {
            return;
        }
        for target_row in target.as_mut().chunks_exact_mut(cols) {
            for (t, &r) in zip(target_row, row) {
                *t += r;
            }
        }
    }

    fn copy(&self, src: &Tensor2<DT>, dst: &mut Tensor2<DT>) {
        assert_eq!(src.dims(), dst.dims());
        dst.as_mut().copy_from_slice(src.as_ref());
    }

    fn relu(&self, leak: DT, activation: &Tensor2<DT>, output: &mut Tensor2<DT>) {
        assert_eq!(activation.dims(), output.dims());
        for (o, &a) in zip(output, activation) {
            *o = if a < DT::ZERO { a * leak } else { a }
        }
    }

    fn relu_error(&self, leak: DT, activation: &Tensor2<DT>, out_error: &Tensor2<DT>, result: &mut Tensor2<DT>) {
        assert_eq!(activation.dims(), result.dims());
        assert_eq!(activation.dims(), out_error.dims());
        for ((r, &act), &err) in zip(zip(result, activation), out_error) {
            *r = if act <= DT::ZERO { leak * err } else { err };
        }
    }

    fn mean_squared_error<E>(&self, output: &Tensor2<DT>, expected: &E, result_deriv: Option<&mut Tensor2<DT>>) -> f64
    where
        E: TensorBase<DT, Dim2> + ?Sized,
    {
        assert_eq!(output.dims(), expected.dims());
        let count = output.len();
        if count == 0 {
            return 0.0;
        }
        let mut sum_error = 0.0f64;
        match result_deriv {
            Some(deriv) => {
                assert_eq!(output.dims(), deriv.dims());
                let scale = DT::from_f64(2.0 / count as f64);
                for (d, (&o, &e)) in zip(deriv, zip(output, expected.as_ref())) {
                    let diff = o - e;
                    *d = diff * scale;
                    sum_error += diff.as_f64() * diff.as_f64();
                }
            }
            None => {
                for (&o, &e) in zip(output, expected.as_ref()) {
                    let diff = (o - e).as_f64();
                    sum_error += diff * diff;
                }
            }
        }
        sum_error / count as f64
    }
}

impl<DT: DTypeOps> Backend for CpuBackend<DT> {}

impl<DT: DTypeOps> Debug for CpuBackend<DT> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CpuBackend<")?;
        f.write_str(std::any::type_name::<DT>())?;
        f.write_char('>')
    }
}
