use crate::dtype::DType;
use crate::tensor::{Dim2, Tensor1, Tensor2, TensorBase};
use std::fmt::Debug;

mod cpu;

pub use cpu::*;

pub trait TensorTyped {
    type Float: DType;
}

pub trait MatrixMultiplication: TensorTyped {
    /// performs a generic matrix multiplication (gemm): `c = alpha * op(a) * op(b) + beta * c`
    /// where `op` transposes its argument when the matching flag is set. When `beta` is zero
    /// the previous contents of `c` are ignored.
    fn matmul<A, B>(
        &self,
        alpha: Self::Float,
        a: &A,
        ta: bool,
        b: &B,
        tb: bool,
        beta: Self::Float,
        c: &mut Tensor2<Self::Float>,
    ) where
        A: TensorBase<Self::Float, Dim2> + ?Sized,
        B: TensorBase<Self::Float, Dim2> + ?Sized;
}

pub trait BackendOps: TensorTyped {
    /// `b = alpha * column_sums(a) + beta * b`
    fn column_sum(
        &self,
        alpha: Self::Float,
        a: &Tensor2<Self::Float>,
        beta: Self::Float,
        b: &mut Tensor1<Self::Float>,
    );

    /// adds `row` to every row of `target`
    fn add_row(&self, row: &Tensor1<Self::Float>, target: &mut Tensor2<Self::Float>);

    fn copy(&self, src: &Tensor2<Self::Float>, dst: &mut Tensor2<Self::Float>);

    /// computes the leaky ReLU function for all elements in a given tensor
    fn relu(&self, leak: Self::Float, activation: &Tensor2<Self::Float>, output: &mut Tensor2<Self::Float>);
    fn relu_error(
        &self,
        leak: Self::Float,
        activation: &Tensor2<Self::Float>,
        out_error: &Tensor2<Self::Float>,
        result: &mut Tensor2<Self::Float>,
    );

    /// Mean of the squared differences over every element. When `result_deriv` is given it
    /// receives the derivative of the returned mean with respect to each output element.
    fn mean_squared_error<E>(
        &self,
        output: &Tensor2<Self::Float>,
        expected: &E,
        result_deriv: Option<&mut Tensor2<Self::Float>>,
    ) -> f64
    where
        E: TensorBase<Self::Float, Dim2> + ?Sized;
}

pub trait Backend: 'static + Debug + MatrixMultiplication + BackendOps {}
