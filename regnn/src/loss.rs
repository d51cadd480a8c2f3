use crate::backend::Backend;
use crate::tensor::{Dim2, Tensor2, TensorBase};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LossFn {
    /// mean squared error averaged over every output element
    #[default]
    MSE,
}

impl LossFn {
    /// Computes the loss and writes its derivative with respect to `output` into `result_deriv`
    pub fn compute<B, E>(
        &self,
        backend: &B,
        output: &Tensor2<B::Float>,
        expected: &E,
        result_deriv: &mut Tensor2<B::Float>,
    ) -> f64
    where
        B: Backend,
        E: TensorBase<B::Float, Dim2> + ?Sized,
    {
        match self {
            LossFn::MSE => backend.mean_squared_error(output, expected, Some(result_deriv)),
        }
    }

    /// Computes the loss only, used when evaluating
    pub fn evaluate<B, E>(&self, backend: &B, output: &Tensor2<B::Float>, expected: &E) -> f64
    where
        B: Backend,
        E: TensorBase<B::Float, Dim2> + ?Sized,
    {
        match self {
            LossFn::MSE => backend.mean_squared_error(output, expected, None),
        }
    }
}
