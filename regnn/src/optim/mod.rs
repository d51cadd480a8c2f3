mod adam;

use crate::dtype::DType;
use crate::error::Result;

pub use adam::{Adam, AdamParams};

/// A parameter buffer paired with the gradient accumulated for it.
pub struct ParamGrad<'a, F> {
    pub param: &'a mut [F],
    pub grad: &'a [F],
}

impl<'a, F> ParamGrad<'a, F> {
    #[inline]
    pub fn new(param: &'a mut [F], grad: &'a [F]) -> Self {
        debug_assert_eq!(param.len(), grad.len());
        ParamGrad { param, grad }
    }
}

pub trait Optimizer<F: DType> {
    /// Applies one update to every parameter buffer using its gradient.
    ///
    /// The buffers must be passed in the same order and with the same lengths on every call,
    /// since per-parameter state is kept by position.
    fn step(&mut self, params: &mut [ParamGrad<'_, F>]) -> Result<()>;

    /// Forgets all per-parameter state, the next step starts from scratch.
    fn reset(&mut self);

    fn learning_rate(&self) -> f64;

    fn set_learning_rate(&mut self, learning_rate: f64);
}
