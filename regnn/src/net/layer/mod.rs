mod dense;

use crate::backend::Backend;
use crate::error::Result;
use crate::net::initializer::NetInitializer;
use crate::net::params::LayerSnapshot;
use crate::optim::ParamGrad;
use crate::tensor::{Tensor2, TensorView2};
use std::fmt::Debug;

pub use dense::{DenseLayer, DenseLayerParams};

pub trait LayerParams<B: Backend>: Clone + Debug {
    type Layer: Layer<B>;

    fn create_layer(
        &self,
        backend: &B,
        layer_idx: usize,
        input_size: usize,
        initializer: &mut dyn NetInitializer<B::Float>,
    ) -> Self::Layer;
}

pub trait Layer<B: Backend>: Debug {
    fn forward(&mut self, backend: &B, input: TensorView2<'_, B::Float>, output: &mut Tensor2<B::Float>);

    /// Accumulates the parameter gradients for the batch last passed to `forward` and, when
    /// `input_error` is given, writes the error with respect to the layer input into it.
    fn backprop(
        &mut self,
        backend: &B,
        input: TensorView2<'_, B::Float>,
        input_error: Option<&mut Tensor2<B::Float>>,
        output_error: &Tensor2<B::Float>,
    );

    fn zero_grad(&mut self);

    fn params_and_grads(&mut self) -> [ParamGrad<'_, B::Float>; 2];

    fn snapshot(&self) -> LayerSnapshot<B::Float>;

    fn restore(&mut self, snapshot: &LayerSnapshot<B::Float>) -> Result<()>;

    fn input_size(&self) -> usize;
    fn output_size(&self) -> usize;
}
