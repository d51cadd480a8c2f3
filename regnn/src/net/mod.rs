use crate::activation::ActivationFn;
use crate::backend::Backend;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::loss::LossFn;
use crate::net::initializer::{NetInitializer, RandomNetInitializer};
use crate::net::layer::{DenseLayer, DenseLayerParams, Layer, LayerParams};
use crate::optim::ParamGrad;
use crate::tensor::{Dim2, RowMajor, Tensor, Tensor2, TensorBase, TensorView2};
use std::fmt::{Debug, Formatter};

pub mod initializer;
pub mod layer;
mod params;

pub use params::{LayerSnapshot, NetParams};

/// Number of input features of the housing network
pub const HOUSING_FEATURES: usize = 8;
/// Widths of the hidden layers of the housing network
pub const HOUSING_HIDDEN: [usize; 3] = [24, 12, 6];

/// Training mode allows gradient computation, evaluation mode only allows forward passes.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum NetMode {
    #[default]
    Train,
    Eval,
}

pub struct Net<B: Backend> {
    backend: B,
    layers: Box<[DenseLayer<B>]>,
    outputs: Box<[Tensor2<B::Float>]>,
    mode: NetMode,

    // training only
    input_errors: Box<[Tensor2<B::Float>]>,
    output_error_deriv: Tensor2<B::Float>,
}

impl<B: Backend> Net<B> {
    fn new(backend: B, layers: Box<[DenseLayer<B>]>) -> Self {
        debug_assert!(!layers.is_empty());
        let outputs = layers
            .iter()
            .map(|l| Tensor::zeroed(Dim2(0, l.output_size())))
            .collect();
        let input_errors = layers
            .iter()
            .map(|l| Tensor::zeroed(Dim2(0, l.input_size())))
            .collect();
        let output_size = layers[layers.len() - 1].output_size();
        Net {
            backend,
            layers,
            outputs,
            mode: NetMode::Train,
            input_errors,
            output_error_deriv: Tensor::zeroed(Dim2(0, output_size)),
        }
    }

    /// Runs a forward pass over a batch of rows and returns the network output.
    pub fn predict<I>(&mut self, input: &I) -> Result<&Tensor2<B::Float>>
    where
        I: TensorBase<B::Float, Dim2> + ?Sized,
    {
        self.check_input(input)?;
        self.forward(input.view());
        Ok(self.last_output())
    }

    /// Predicts `input` and returns the loss against `expected` without touching any gradient.
    pub fn evaluate<I, E>(&mut self, input: &I, expected: &E, loss: &LossFn) -> Result<f64>
    where
        I: TensorBase<B::Float, Dim2> + ?Sized,
        E: TensorBase<B::Float, Dim2> + ?Sized,
    {
        self.check_input(input)?;
        self.check_expected(input.rows(), expected)?;
        self.forward(input.view());
        let n = self.layers.len();
        Ok(loss.evaluate(&self.backend, &self.outputs[n - 1], expected))
    }

    /// Forward and backward pass over one batch. Gradients are added to the ones already
    /// accumulated, parameters are left untouched. Returns the batch loss.
    pub fn train_batch<I, E>(&mut self, input: &I, expected: &E, loss: &LossFn) -> Result<f64>
    where
        I: TensorBase<B::Float, Dim2> + ?Sized,
        E: TensorBase<B::Float, Dim2> + ?Sized,
    {
        self.require_mode(NetMode::Train)?;
        self.check_input(input)?;
        self.check_expected(input.rows(), expected)?;

        let input = input.view();
        let num_rows = input.rows();
        self.forward(input);

        let n = self.layers.len();
        self.output_error_deriv.resize_first(B::Float::ZERO, num_rows);
        let value = loss.compute(
            &self.backend,
            &self.outputs[n - 1],
            expected,
            &mut self.output_error_deriv,
        );

        self.backprop(num_rows, input);
        Ok(value)
    }

    fn forward(&mut self, input: TensorView2<'_, B::Float>) {
        let num_rows = input.rows();
        for (i, layer) in self.layers.iter_mut().enumerate() {
            let (prev, rest) = self.outputs.split_at_mut(i);
            let output = &mut rest[0];
            output.resize_first(B::Float::ZERO, num_rows);
            let layer_input = match prev.last() {
                Some(prev_output) => prev_output.view(),
                None => input,
            };
            layer.forward(&self.backend, layer_input, output);
        }
    }

    fn backprop(&mut self, num_rows: usize, input: TensorView2<'_, B::Float>) {
        let n = self.layers.len();
        for (i, layer) in self.layers.iter_mut().enumerate().rev() {
            let layer_input = if i == 0 { input } else { self.outputs[i - 1].view() };
            let (lower, upper) = self.input_errors.split_at_mut(i + 1);
            let output_error = if i + 1 == n {
                &self.output_error_deriv
            } else {
                &upper[0]
            };
            // the first layer has nothing to propagate into
            let input_error = if i == 0 {
                None
            } else {
                let input_error = &mut lower[i];
                input_error.resize_first(B::Float::ZERO, num_rows);
                Some(input_error)
            };
            layer.backprop(&self.backend, layer_input, input_error, output_error);
        }
    }

    /// Clears the gradients accumulated by [`Net::train_batch`]
    pub fn zero_grad(&mut self) {
        self.layers.iter_mut().for_each(|l| l.zero_grad());
    }

    /// Parameter and gradient buffers of every layer, weights before biases.
    pub fn params_and_grads(&mut self) -> Vec<ParamGrad<'_, B::Float>> {
        self.layers
            .iter_mut()
            .flat_map(|l| l.params_and_grads())
            .collect()
    }

    pub fn snapshot(&self) -> NetParams<B::Float> {
        NetParams {
            layers: self.layers.iter().map(|l| l.snapshot()).collect(),
        }
    }

    pub fn restore(&mut self, params: &NetParams<B::Float>) -> Result<()> {
        if params.layers.len() != self.layers.len() {
            return Err(Error::DimensionMismatch {
                context: "snapshot layer count",
                expected: self.layers.len(),
                actual: params.layers.len(),
            });
        }
        for (layer, snapshot) in self.layers.iter_mut().zip(&params.layers) {
            layer.restore(snapshot)?;
        }
        Ok(())
    }

    #[inline]
    pub fn mode(&self) -> NetMode {
        self.mode
    }

    #[inline]
    pub fn set_mode(&mut self, mode: NetMode) {
        self.mode = mode;
    }

    fn require_mode(&self, expected: NetMode) -> Result<()> {
        if self.mode != expected {
            return Err(Error::WrongMode {
                expected,
                actual: self.mode,
            });
        }
        Ok(())
    }

    fn check_input<I>(&self, input: &I) -> Result<()>
    where
        I: TensorBase<B::Float, Dim2> + ?Sized,
    {
        if input.cols() != self.input_size() {
            return Err(Error::DimensionMismatch {
                context: "input features",
                expected: self.input_size(),
                actual: input.cols(),
            });
        }
        Ok(())
    }

    fn check_expected<E>(&self, num_rows: usize, expected: &E) -> Result<()>
    where
        E: TensorBase<B::Float, Dim2> + ?Sized,
    {
        if expected.cols() != self.output_size() {
            return Err(Error::DimensionMismatch {
                context: "expected outputs",
                expected: self.output_size(),
                actual: expected.cols(),
            });
        }
        if expected.rows() != num_rows {
            return Err(Error::DimensionMismatch {
                context: "expected rows",
                expected: num_rows,
                actual: expected.rows(),
            });
        }
        Ok(())
    }

    #[inline]
    fn last_output(&self) -> &Tensor2<B::Float> {
        &self.outputs[self.outputs.len() - 1]
    }

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn layers(&self) -> &[DenseLayer<B>] {
        &self.layers
    }

    #[inline]
    pub fn input_size(&self) -> usize {
        self.layers[0].input_size()
    }

    #[inline]
    pub fn output_size(&self) -> usize {
        self.layers[self.layers.len() - 1].output_size()
    }

    pub fn num_params(&self) -> usize {
        self.layers
            .iter()
            .map(|l| (l.input_size() + 1) * l.output_size())
            .sum()
    }
}

pub struct NetBuilder<B: Backend> {
    backend: B,
    input_size: usize,
    initializer: Box<dyn NetInitializer<B::Float>>,
    layers: Vec<DenseLayerParams>,
}

impl<B: Backend> NetBuilder<B> {
    pub fn new(backend: B, input_size: usize) -> Self {
        NetBuilder {
            backend,
            input_size,
            initializer: Box::new(RandomNetInitializer::default()),
            layers: Vec::new(),
        }
    }

    /// The fixed regression topology: 8 -> 24 -> 12 -> 6 -> 1 with ReLU after every hidden
    /// layer and a linear output.
    pub fn housing(backend: B) -> Self {
        let builder = HOUSING_HIDDEN
            .iter()
            .fold(NetBuilder::new(backend, HOUSING_FEATURES), |builder, &size| {
                builder.with_layer(DenseLayerParams {
                    size,
                    activation_fn: ActivationFn::RELU,
                })
            });
        builder.with_layer(DenseLayerParams {
            size: 1,
            activation_fn: ActivationFn::Identity,
        })
    }

    pub fn with_initializer<I>(mut self, initializer: I) -> Self
    where
        I: 'static + NetInitializer<B::Float>,
    {
        self.initializer = Box::new(initializer);
        self
    }

    pub fn with_layer<T>(mut self, layer: T) -> Self
    where
        T: Into<DenseLayerParams>,
    {
        self.layers.push(layer.into());
        self
    }

    pub fn build(mut self) -> Result<Net<B>> {
        if self.layers.is_empty() {
            return Err(Error::invalid_config("a network needs at least one layer"));
        }
        if self.input_size == 0 || self.layers.iter().any(|l| l.size == 0) {
            return Err(Error::invalid_config("layer sizes must be positive"));
        }
        let mut layers = Vec::with_capacity(self.layers.len());
        let mut last_size = self.input_size;
        for (layer_idx, params) in self.layers.iter().enumerate() {
            let layer = params.create_layer(&self.backend, layer_idx, last_size, self.initializer.as_mut());
            last_size = layer.output_size();
            layers.push(layer);
        }
        Ok(Net::new(self.backend, layers.into_boxed_slice()))
    }
}

impl<B: Backend> Debug for Net<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Net")
            .field("backend", &self.backend)
            .field("mode", &self.mode)
            .field("layers", &self.layers)
            .finish_non_exhaustive()
    }
}
