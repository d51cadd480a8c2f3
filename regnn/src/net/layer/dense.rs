use crate::activation::ActivationFn;
use crate::backend::Backend;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::net::initializer::NetInitializer;
use crate::net::layer::{Layer, LayerParams};
use crate::net::params::LayerSnapshot;
use crate::optim::ParamGrad;
use crate::tensor::{Dim1, Dim2, ITensor, RowMajor, Tensor, Tensor1, Tensor2, TensorView2};
use std::fmt::{Debug, Formatter};

#[derive(Clone, Debug, PartialEq)]
pub struct DenseLayerParams {
    pub size: usize,
    pub activation_fn: ActivationFn,
}

impl<B: Backend> LayerParams<B> for DenseLayerParams {
    type Layer = DenseLayer<B>;

    fn create_layer(
        &self,
        backend: &B,
        layer_idx: usize,
        input_size: usize,
        initializer: &mut dyn NetInitializer<B::Float>,
    ) -> Self::Layer {
        let mut layer = DenseLayer::new(backend, input_size, self.size, self.activation_fn);
        layer.weights = initializer.get_weights(layer_idx, input_size, self.size);
        layer.biases = initializer.get_biases(layer_idx, input_size, self.size);
        assert_eq!(layer.weights.dims(), &Dim2(self.size, input_size));
        assert_eq!(layer.biases.dims(), &Dim1(self.size));
        layer
    }
}

/// Fully connected layer computing `act(input * weights^T + biases)`
pub struct DenseLayer<B: Backend> {
    input_size: usize,
    output_size: usize,
    weights: Tensor2<B::Float>,
    biases: Tensor1<B::Float>,
    weight_grad: Tensor2<B::Float>,
    bias_grad: Tensor1<B::Float>,
    // pre-activation values of the last forward pass
    activation: Tensor2<B::Float>,
    activation_error: Tensor2<B::Float>,
    activation_fn: ActivationFn,
}

impl<B: Backend> DenseLayer<B> {
    pub fn new(_backend: &B, input_size: usize, output_size: usize, activation_fn: ActivationFn) -> Self {
        DenseLayer {
            input_size,
            output_size,
            weights: Tensor::zeroed(Dim2(output_size, input_size)),
            biases: Tensor::zeroed(Dim1(output_size)),
            weight_grad: Tensor::zeroed(Dim2(output_size, input_size)),
            bias_grad: Tensor::zeroed(Dim1(output_size)),
            activation: Tensor::zeroed(Dim2(0, output_size)),
            activation_error: Tensor::zeroed(Dim2(0, output_size)),
            activation_fn,
        }
    }

    #[inline]
    pub fn weights(&self) -> &Tensor2<B::Float> {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &Tensor1<B::Float> {
        &self.biases
    }

    #[inline]
    pub fn activation_fn(&self) -> ActivationFn {
        self.activation_fn
    }
}

impl<B: Backend> Layer<B> for DenseLayer<B> {
    fn forward(&mut self, backend: &B, input: TensorView2<'_, B::Float>, output: &mut Tensor2<B::Float>) {
        let num_rows = input.rows();

        assert_eq!(input.dims(), &Dim2(num_rows, self.input_size), "Invalid dimensions for input tensor");
        assert_eq!(output.dims(), &Dim2(num_rows, self.output_size), "Invalid dimensions for output tensor");

        self.activation.resize_first(B::Float::ZERO, num_rows);
        backend.matmul(
            B::Float::ONE,
            &input,
            false,
            &self.weights,
            true,
            B::Float::ZERO,
            &mut self.activation,
        );
        backend.add_row(&self.biases, &mut self.activation);

        self.activation_fn.compute(backend, &self.activation, output);
    }

    fn backprop(
        &mut self,
        backend: &B,
        input: TensorView2<'_, B::Float>,
        input_error: Option<&mut Tensor2<B::Float>>,
        out_error: &Tensor2<B::Float>,
    ) {
        let num_rows = input.rows();

        assert_eq!(input.dims(), &Dim2(num_rows, self.input_size), "Invalid dimensions for input tensor");
        assert_eq!(out_error.dims(), &Dim2(num_rows, self.output_size), "Invalid dimensions for out_error tensor");
        assert_eq!(self.activation.dims(), out_error.dims(), "backprop called without a matching forward pass");

        self.activation_error.resize_first(B::Float::ZERO, num_rows);
        self.activation_fn
            .compute_error(backend, &self.activation, out_error, &mut self.activation_error);

        if let Some(input_error) = input_error {
            assert_eq!(input_error.dims(), &Dim2(num_rows, self.input_size));
            backend.matmul(
                B::Float::ONE,
                &self.activation_error,
                false,
                &self.weights,
                false,
                B::Float::ZERO,
                input_error,
            );
        }

        // gradients accumulate until the next zero_grad
        backend.matmul(
            B::Float::ONE,
            &self.activation_error,
            true,
            &input,
            false,
            B::Float::ONE,
            &mut self.weight_grad,
        );
        backend.column_sum(B::Float::ONE, &self.activation_error, B::Float::ONE, &mut self.bias_grad);
    }

    fn zero_grad(&mut self) {
        self.weight_grad.fill_zero();
        self.bias_grad.fill_zero();
    }

    fn params_and_grads(&mut self) -> [ParamGrad<'_, B::Float>; 2] {
        [
            ParamGrad::new(self.weights.as_mut(), self.weight_grad.as_ref()),
            ParamGrad::new(self.biases.as_mut(), self.bias_grad.as_ref()),
        ]
    }

    fn snapshot(&self) -> LayerSnapshot<B::Float> {
        LayerSnapshot {
            input_size: self.input_size,
            output_size: self.output_size,
            activation_fn: self.activation_fn,
            weights: self.weights.as_ref().to_vec(),
            biases: self.biases.as_ref().to_vec(),
        }
    }

    fn restore(&mut self, snapshot: &LayerSnapshot<B::Float>) -> Result<()> {
        if snapshot.input_size != self.input_size {
            return Err(Error::DimensionMismatch {
                context: "snapshot layer input size",
                expected: self.input_size,
                actual: snapshot.input_size,
            });
        }
        if snapshot.output_size != self.output_size {
            return Err(Error::DimensionMismatch {
                context: "snapshot layer output size",
                expected: self.output_size,
                actual: snapshot.output_size,
            });
        }
        self.weights = Tensor::try_from_vec(snapshot.weights.clone(), Dim2(self.output_size, self.input_size))?;
        self.biases = Tensor::try_from_vec(snapshot.biases.clone(), Dim1(self.output_size))?;
        Ok(())
    }

    #[inline]
    fn input_size(&self) -> usize {
        self.input_size
    }

    #[inline]
    fn output_size(&self) -> usize {
        self.output_size
    }
}

impl<B: Backend> Debug for DenseLayer<B> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseLayer")
            .field("size", &self.output_size)
            .field("activation_fn", &self.activation_fn)
            .field("weights", &self.weights)
            .field("biases", &self.biases)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::{DenseLayer, DenseLayerParams};
    use crate::activation::ActivationFn;
    use crate::backend::CpuBackend;
    use crate::net::initializer::RandomNetInitializer;
    use crate::net::layer::{Layer, LayerParams};
    use crate::tensor;
    use crate::tensor::{Dim2, Tensor, Tensor2, TensorBase};

    fn fixed_layer(backend: &CpuBackend<f64>) -> DenseLayer<CpuBackend<f64>> {
        let mut layer = DenseLayer::new(backend, 2, 2, ActivationFn::RELU);
        layer.weights = tensor![[1.0, -1.0], [0.5, 2.0]];
        layer.biases = tensor![0.5, -10.0];
        layer
    }

    #[test]
    fn test_forward() {
        let backend = CpuBackend::<f64>::new();
        let mut layer = fixed_layer(&backend);
        let input: Tensor2<f64> = tensor![[1.0, 2.0], [3.0, 1.0]];
        let mut output = Tensor::zeroed(Dim2(2, 2));
        layer.forward(&backend, input.view(), &mut output);
        // row 0: [1 - 2 + 0.5, 0.5 + 4 - 10] -> relu -> [0, 0]
        // row 1: [3 - 1 + 0.5, 1.5 + 2 - 10] -> relu -> [2.5, 0]
        assert_eq!(output.as_ref(), &[0.0, 0.0, 2.5, 0.0]);
    }

    #[test]
    fn test_backprop_accumulates() {
        let backend = CpuBackend::<f64>::new();
        let mut layer = fixed_layer(&backend);
        layer.activation_fn = ActivationFn::Identity;
        let input: Tensor2<f64> = tensor![[1.0, 2.0]];
        let mut output = Tensor::zeroed(Dim2(1, 2));
        let out_error: Tensor2<f64> = tensor![[1.0, 0.5]];
        let mut input_error = Tensor::zeroed(Dim2(1, 2));

        layer.forward(&backend, input.view(), &mut output);
        layer.backprop(&backend, input.view(), Some(&mut input_error), &out_error);
        assert_eq!(layer.weight_grad.as_ref(), &[1.0, 2.0, 0.5, 1.0]);
        assert_eq!(layer.bias_grad.as_ref(), &[1.0, 0.5]);
        // error . W = [1 * 1 + 0.5 * 0.5, 1 * -1 + 0.5 * 2]
        assert_eq!(input_error.as_ref(), &[1.25, 0.0]);

        layer.backprop(&backend, input.view(), None, &out_error);
        assert_eq!(layer.bias_grad.as_ref(), &[2.0, 1.0]);

        layer.zero_grad();
        assert!(layer.weight_grad.iter().all(|&g| g == 0.0));
        assert!(layer.bias_grad.iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_snapshot_restore() {
        let backend = CpuBackend::<f32>::new();
        let params = DenseLayerParams {
            size: 3,
            activation_fn: ActivationFn::RELU,
        };
        let mut init = RandomNetInitializer::seed_from_u64(3);
        let mut layer = params.create_layer(&backend, 0, 4, &mut init);
        let snapshot = layer.snapshot();
        layer.params_and_grads()[0].param[0] += 1.0;
        assert_ne!(layer.snapshot(), snapshot);
        layer.restore(&snapshot).unwrap();
        assert_eq!(layer.snapshot(), snapshot);

        let mut other = params.create_layer(&backend, 0, 5, &mut init);
        assert!(other.restore(&snapshot).is_err());
    }
}
