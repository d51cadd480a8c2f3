use crate::backend::Backend;
use crate::dtype::DType;
use crate::tensor::Tensor2;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationFn {
    /// passes the activation through unchanged, used on regression outputs
    #[default]
    Identity,
    ReLU {
        leak: f64,
    },
}

impl ActivationFn {
    /// plain rectifier, `max(0, x)`
    pub const RELU: ActivationFn = ActivationFn::ReLU { leak: 0.0 };

    pub fn compute<B: Backend>(&self, backend: &B, activation: &Tensor2<B::Float>, output: &mut Tensor2<B::Float>) {
        match self {
            ActivationFn::Identity => backend.copy(activation, output),
            &ActivationFn::ReLU { leak } => backend.relu(B::Float::from_f64(leak), activation, output),
        }
    }

    /// Back-propagates `out_error` through the activation function into `result`
    pub fn compute_error<B: Backend>(
        &self,
        backend: &B,
        activation: &Tensor2<B::Float>,
        out_error: &Tensor2<B::Float>,
        result: &mut Tensor2<B::Float>,
    ) {
        match self {
            ActivationFn::Identity => backend.copy(out_error, result),
            &ActivationFn::ReLU { leak } => {
                backend.relu_error(B::Float::from_f64(leak), activation, out_error, result)
            }
        }
    }
}
