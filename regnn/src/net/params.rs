use crate::activation::ActivationFn;
#[cfg(feature = "serde")]
use crate::error::Result;

/// Copy of the learnable state of a single layer
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayerSnapshot<T> {
    pub input_size: usize,
    pub output_size: usize,
    pub activation_fn: ActivationFn,
    pub weights: Vec<T>,
    pub biases: Vec<T>,
}

/// Copy of every learnable parameter of a [`Net`](crate::net::Net), in layer order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetParams<T> {
    pub layers: Vec<LayerSnapshot<T>>,
}

impl<T> NetParams<T> {
    pub fn num_params(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.weights.len() + l.biases.len())
            .sum()
    }
}

#[cfg(feature = "serde")]
impl<T> NetParams<T>
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
