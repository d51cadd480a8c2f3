pub mod activation;
pub mod backend;
pub mod data;
pub mod dtype;
pub mod error;
pub mod loss;
pub mod net;
pub mod optim;
pub mod preprocessing;
pub mod report;
pub mod tensor;
pub mod trainer;
pub mod util;

pub use error::{Error, Result};

extern crate log;
extern crate matrixmultiply;
extern crate num_traits;
extern crate rand;
extern crate rand_distr;
#[cfg(feature = "serde")]
extern crate serde;
#[cfg(feature = "serde")]
extern crate serde_json;
