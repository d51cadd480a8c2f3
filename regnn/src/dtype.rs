use num_traits::{Float, NumAssignOps};
use std::fmt::{Debug, Display};
use std::iter::Sum;

/// Element type of every tensor in the crate.
///
/// Only floating point types are supported since the network is trained with
/// gradients; the conversion helpers exist so that losses and statistics can be
/// accumulated in `f64` regardless of the storage type.
pub trait DType: 'static + Float + NumAssignOps + Sum + Default + Debug + Display + Send + Sync {
    const ZERO: Self;
    const ONE: Self;
    fn from_f64(val: f64) -> Self;
    fn from_usize(val: usize) -> Self;
    fn as_f64(self) -> f64;
}

macro_rules! impl_dtype {
    ($ty:ty) => {
        impl DType for $ty {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            #[inline]
            fn from_f64(val: f64) -> Self {
                val as $ty
            }
            #[inline]
            fn from_usize(val: usize) -> Self {
                val as $ty
            }
            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_dtype!(f32);
impl_dtype!(f64);
