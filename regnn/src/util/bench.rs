use crate::backend::Backend;
use crate::data::Dataset;
use crate::dtype::DType;
use crate::error::Result;
use crate::net::initializer::RandomNetInitializer;
use crate::net::{HOUSING_FEATURES, Net, NetBuilder};
use crate::tensor::{Dim2, Tensor, Tensor2};
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::StandardNormal;

pub const ROWS_LG: usize = 16384;
pub const ROWS_MD: usize = 2048;
pub const ROWS_SM: usize = 10;
const SEED: u64 = 0x8371943;

/// Standard normal features with a noisy linear target, shaped like the housing data.
pub fn get_regression_batch<T>(rows: usize) -> (Tensor2<T>, Tensor2<T>)
where
    T: DType,
    StandardNormal: Distribution<T>,
{
    let mut rng = StdRng::seed_from_u64(SEED);
    let features: Tensor2<T> = Tensor::from_distribution(&mut rng, StandardNormal, Dim2(rows, HOUSING_FEATURES));
    let noise: Tensor2<T> = Tensor::from_distribution(&mut rng, StandardNormal, Dim2(rows, 1));
    let targets = features
        .as_ref()
        .chunks_exact(HOUSING_FEATURES)
        .zip(noise.iter())
        .map(|(row, &n)| {
            let signal = row
                .iter()
                .enumerate()
                .map(|(i, &x)| x * T::from_usize(i + 1))
                .sum::<T>();
            signal * T::from_f64(0.1) + n * T::from_f64(0.01)
        })
        .collect();
    (features, Tensor::from_vec(targets, Dim2(rows, 1)))
}

pub fn get_regression_dataset<T>(rows: usize) -> Result<Dataset<T>>
where
    T: DType,
    StandardNormal: Distribution<T>,
{
    let (features, targets) = get_regression_batch(rows);
    Dataset::new(features, targets)
}

/// The housing network with a fixed seed
pub fn get_housing_net<B: Backend>(backend: B) -> Result<Net<B>> {
    NetBuilder::housing(backend)
        .with_initializer(RandomNetInitializer::seed_from_u64(SEED))
        .build()
}
