use crate::dtype::DType;
use crate::tensor::{Dim1, Dim2, Tensor, Tensor1, Tensor2};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;

pub trait NetInitializer<T: DType> {
    fn get_weights(&mut self, layer_idx: usize, input_size: usize, output_size: usize) -> Tensor2<T>;
    fn get_biases(&mut self, layer_idx: usize, input_size: usize, output_size: usize) -> Tensor1<T>;
}

/// Draws weights and biases from `U(-1/sqrt(fan_in), 1/sqrt(fan_in))`.
pub struct RandomNetInitializer {
    rng: StdRng,
}

impl RandomNetInitializer {
    pub fn seed_from_u64(seed: u64) -> Self {
        RandomNetInitializer {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn sample<T: DType>(&mut self, fan_in: usize, len: usize) -> Vec<T> {
        let bound = 1.0 / (fan_in.max(1) as f64).sqrt();
        let dist = Uniform::new_inclusive(-bound, bound);
        dist.sample_iter(&mut self.rng).take(len).map(T::from_f64).collect()
    }
}

impl Default for RandomNetInitializer {
    fn default() -> Self {
        RandomNetInitializer {
            rng: StdRng::from_entropy(),
        }
    }
}

impl<T: DType> NetInitializer<T> for RandomNetInitializer {
    fn get_weights(&mut self, _layer_idx: usize, input_size: usize, output_size: usize) -> Tensor2<T> {
        let dims = Dim2(output_size, input_size);
        Tensor::from_vec(self.sample(input_size, output_size * input_size), dims)
    }

    fn get_biases(&mut self, _layer_idx: usize, input_size: usize, output_size: usize) -> Tensor1<T> {
        Tensor::from_vec(self.sample(input_size, output_size), Dim1(output_size))
    }
}

#[cfg(test)]
mod test {
    use super::{NetInitializer, RandomNetInitializer};
    use crate::tensor::{Dim1, Dim2, ITensor, Tensor2};

    #[test]
    fn test_random_bounds() {
        let mut init = RandomNetInitializer::seed_from_u64(7);
        let w: Tensor2<f64> = init.get_weights(0, 16, 4);
        assert_eq!(w.dims(), &Dim2(4, 16));
        assert!(w.iter().all(|&x| x.abs() <= 0.25));
        let b = NetInitializer::<f64>::get_biases(&mut init, 0, 16, 4);
        assert_eq!(b.dims(), &Dim1(4));
        assert!(b.iter().all(|&x| x.abs() <= 0.25));
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let w1: Tensor2<f32> = RandomNetInitializer::seed_from_u64(42).get_weights(0, 8, 24);
        let w2: Tensor2<f32> = RandomNetInitializer::seed_from_u64(42).get_weights(0, 8, 24);
        assert_eq!(w1, w2);
        let w3: Tensor2<f32> = RandomNetInitializer::seed_from_u64(43).get_weights(0, 8, 24);
        assert_ne!(w1, w3);
    }
}
