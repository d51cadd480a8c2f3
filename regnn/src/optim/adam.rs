use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::optim::{Optimizer, ParamGrad};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AdamParams {
    pub learning_rate: f64,
    pub beta1: f64,
    pub beta2: f64,
    pub epsilon: f64,
}

impl Default for AdamParams {
    fn default() -> Self {
        AdamParams {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
        }
    }
}

/// Adam with bias corrected first and second moment estimates.
///
/// Moment buffers are allocated on the first step and matched by position afterwards.
#[derive(Debug)]
pub struct Adam<F> {
    params: AdamParams,
    step: i32,
    m: Vec<Box<[F]>>,
    v: Vec<Box<[F]>>,
}

impl<F: DType> Adam<F> {
    pub fn new(params: AdamParams) -> Self {
        Adam {
            params,
            step: 0,
            m: Vec::new(),
            v: Vec::new(),
        }
    }

    pub fn with_learning_rate(learning_rate: f64) -> Self {
        Self::new(AdamParams {
            learning_rate,
            ..AdamParams::default()
        })
    }

    #[inline]
    pub fn params(&self) -> &AdamParams {
        &self.params
    }

    /// Number of updates applied so far
    #[inline]
    pub fn steps(&self) -> i32 {
        self.step
    }

    fn init_state(&mut self, params: &[ParamGrad<'_, F>]) -> Result<()> {
        if self.m.is_empty() {
            self.m = params.iter().map(|pg| vec![F::ZERO; pg.param.len()].into_boxed_slice()).collect();
            self.v = self.m.clone();
            return Ok(());
        }
        if self.m.len() != params.len() {
            return Err(Error::DimensionMismatch {
                context: "optimizer parameter count",
                expected: self.m.len(),
                actual: params.len(),
            });
        }
        for (m, pg) in self.m.iter().zip(params) {
            if m.len() != pg.param.len() || pg.grad.len() != pg.param.len() {
                return Err(Error::DimensionMismatch {
                    context: "optimizer parameter length",
                    expected: m.len(),
                    actual: pg.param.len(),
                });
            }
        }
        Ok(())
    }
}

impl<F: DType> Default for Adam<F> {
    fn default() -> Self {
        Self::new(AdamParams::default())
    }
}

impl<F: DType> Optimizer<F> for Adam<F> {
    fn step(&mut self, params: &mut [ParamGrad<'_, F>]) -> Result<()> {
        self.init_state(params)?;
        self.step += 1;

        let AdamParams {
            learning_rate,
            beta1,
            beta2,
            epsilon,
        } = self.params;
        let bc1 = F::from_f64(1.0 - beta1.powi(self.step));
        let bc2 = F::from_f64(1.0 - beta2.powi(self.step));
        let (lr, b1, b2, eps) = (
            F::from_f64(learning_rate),
            F::from_f64(beta1),
            F::from_f64(beta2),
            F::from_f64(epsilon),
        );

        for ((pg, m), v) in params.iter_mut().zip(self.m.iter_mut()).zip(self.v.iter_mut()) {
            pg.param
                .iter_mut()
                .zip(pg.grad)
                .zip(m.iter_mut())
                .zip(v.iter_mut())
                .for_each(|(((p, &g), m), v)| {
                    *m = b1 * *m + (F::ONE - b1) * g;
                    *v = b2 * *v + (F::ONE - b2) * g * g;
                    let m_hat = *m / bc1;
                    let v_hat = *v / bc2;
                    *p -= lr * m_hat / (v_hat.sqrt() + eps);
                });
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.step = 0;
        self.m.clear();
        self.v.clear();
    }

    #[inline]
    fn learning_rate(&self) -> f64 {
        self.params.learning_rate
    }

    #[inline]
    fn set_learning_rate(&mut self, learning_rate: f64) {
        self.params.learning_rate = learning_rate;
    }
}

#[cfg(test)]
mod test {
    use super::Adam;
    use crate::error::Error;
    use crate::optim::{Optimizer, ParamGrad};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_first_step_moves_by_learning_rate() {
        let mut adam = Adam::<f64>::with_learning_rate(0.01);
        let mut weights = vec![1.0, -2.0, 0.5];
        let grads = vec![3.0, -0.25, 0.0];
        adam.step(&mut [ParamGrad::new(&mut weights, &grads)]).unwrap();
        // m_hat / sqrt(v_hat) == sign(g) on the first step
        assert_abs_diff_eq!(weights[0], 0.99, epsilon = 1e-6);
        assert_abs_diff_eq!(weights[1], -1.99, epsilon = 1e-6);
        assert_eq!(weights[2], 0.5);
        assert_eq!(adam.steps(), 1);
    }

    #[test]
    fn test_minimizes_quadratic() {
        let mut adam = Adam::<f32>::with_learning_rate(0.1);
        let mut x = vec![3.0f32, -4.0];
        for _ in 0..500 {
            let grad: Vec<f32> = x.iter().map(|&v| 2.0 * v).collect();
            adam.step(&mut [ParamGrad::new(&mut x, &grad)]).unwrap();
        }
        assert_abs_diff_eq!(x[0], 0.0, epsilon = 1e-2);
        assert_abs_diff_eq!(x[1], 0.0, epsilon = 1e-2);
    }

    #[test]
    fn test_shape_change_is_rejected() {
        let mut adam = Adam::<f32>::default();
        let mut a = vec![1.0f32; 4];
        let g = vec![0.1f32; 4];
        adam.step(&mut [ParamGrad::new(&mut a, &g)]).unwrap();

        let mut b = vec![1.0f32; 3];
        let h = vec![0.1f32; 3];
        assert!(matches!(
            adam.step(&mut [ParamGrad::new(&mut b, &h)]),
            Err(Error::DimensionMismatch { expected: 4, actual: 3, .. })
        ));
        assert!(matches!(
            adam.step(&mut [ParamGrad::new(&mut a, &g), ParamGrad::new(&mut b, &h)]),
            Err(Error::DimensionMismatch { expected: 1, actual: 2, .. })
        ));
    }

    #[test]
    fn test_reset_starts_over() {
        let mut adam = Adam::<f64>::with_learning_rate(0.1);
        let mut a = vec![1.0; 2];
        adam.step(&mut [ParamGrad::new(&mut a, &[0.5, -0.5])]).unwrap();
        adam.step(&mut [ParamGrad::new(&mut a, &[0.5, -0.5])]).unwrap();
        adam.reset();
        assert_eq!(adam.steps(), 0);

        // a differently shaped parameter set is accepted after a reset
        let mut b = vec![1.0; 3];
        adam.step(&mut [ParamGrad::new(&mut b, &[1.0, 1.0, -1.0])]).unwrap();
        assert_abs_diff_eq!(b[0], 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(b[2], 1.1, epsilon = 1e-6);
    }

    #[test]
    fn test_learning_rate_accessors() {
        let mut adam = Adam::<f32>::default();
        assert_eq!(adam.learning_rate(), 1e-3);
        adam.set_learning_rate(1e-4);
        assert_eq!(adam.params().learning_rate, 1e-4);
    }
}
