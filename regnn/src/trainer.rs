use num_traits::Float;
use crate::backend::{Backend, TensorTyped};
use crate::data::Dataset;
use crate::dtype::DType;
use crate::error::{Error, Result};
use crate::loss::LossFn;
use crate::net::{Net, NetMode, NetParams};
use crate::optim::{Adam, Optimizer};
use log::{debug, info};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    /// Load the parameters of the best epoch back into the network once training ends
    pub restore_best: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            epochs: 100,
            batch_size: 10,
            learning_rate: 1e-4,
            restore_best: true,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self, train_len: usize) -> Result<()> {
        if self.epochs == 0 {
            return Err(Error::invalid_config("epochs must be positive"));
        }
        if self.batch_size == 0 {
            return Err(Error::invalid_config("batch size must be positive"));
        }
        if self.batch_size > train_len {
            return Err(Error::invalid_config(format!(
                "batch size {} exceeds the {train_len} training rows",
                self.batch_size
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(Error::invalid_config(format!(
                "learning rate must be finite and positive, got {}",
                self.learning_rate
            )));
        }
        Ok(())
    }
}

/// Keeps the lowest error seen so far together with whatever was captured at that point.
///
/// Only a strictly lower error replaces the best, so ties keep the earliest epoch.
#[derive(Clone, Debug)]
pub struct BestTracker<P> {
    best_error: f64,
    best_epoch: Option<usize>,
    best: Option<P>,
}

impl<P> Default for BestTracker<P> {
    fn default() -> Self {
        BestTracker {
            best_error: f64::INFINITY,
            best_epoch: None,
            best: None,
        }
    }
}

impl<P> BestTracker<P> {
    /// Records `error` for `epoch`, calling `capture` only when it is a new best.
    pub fn observe<C>(&mut self, epoch: usize, error: f64, capture: C) -> bool
    where
        C: FnOnce() -> P,
    {
        if error < self.best_error {
            self.best_error = error;
            self.best_epoch = Some(epoch);
            self.best = Some(capture());
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn best_error(&self) -> f64 {
        self.best_error
    }

    #[inline]
    pub fn best_epoch(&self) -> Option<usize> {
        self.best_epoch
    }

    pub fn into_best(self) -> Option<(usize, f64, P)> {
        match (self.best_epoch, self.best) {
            (Some(epoch), Some(best)) => Some((epoch, self.best_error, best)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainReport<T> {
    pub best_error: f64,
    pub best_epoch: usize,
    /// held-out mean squared error of every epoch, in order
    pub history: Vec<f64>,
    pub best_params: NetParams<T>,
}

impl<T> TrainReport<T> {
    #[inline]
    pub fn best_rmse(&self) -> f64 {
        self.best_error.sqrt()
    }
}

/// Runs the epoch loop: mini-batch training followed by a held-out evaluation per epoch,
/// tracking the best epoch along the way.
pub struct Trainer<B: Backend, O = Adam<<B as TensorTyped>::Float>> {
    net: Net<B>,
    optimizer: O,
    config: TrainConfig,
    loss: LossFn,
    history: Vec<f64>,
}

impl<B: Backend> Trainer<B> {
    pub fn new(net: Net<B>, config: TrainConfig) -> Self {
        let optimizer = Adam::with_learning_rate(config.learning_rate);
        Trainer::with_optimizer(net, config, optimizer)
    }
}

impl<B, O> Trainer<B, O>
where
    B: Backend,
    O: Optimizer<B::Float>,
{
    pub fn with_optimizer(net: Net<B>, config: TrainConfig, optimizer: O) -> Self {
        Trainer {
            net,
            optimizer,
            config,
            loss: LossFn::MSE,
            history: Vec::new(),
        }
    }

    /// Trains for `config.epochs` epochs and returns the best held-out error.
    ///
    /// Training rows are visited in their stored order and the optimizer starts from a clean
    /// state on every call. The network is left in [`NetMode::Eval`], holding the best
    /// parameters when `restore_best` is set and the last ones otherwise.
    pub fn run(&mut self, train: &Dataset<B::Float>, test: &Dataset<B::Float>) -> Result<TrainReport<B::Float>> {
        self.config.validate(train.len())?;
        self.check_width("train features", train)?;
        self.check_width("test features", test)?;

        let TrainConfig {
            epochs,
            batch_size,
            learning_rate,
            restore_best,
        } = self.config;
        self.optimizer.reset();
        self.optimizer.set_learning_rate(learning_rate);
        self.history.clear();
        self.history.reserve(epochs);

        info!(
            "training {} parameters for {epochs} epochs on {} rows, holding out {} rows",
            self.net.num_params(),
            train.len(),
            test.len()
        );

        let mut tracker = BestTracker::default();
        for epoch in 0..epochs {
            self.net.set_mode(NetMode::Train);
            for (batch_idx, batch) in train.batches(batch_size).enumerate() {
                self.net.zero_grad();
                let loss = self.net.train_batch(&batch.features, &batch.targets, &self.loss)?;
                if !loss.is_finite() {
                    return Err(Error::NonFinite {
                        context: "batch loss",
                        epoch: Some(epoch),
                        batch: Some(batch_idx),
                        value: loss,
                    });
                }
                debug!("epoch {epoch} batch {batch_idx}: loss {loss:.6}");

                let mut params = self.net.params_and_grads();
                let bad_grad = params.iter().flat_map(|pg| pg.grad.iter()).find(|g| !g.is_finite());
                if let Some(value) = bad_grad {
                    return Err(Error::NonFinite {
                        context: "gradient",
                        epoch: Some(epoch),
                        batch: Some(batch_idx),
                        value: value.as_f64(),
                    });
                }
                self.optimizer.step(&mut params)?;
            }

            self.net.set_mode(NetMode::Eval);
            let error = self.net.evaluate(test.features(), test.targets(), &self.loss)?;
            if !error.is_finite() {
                return Err(Error::NonFinite {
                    context: "held-out error",
                    epoch: Some(epoch),
                    batch: None,
                    value: error,
                });
            }
            self.history.push(error);

            let net = &self.net;
            if tracker.observe(epoch, error, || net.snapshot()) {
                info!("epoch {epoch}: held-out mse {error:.4} (new best)");
            } else {
                info!("epoch {epoch}: held-out mse {error:.4}");
            }
        }

        let (best_epoch, best_error, best_params) = tracker
            .into_best()
            .ok_or_else(|| Error::invalid_config("no epoch produced a held-out error"))?;
        if restore_best {
            self.net.restore(&best_params)?;
            debug!("restored parameters of epoch {best_epoch}");
        }
        info!("best held-out mse {best_error:.4} at epoch {best_epoch}");

        Ok(TrainReport {
            best_error,
            best_epoch,
            history: self.history.clone(),
            best_params,
        })
    }

    fn check_width(&self, context: &'static str, dataset: &Dataset<B::Float>) -> Result<()> {
        if dataset.num_features() != self.net.input_size() {
            return Err(Error::DimensionMismatch {
                context,
                expected: self.net.input_size(),
                actual: dataset.num_features(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn net(&self) -> &Net<B> {
        &self.net
    }

    #[inline]
    pub fn net_mut(&mut self) -> &mut Net<B> {
        &mut self.net
    }

    #[inline]
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Held-out errors of the last run
    #[inline]
    pub fn history(&self) -> &[f64] {
        &self.history
    }
}

#[cfg(test)]
mod test {
    use super::{BestTracker, TrainConfig, Trainer};
    use crate::activation::ActivationFn;
    use crate::backend::CpuBackend;
    use crate::data::Dataset;
    use crate::error::{Error, Result};
    use crate::loss::LossFn;
    use crate::net::initializer::RandomNetInitializer;
    use crate::net::layer::DenseLayerParams;
    use crate::net::{Net, NetBuilder, NetMode};
    use crate::optim::{Optimizer, ParamGrad};
    use crate::tensor::{Dim2, Tensor};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn linear_dataset(rows: usize, seed: u64) -> Dataset<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut features = Vec::with_capacity(rows * 3);
        let mut targets = Vec::with_capacity(rows);
        for _ in 0..rows {
            let x: [f64; 3] = [rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)];
            features.extend_from_slice(&x);
            targets.push(2.0 * x[0] - x[1] + 0.5 * x[2] + 1.5);
        }
        Dataset::new(
            Tensor::from_vec(features, Dim2(rows, 3)),
            Tensor::from_vec(targets, Dim2(rows, 1)),
        )
        .unwrap()
    }

    fn net(seed: u64) -> Net<CpuBackend<f64>> {
        NetBuilder::new(CpuBackend::new(), 3)
            .with_initializer(RandomNetInitializer::seed_from_u64(seed))
            .with_layer(DenseLayerParams {
                size: 8,
                activation_fn: ActivationFn::RELU,
            })
            .with_layer(DenseLayerParams {
                size: 1,
                activation_fn: ActivationFn::Identity,
            })
            .build()
            .unwrap()
    }

    fn config(epochs: usize) -> TrainConfig {
        TrainConfig {
            epochs,
            batch_size: 10,
            learning_rate: 1e-2,
            restore_best: true,
        }
    }

    #[test]
    fn test_best_tracker_ties_keep_earliest() {
        let mut tracker = BestTracker::default();
        let improved: Vec<bool> = [5.0, 3.2, 3.2, 4.1]
            .iter()
            .enumerate()
            .map(|(epoch, &err)| tracker.observe(epoch, err, || epoch))
            .collect();
        assert_eq!(improved, vec![true, true, false, false]);
        assert_eq!(tracker.best_error(), 3.2);
        assert_eq!(tracker.into_best(), Some((1, 3.2, 1)));
    }

    #[test]
    fn test_config_validation() {
        assert!(TrainConfig::default().validate(10).is_ok());
        let bad = [
            TrainConfig { epochs: 0, ..config(1) },
            TrainConfig { batch_size: 0, ..config(1) },
            TrainConfig { batch_size: 11, ..config(1) },
            TrainConfig { learning_rate: 0.0, ..config(1) },
            TrainConfig { learning_rate: f64::NAN, ..config(1) },
            TrainConfig { learning_rate: f64::INFINITY, ..config(1) },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(10), Err(Error::InvalidConfig(_))), "{cfg:?}");
        }
    }

    #[test]
    fn test_history_and_best() {
        let (train, test) = (linear_dataset(70, 1), linear_dataset(30, 2));
        let mut trainer = Trainer::new(net(3), config(12));
        let report = trainer.run(&train, &test).unwrap();

        assert_eq!(report.history.len(), 12);
        assert_eq!(trainer.history(), report.history.as_slice());
        let min = report.history.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(report.best_error, min);
        assert_eq!(report.history[report.best_epoch], min);
        assert_eq!(report.best_rmse(), min.sqrt());

        // the restored parameters reproduce the best error
        assert_eq!(trainer.net().mode(), NetMode::Eval);
        assert_eq!(trainer.net().snapshot(), report.best_params);
        let err = trainer
            .net_mut()
            .evaluate(test.features(), test.targets(), &crate::loss::LossFn::MSE)
            .unwrap();
        assert_eq!(err, report.best_error);
    }

    #[test]
    fn test_training_reduces_error() {
        let (train, test) = (linear_dataset(140, 4), linear_dataset(60, 5));
        let mut trainer = Trainer::new(net(6), config(25));
        let report = trainer.run(&train, &test).unwrap();
        assert!(
            report.best_error < 0.5 * report.history[0],
            "history {:?}",
            report.history
        );
    }

    #[test]
    fn test_runs_are_deterministic() {
        let (train, test) = (linear_dataset(53, 7), linear_dataset(20, 8));
        let first = Trainer::new(net(9), config(5)).run(&train, &test).unwrap();
        let second = Trainer::new(net(9), config(5)).run(&train, &test).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_mismatched_data() {
        let train = linear_dataset(20, 1);
        let mut trainer = Trainer::new(net(1), config(1));
        let narrow = Dataset::new(Tensor::zeroed(Dim2(5, 2)), Tensor::zeroed(Dim2(5, 1))).unwrap();
        assert!(matches!(
            trainer.run(&train, &narrow),
            Err(Error::DimensionMismatch { expected: 3, actual: 2, .. })
        ));
        let mut trainer = Trainer::new(net(1), TrainConfig { batch_size: 21, ..config(1) });
        assert!(matches!(trainer.run(&train, &train), Err(Error::InvalidConfig(_))));
    }

    struct Poison;

    impl Optimizer<f64> for Poison {
        fn step(&mut self, params: &mut [ParamGrad<'_, f64>]) -> Result<()> {
            params.iter_mut().for_each(|pg| pg.param.fill(f64::NAN));
            Ok(())
        }

        fn reset(&mut self) {}

        fn learning_rate(&self) -> f64 {
            0.0
        }

        fn set_learning_rate(&mut self, _learning_rate: f64) {}
    }

    #[test]
    fn test_non_finite_loss_aborts() {
        let (train, test) = (linear_dataset(25, 1), linear_dataset(10, 2));
        let mut trainer = Trainer::with_optimizer(net(1), config(3), Poison);
        assert!(matches!(
            trainer.run(&train, &test),
            Err(Error::NonFinite {
                epoch: Some(0),
                batch: Some(1),
                ..
            })
        ));
    }

    #[test]
    fn test_non_finite_gradient_aborts() {
        // the f64 loss stays finite while the f32 weight gradient overflows
        let mut features: Vec<f32> = (0..60).map(|v| (v % 7) as f32 * 0.1).collect();
        features[0] = 1e30;
        let train = Dataset::new(
            Tensor::from_vec(features, Dim2(20, 3)),
            Tensor::from_vec(vec![1.0f32; 20], Dim2(20, 1)),
        )
        .unwrap();
        let net = NetBuilder::new(CpuBackend::<f32>::new(), 3)
            .with_initializer(RandomNetInitializer::seed_from_u64(2))
            .with_layer(DenseLayerParams {
                size: 1,
                activation_fn: ActivationFn::Identity,
            })
            .build()
            .unwrap();
        let mut trainer = Trainer::new(net, config(1));
        match trainer.run(&train, &train) {
            Err(Error::NonFinite {
                context,
                epoch,
                batch,
                value,
            }) => {
                assert_eq!(context, "gradient");
                assert_eq!((epoch, batch), (Some(0), Some(0)));
                assert!(!value.is_finite());
            }
            other => panic!("expected a non-finite gradient, got {other:?}"),
        }
    }

    /// Keeps a copy of every gradient it is handed and leaves the parameters alone.
    #[derive(Clone, Default)]
    struct Recorder {
        grads: Rc<RefCell<Vec<Vec<f64>>>>,
    }

    impl Optimizer<f64> for Recorder {
        fn step(&mut self, params: &mut [ParamGrad<'_, f64>]) -> Result<()> {
            let grads = params.iter().flat_map(|pg| pg.grad.iter().copied()).collect();
            self.grads.borrow_mut().push(grads);
            Ok(())
        }

        fn reset(&mut self) {}

        fn learning_rate(&self) -> f64 {
            0.0
        }

        fn set_learning_rate(&mut self, _learning_rate: f64) {}
    }

    #[test]
    fn test_gradients_are_cleared_between_batches() {
        let (train, test) = (linear_dataset(30, 3), linear_dataset(10, 4));
        let recorder = Recorder::default();
        let mut trainer = Trainer::with_optimizer(net(5), config(1), recorder.clone());
        trainer.run(&train, &test).unwrap();

        let recorded = recorder.grads.borrow();
        assert_eq!(recorded.len(), 3);
        // parameters never move, so every batch on its own reproduces its recorded gradient
        let mut fresh = net(5);
        for (batch, grads) in train.batches(10).zip(recorded.iter()) {
            fresh.zero_grad();
            fresh.train_batch(&batch.features, &batch.targets, &LossFn::MSE).unwrap();
            let expected: Vec<f64> = fresh
                .params_and_grads()
                .iter()
                .flat_map(|pg| pg.grad.iter().copied())
                .collect();
            assert_eq!(grads, &expected);
        }
    }

    #[test]
    fn test_rerun_starts_with_fresh_optimizer_state() {
        let (train, test) = (linear_dataset(40, 1), linear_dataset(15, 2));
        let mut trainer = Trainer::new(net(4), config(3));
        let initial = trainer.net().snapshot();
        let first = trainer.run(&train, &test).unwrap();

        trainer.net_mut().restore(&initial).unwrap();
        let second = trainer.run(&train, &test).unwrap();
        assert_eq!(first, second);
    }
}
