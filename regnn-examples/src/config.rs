//! Experiment settings, read from `REGNN_*` environment variables on top of the defaults.

use regnn::error::{Error, Result};
use regnn::trainer::TrainConfig;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_DATA_PATH: &str = "regnn-examples/data/california_housing.csv";
pub const DEFAULT_TRAIN_FRACTION: f64 = 0.7;
pub const DEFAULT_SEED: u64 = 0x5eed;

const VAR_DATA: &str = "REGNN_DATA";
const VAR_EPOCHS: &str = "REGNN_EPOCHS";
const VAR_BATCH_SIZE: &str = "REGNN_BATCH_SIZE";
const VAR_LEARNING_RATE: &str = "REGNN_LEARNING_RATE";
const VAR_TRAIN_FRACTION: &str = "REGNN_TRAIN_FRACTION";
const VAR_SEED: &str = "REGNN_SEED";
const VAR_HISTORY: &str = "REGNN_HISTORY";

#[derive(Clone, Debug, PartialEq)]
pub struct ExperimentConfig {
    pub train: TrainConfig,
    /// share of the rows used for training, the rest is held out
    pub train_fraction: f64,
    /// seeds both the split and the weight initialization
    pub seed: u64,
    pub data_path: PathBuf,
    /// where to write the per-epoch error history, if anywhere
    pub history_path: Option<PathBuf>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        ExperimentConfig {
            train: TrainConfig::default(),
            train_fraction: DEFAULT_TRAIN_FRACTION,
            seed: DEFAULT_SEED,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            history_path: None,
        }
    }
}

impl ExperimentConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(env::vars().filter(|(key, _)| key.starts_with("REGNN_")))
    }

    /// Builds a config from `(name, value)` pairs, unknown names are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        let mut config = ExperimentConfig::default();

        if let Some(path) = vars.get(VAR_DATA) {
            config.data_path = PathBuf::from(path);
        }
        if let Some(path) = vars.get(VAR_HISTORY) {
            config.history_path = Some(PathBuf::from(path));
        }
        parse_into(&vars, VAR_EPOCHS, &mut config.train.epochs)?;
        parse_into(&vars, VAR_BATCH_SIZE, &mut config.train.batch_size)?;
        parse_into(&vars, VAR_LEARNING_RATE, &mut config.train.learning_rate)?;
        parse_into(&vars, VAR_TRAIN_FRACTION, &mut config.train_fraction)?;
        if let Some(seed) = vars.get(VAR_SEED) {
            config.seed = parse_seed(seed)?;
        }

        if !(config.train_fraction > 0.0 && config.train_fraction < 1.0) {
            return Err(Error::invalid_config(format!(
                "{VAR_TRAIN_FRACTION} must be in (0, 1), got {}",
                config.train_fraction
            )));
        }
        Ok(config)
    }
}

fn parse_into<T: FromStr>(vars: &HashMap<String, String>, key: &str, target: &mut T) -> Result<()> {
    if let Some(raw) = vars.get(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| Error::invalid_config(format!("{key} has an invalid value {raw:?}")))?;
    }
    Ok(())
}

// accepts decimal or 0x prefixed hex
fn parse_seed(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|_| Error::invalid_config(format!("{VAR_SEED} has an invalid value {raw:?}")))
}
