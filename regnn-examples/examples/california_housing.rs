use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use regnn::backend::CpuBackend;
use regnn::error::Result;
use regnn::net::NetBuilder;
use regnn::net::initializer::RandomNetInitializer;
use regnn::preprocessing::StandardScaler;
use regnn::report::{render_chart, summary_lines};
use regnn::trainer::Trainer;
use regnn_examples::config::ExperimentConfig;
use regnn_examples::util::{load_california_housing, write_history_csv};
use std::process::ExitCode;
use std::time::Instant;

const CHART_WIDTH: usize = 60;
const CHART_HEIGHT: usize = 15;

pub fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let config = ExperimentConfig::from_env()?;
    info!("{config:?}");

    let dataset = load_california_housing::<f32, _>(&config.data_path)?;
    info!("loaded {} rows from {}", dataset.len(), config.data_path.display());

    let mut rng = StdRng::seed_from_u64(config.seed);
    let (train, test) = dataset.train_test_split(config.train_fraction, &mut rng)?;

    // statistics come from the training rows only
    let scaler = StandardScaler::fit(train.features())?;
    let train = scaler.apply_dataset(train)?;
    let test = scaler.apply_dataset(test)?;

    let net = NetBuilder::housing(CpuBackend::<f32>::new())
        .with_initializer(RandomNetInitializer::seed_from_u64(config.seed))
        .build()?;

    let start = Instant::now();
    let mut trainer = Trainer::new(net, config.train);
    let report = trainer.run(&train, &test)?;
    info!(
        "training time for {} epochs and batch size {}: {} sec",
        config.train.epochs,
        config.train.batch_size,
        start.elapsed().as_secs_f32()
    );

    if let Some(path) = &config.history_path {
        write_history_csv(path, &report.history)?;
        info!("wrote error history to {}", path.display());
    }

    for line in summary_lines(report.best_error) {
        println!("{line}");
    }
    print!("{}", render_chart(&report.history, CHART_WIDTH, CHART_HEIGHT));
    Ok(())
}
