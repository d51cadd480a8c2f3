use csv::{ReaderBuilder, WriterBuilder};
use regnn::data::Dataset;
use regnn::dtype::DType;
use regnn::error::{Error, Result};
use regnn::tensor::{Dim2, Tensor};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Feature columns of the California housing CSV, in file order. The target follows them.
pub const FEATURE_COLUMNS: [&str; 8] = [
    "MedInc",
    "HouseAge",
    "AveRooms",
    "AveBedrms",
    "Population",
    "AveOccup",
    "Latitude",
    "Longitude",
];
pub const TARGET_COLUMN: &str = "MedHouseVal";

/// Reads a headed CSV with the eight feature columns followed by the target column.
pub fn read_california_housing<T: DType, R: Read>(reader: R) -> Result<Dataset<T>> {
    let num_cols = FEATURE_COLUMNS.len() + 1;
    let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

    let headers = rdr.headers().map_err(csv_error)?;
    if headers.len() != num_cols {
        return Err(Error::DimensionMismatch {
            context: "csv header columns",
            expected: num_cols,
            actual: headers.len(),
        });
    }

    let mut features = Vec::new();
    let mut targets = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        let record = result.map_err(csv_error)?;
        if record.len() != num_cols {
            return Err(Error::DimensionMismatch {
                context: "csv record columns",
                expected: num_cols,
                actual: record.len(),
            });
        }
        for (col, field) in record.iter().enumerate() {
            let value: f64 = field
                .parse()
                .map_err(|_| Error::Parse(format!("row {row} column {col}: invalid number {field:?}")))?;
            if col < FEATURE_COLUMNS.len() {
                features.push(T::from_f64(value));
            } else {
                targets.push(T::from_f64(value));
            }
        }
    }

    let rows = targets.len();
    Dataset::new(
        Tensor::from_vec(features, Dim2(rows, FEATURE_COLUMNS.len())),
        Tensor::from_vec(targets, Dim2(rows, 1)),
    )
}

pub fn load_california_housing<T: DType, P: AsRef<Path>>(path: P) -> Result<Dataset<T>> {
    let file = File::open(path)?;
    read_california_housing(BufReader::new(file))
}

/// Writes one `epoch,mse` record per epoch.
pub fn write_history<W: Write>(writer: W, history: &[f64]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(["epoch", "mse"]).map_err(csv_error)?;
    for (epoch, mse) in history.iter().enumerate() {
        wtr.write_record([epoch.to_string(), mse.to_string()]).map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_history_csv<P: AsRef<Path>>(path: P, history: &[f64]) -> Result<()> {
    let file = File::create(path)?;
    write_history(BufWriter::new(file), history)
}

fn csv_error(err: csv::Error) -> Error {
    match err.into_kind() {
        csv::ErrorKind::Io(err) => Error::Io(err),
        kind => Error::Parse(format!("csv: {kind:?}")),
    }
}

#[cfg(test)]
mod test {
    use super::{read_california_housing, write_history};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use regnn::backend::CpuBackend;
    use regnn::error::Error;
    use regnn::net::NetBuilder;
    use regnn::net::initializer::RandomNetInitializer;
    use regnn::preprocessing::StandardScaler;
    use regnn::tensor::RowMajor;
    use regnn::trainer::{TrainConfig, Trainer};
    use std::fmt::Write;

    const SAMPLE: &str = "\
MedInc,HouseAge,AveRooms,AveBedrms,Population,AveOccup,Latitude,Longitude,MedHouseVal
8.3252,41.0,6.98,1.02,322.0,2.55,37.88,-122.23,4.526
8.3014,21.0,6.24,0.97,2401.0,2.11,37.86,-122.22,3.585
7.2574,52.0,8.29,1.07,496.0,2.80,37.85,-122.24,3.521
";

    #[test]
    fn test_read() {
        let dataset = read_california_housing::<f64, _>(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.num_features(), 8);
        assert_eq!(dataset.features().row(1)[4], 2401.0);
        assert_eq!(dataset.features().row(2)[7], -122.24);
        assert_eq!(dataset.targets().as_ref(), &[4.526, 3.585, 3.521]);
    }

    #[test]
    fn test_read_errors() {
        let short = "a,b,c\n1,2,3\n";
        assert!(matches!(
            read_california_housing::<f32, _>(short.as_bytes()),
            Err(Error::DimensionMismatch { expected: 9, actual: 3, .. })
        ));

        let bad = SAMPLE.replace("496.0", "many");
        assert!(matches!(
            read_california_housing::<f32, _>(bad.as_bytes()),
            Err(Error::Parse(msg)) if msg.contains("row 2 column 4")
        ));

        let header_only = SAMPLE.lines().next().unwrap();
        assert!(matches!(
            read_california_housing::<f32, _>(header_only.as_bytes()),
            Err(Error::EmptyDataset)
        ));

        let nan = SAMPLE.replace("3.585", "NaN");
        assert!(matches!(
            read_california_housing::<f32, _>(nan.as_bytes()),
            Err(Error::NonFinite { .. })
        ));
    }

    #[test]
    fn test_write_history() {
        let mut out = Vec::new();
        write_history(&mut out, &[1.5, 0.25]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().collect::<Vec<_>>(), vec!["epoch,mse", "0,1.5", "1,0.25"]);
    }

    fn synthetic_csv(rows: usize) -> String {
        let mut csv = SAMPLE.lines().next().unwrap().to_string();
        for i in 0..rows {
            let income = 1.0 + (i % 9) as f64 * 0.8;
            let age = 5.0 + (i * 7 % 45) as f64;
            let rooms = 3.0 + (i % 5) as f64 * 0.6;
            let bedrooms = 1.0 + (i % 3) as f64 * 0.05;
            let population = 200.0 + (i * 37 % 1500) as f64;
            let occupancy = 2.0 + (i % 4) as f64 * 0.3;
            let latitude = 33.0 + (i % 10) as f64 * 0.9;
            let longitude = -124.0 + (i % 8) as f64 * 1.1;
            let value = 0.4 * income + 0.01 * age + 0.5;
            write!(
                csv,
                "\n{income},{age},{rooms},{bedrooms},{population},{occupancy},{latitude},{longitude},{value}"
            )
            .unwrap();
        }
        csv.push('\n');
        csv
    }

    #[test]
    fn test_csv_to_trained_net() {
        let dataset = read_california_housing::<f64, _>(synthetic_csv(40).as_bytes()).unwrap();
        assert_eq!(dataset.len(), 40);

        let mut rng = StdRng::seed_from_u64(11);
        let (train, test) = dataset.train_test_split(0.7, &mut rng).unwrap();
        assert_eq!((train.len(), test.len()), (28, 12));

        let scaler = StandardScaler::fit(train.features()).unwrap();
        let train = scaler.apply_dataset(train).unwrap();
        let test = scaler.apply_dataset(test).unwrap();

        let net = NetBuilder::housing(CpuBackend::<f64>::new())
            .with_initializer(RandomNetInitializer::seed_from_u64(11))
            .build()
            .unwrap();
        let config = TrainConfig {
            epochs: 3,
            batch_size: 5,
            learning_rate: 1e-3,
            restore_best: true,
        };
        let report = Trainer::new(net, config).run(&train, &test).unwrap();

        assert_eq!(report.history.len(), 3);
        assert!(report.best_error.is_finite());
        let lowest = report.history.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(report.best_error, lowest);
        assert_eq!(report.history[report.best_epoch], lowest);
    }
}
