use crate::net::NetMode;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum Error {
    EmptyDataset,
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },
    InvalidConfig(String),
    NonFinite {
        context: &'static str,
        epoch: Option<usize>,
        batch: Option<usize>,
        value: f64,
    },
    WrongMode {
        expected: NetMode,
        actual: NetMode,
    },
    Io(std::io::Error),
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_config<M>(msg: M) -> Self
    where
        M: Into<String>,
    {
        Error::InvalidConfig(msg.into())
    }

    pub fn non_finite(context: &'static str, value: f64) -> Self {
        Error::NonFinite {
            context,
            epoch: None,
            batch: None,
            value,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyDataset => f.write_str("dataset is empty"),
            Error::DimensionMismatch {
                context,
                expected,
                actual,
            } => write!(f, "dimension mismatch in {context}: expected {expected}, got {actual}"),
            Error::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Error::NonFinite {
                context,
                epoch,
                batch,
                value,
            } => {
                write!(f, "non-finite value {value} in {context}")?;
                if let Some(epoch) = epoch {
                    write!(f, " at epoch {epoch}")?;
                }
                if let Some(batch) = batch {
                    write!(f, " batch {batch}")?;
                }
                Ok(())
            }
            Error::WrongMode { expected, actual } => {
                write!(f, "network is in {actual:?} mode, operation requires {expected:?} mode")
            }
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value)
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Parse(value.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::Error;
    use crate::net::NetMode;

    #[test]
    fn test_display() {
        let err = Error::NonFinite {
            context: "batch loss",
            epoch: Some(3),
            batch: Some(7),
            value: f64::NAN,
        };
        assert_eq!("non-finite value NaN in batch loss at epoch 3 batch 7", err.to_string());

        let err = Error::WrongMode {
            expected: NetMode::Train,
            actual: NetMode::Eval,
        };
        assert_eq!("network is in Eval mode, operation requires Train mode", err.to_string());

        let err = Error::DimensionMismatch {
            context: "input features",
            expected: 8,
            actual: 3,
        };
        assert_eq!("dimension mismatch in input features: expected 8, got 3", err.to_string());
    }
}
