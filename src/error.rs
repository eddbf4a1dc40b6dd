//! Error types shared by the loader and the binaries.

use thiserror::Error;

/// Failure to turn a tabular source into a [`Dataset`](crate::Dataset).
///
/// Every variant is fatal at startup: the dashboard has nothing to show
/// without its table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column `{0}` is missing")]
    MissingColumn(&'static str),

    #[error("line {line}: invalid value {value:?} in column `{column}`")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("duplicate observation for {country} in {year}")]
    DuplicateObservation { country: String, year: i32 },

    #[error("{country} is listed under both {first} and {second}")]
    InconsistentContinent {
        country: String,
        first: String,
        second: String,
    },

    #[error("total population exceeds {}", u64::MAX)]
    PopulationOverflow,

    #[error("dataset has no records")]
    Empty,

    #[error("global dataset is already initialised")]
    AlreadyInitialised,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address {0:?}: {1}")]
    BindAddr(String, std::net::AddrParseError),
}
