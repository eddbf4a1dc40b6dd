use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_DATA_PATH: &str = "gapminder.csv";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

pub const DATA_ENV: &str = "GAPMINDER_DATA";
pub const ADDR_ENV: &str = "GAPMINDER_ADDR";

/// Startup settings for the binaries.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub data_path: PathBuf,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Resolve settings from `website [data_path] [bind_addr]`, falling back to
    /// `GAPMINDER_DATA` / `GAPMINDER_ADDR`, then to the defaults.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        Self::resolve(args, |key| env::var(key).ok())
    }

    fn resolve<I, E>(args: I, lookup: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
        E: Fn(&str) -> Option<String>,
    {
        // Skip the program name
        let mut args = args.into_iter().skip(1);

        let data_path = args
            .next()
            .or_else(|| lookup(DATA_ENV))
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
        let addr = args
            .next()
            .or_else(|| lookup(ADDR_ENV))
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let bind_addr = addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::BindAddr(addr.clone(), e))?;

        Ok(Config {
            data_path: PathBuf::from(data_path),
            bind_addr,
        })
    }
}
