#![cfg(not(tarpaulin_include))]

use gapminder::app;
use gapminder::config::Config;
use log::{error, info};

/// Main entry point for the web dashboard
///
/// # Arguments
/// * `website [data_path] [bind_addr]`, see [`Config::from_args`]
///
/// # Default Configuration
/// * Reads `gapminder.csv` and listens on `127.0.0.1:3000`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_args(std::env::args())?;
    info!(
        "starting dashboard with {} on {}",
        config.data_path.display(),
        config.bind_addr
    );

    if let Err(e) = app::run(config).await {
        error!("{}", e);
        return Err(e);
    }

    Ok(())
}
