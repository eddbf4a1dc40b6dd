#![cfg(not(tarpaulin_include))]

use gapminder::config::Config;
use gapminder::{loader, pipeline, views};
use log::error;
use std::process::ExitCode;

// Prints the EDA summary and the rollup tables of a Gapminder CSV.
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_args(std::env::args()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let dataset = match loader::from_csv(&config.data_path) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let eda = views::eda_view(&dataset, &views::Selection::default());
    println!(
        "The dataset has {} observations and {} columns.",
        eda.observations, eda.columns
    );
    println!("Years: {:?}", eda.years);
    println!();
    println!("{:<12} {:>6}", "continent", "count");
    for c in &eda.continent_counts {
        println!("{:<12} {:>6}", c.continent, c.count);
    }

    println!();
    println!(
        "{:<6} {:>14} {:>10} {:>16}",
        "year", "gdpPercap", "lifeExp", "pop"
    );
    for r in pipeline::rollup_by_year(&dataset) {
        println!(
            "{:<6} {:>14.2} {:>10.2} {:>16}",
            r.year, r.gdp_percap, r.life_exp, r.pop
        );
    }

    println!();
    println!(
        "{:<12} {:<6} {:>14} {:>10} {:>16}",
        "continent", "year", "gdpPercap", "lifeExp", "pop"
    );
    for r in pipeline::rollup_by_continent_year(&dataset) {
        println!(
            "{:<12} {:<6} {:>14.2} {:>10.2} {:>16}",
            r.continent, r.year, r.gdp_percap, r.life_exp, r.pop
        );
    }

    ExitCode::SUCCESS
}
