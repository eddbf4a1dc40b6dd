/*!
# Gapminder Dashboard

A browser-based exploration dashboard over the Gapminder dataset, built in Rust.

## Overview

The Gapminder table holds one observation per country and year: GDP per capita,
life expectancy and population. The dashboard lets a user pick a continent, a
country and a range of years and shows the derived time series, distributions
and scatter plots.

## Architecture

### Data Layer
- **loader**: Reads the CSV source into a validated [`Dataset`]
- **dataset**: The immutable in-memory table and its process-wide slot

### Aggregation Layer
- **pipeline**: Row filters and group-by rollups (continent/year and year)

### Presentation Layer
- **views**: One pure function per screen (EDA, Global, Continent, Country)
- **chart**: SVG chart rendering with plotters (`web` feature)
- **downloader**: CSV and XLSX export of a filtered selection
- **app**: Routing and handlers (`web` feature)

## REST API Endpoints

- `/api/options` - Continents, countries and years available for selection
- `/api/eda`, `/api/global`, `/api/continent`, `/api/country` - Screen data
- `/chart/{screen}/{chart}` - SVG chart for one screen
- `/api/export` - Download the filtered records
*/

pub mod config;
pub mod dataset;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod views;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod chart;

pub use dataset::Dataset;
pub use error::{ConfigError, LoadError};
pub use pipeline::{
    ContinentYearRollup, GlobalYearRollup, Metric, RecordFilter, filter_records,
    rollup_by_continent_year, rollup_by_year,
};
pub use record::Record;
pub use views::Selection;
