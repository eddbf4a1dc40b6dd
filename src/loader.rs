use csv::{ReaderBuilder, StringRecord, Trim};
use flate2::read::GzDecoder;
use log::{debug, info};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::LoadError;
use crate::record::Record;

/// Columns every source table must carry, in their canonical order.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "country",
    "continent",
    "year",
    "gdpPercap",
    "lifeExp",
    "pop",
];

/// One CSV row before validation. Numbers stay textual so a bad cell can be
/// reported with its column and line.
#[derive(Debug, Deserialize)]
struct RawRow {
    country: String,
    continent: String,
    year: String,
    #[serde(rename = "gdpPercap")]
    gdp_percap: String,
    #[serde(rename = "lifeExp")]
    life_exp: String,
    pop: String,
}

/// Load the dataset from a CSV file
///
/// A path ending in `.gz` is decompressed on the fly.
///
/// # Arguments
/// * `filepath` - Path to the CSV file to load
///
/// # Returns
/// * `Result<Dataset, LoadError>` - The validated dataset or the first problem found
///
/// # Examples
/// ```no_run
/// use gapminder::loader::from_csv;
///
/// match from_csv("gapminder.csv") {
///     Ok(dataset) => println!("Loaded {} observations", dataset.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = filepath.as_ref();
    let file = File::open(path)?;

    let is_gzip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

    let dataset = if is_gzip {
        from_reader(GzDecoder::new(BufReader::new(file)))?
    } else {
        from_reader(BufReader::new(file))?
    };

    info!(
        "loaded {} observations from {}",
        dataset.len(),
        path.display()
    );
    Ok(dataset)
}

/// Load the dataset from any reader yielding CSV text with a header row.
pub fn from_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers = rdr.headers()?.clone();
    check_headers(&headers)?;

    let mut records = Vec::new();
    let mut row = StringRecord::new();
    while rdr.read_record(&mut row)? {
        let line = row.position().map_or(0, |pos| pos.line());
        let raw: RawRow = row.deserialize(Some(&headers))?;
        records.push(parse_row(raw, line)?);
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    Dataset::new(records)
}

fn check_headers(headers: &StringRecord) -> Result<(), LoadError> {
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column));
        }
    }

    for extra in headers
        .iter()
        .filter(|h| !REQUIRED_COLUMNS.iter().any(|c| *c == *h))
    {
        debug!("ignoring column `{}`", extra);
    }

    Ok(())
}

fn parse_row(raw: RawRow, line: u64) -> Result<Record, LoadError> {
    let invalid = |column: &'static str, value: &str| LoadError::InvalidValue {
        line,
        column,
        value: value.to_string(),
    };

    if raw.country.is_empty() {
        return Err(invalid("country", &raw.country));
    }
    if raw.continent.is_empty() {
        return Err(invalid("continent", &raw.continent));
    }

    let year = raw
        .year
        .parse::<i32>()
        .map_err(|_| invalid("year", &raw.year))?;
    let gdp_percap =
        parse_measure(&raw.gdp_percap).ok_or_else(|| invalid("gdpPercap", &raw.gdp_percap))?;
    let life_exp =
        parse_measure(&raw.life_exp).ok_or_else(|| invalid("lifeExp", &raw.life_exp))?;
    let pop = parse_count(&raw.pop).ok_or_else(|| invalid("pop", &raw.pop))?;

    Ok(Record {
        country: raw.country,
        continent: raw.continent,
        year,
        gdp_percap,
        life_exp,
        pop,
    })
}

// Finite and non-negative.
fn parse_measure(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

// Integer counts; some exports write them as integral floats (`8425333.0`, `1.2e7`).
fn parse_count(value: &str) -> Option<u64> {
    if let Ok(n) = value.parse::<u64>() {
        return Some(n);
    }
    parse_measure(value)
        .filter(|v| v.fract() == 0.0 && *v < u64::MAX as f64)
        .map(|v| v as u64)
}
