//! Screen data for the dashboard.
//!
//! Each screen is a pure function of the dataset and the user's current
//! [`Selection`]. Nothing is cached: a parameter change re-runs the whole
//! function. A selection that matches no rows gives an empty view, which the
//! chart layer draws as an empty chart.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use crate::dataset::Dataset;
use crate::loader::REQUIRED_COLUMNS;
use crate::pipeline::{
    self, ContinentYearRollup, GlobalYearRollup, Metric, RecordFilter, filter_records,
};
use crate::record::Record;

/// Filter parameters chosen in the dashboard controls.
///
/// Empty strings, as sent by an unset `<select>`, count as "not chosen".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selection {
    pub continent: Option<String>,
    pub country: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    /// Single year shown on the EDA screen.
    pub year: Option<i32>,
}

impl Selection {
    pub fn continent(&self) -> Option<&str> {
        self.continent.as_deref().filter(|s| !s.is_empty())
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref().filter(|s| !s.is_empty())
    }

    /// The selection as a plain row filter, without screen defaults.
    pub fn to_filter(&self) -> RecordFilter {
        RecordFilter {
            continent: self.continent().map(str::to_string),
            country: self.country().map(str::to_string),
            year_min: self.year_min,
            year_max: self.year_max,
        }
    }
}

/// The dashboard's screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Eda,
    Global,
    Continent,
    Country,
}

impl FromStr for Screen {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eda" => Ok(Screen::Eda),
            "global" => Ok(Screen::Global),
            "continent" => Ok(Screen::Continent),
            "country" => Ok(Screen::Country),
            other => Err(format!("unknown screen: {}", other)),
        }
    }
}

/// Values offered by the selectors.
#[derive(Debug, Serialize)]
pub struct Options {
    pub continents: Vec<String>,
    pub countries: BTreeMap<String, Vec<String>>,
    pub years: Vec<i32>,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ContinentCount {
    pub continent: String,
    pub count: usize,
}

/// Values of one metric for the countries of a continent.
#[derive(Debug, PartialEq, Serialize)]
pub struct Distribution {
    pub continent: String,
    pub values: Vec<f64>,
}

/// One named group of points for a scatter chart.
#[derive(Debug, Serialize)]
pub struct ScatterSeries<'a> {
    pub name: String,
    pub points: Vec<&'a Record>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdaView {
    pub observations: usize,
    pub columns: usize,
    pub years: Vec<i32>,
    pub continent_counts: Vec<ContinentCount>,
    pub year: Option<i32>,
    pub gdp_percap: Vec<Distribution>,
    pub life_exp: Vec<Distribution>,
}

#[derive(Debug, Serialize)]
pub struct GlobalView<'a> {
    pub scatter: Vec<ScatterSeries<'a>>,
    pub population: Vec<GlobalYearRollup>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinentView<'a> {
    pub continent: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub rollups: Vec<ContinentYearRollup>,
    pub countries: Vec<ScatterSeries<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryView<'a> {
    pub continent: Option<String>,
    pub country: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub records: Vec<&'a Record>,
}

impl EdaView {
    pub fn is_empty(&self) -> bool {
        self.gdp_percap.is_empty()
    }
}

impl GlobalView<'_> {
    pub fn is_empty(&self) -> bool {
        self.population.is_empty()
    }
}

impl ContinentView<'_> {
    pub fn is_empty(&self) -> bool {
        self.rollups.is_empty()
    }
}

impl CountryView<'_> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// Splits records into named series, series in first-seen order.
fn series_by<'a, F>(records: &[&'a Record], name: F) -> Vec<ScatterSeries<'a>>
where
    F: Fn(&Record) -> &str,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut series: Vec<ScatterSeries<'a>> = Vec::new();

    for &record in records {
        let key = name(record);
        let slot = match index.get(key) {
            Some(&slot) => slot,
            None => {
                series.push(ScatterSeries {
                    name: key.to_string(),
                    points: Vec::new(),
                });
                index.insert(key, series.len() - 1);
                series.len() - 1
            }
        };
        series[slot].points.push(record);
    }

    series
}

fn distributions<'a>(records: &[&'a Record], metric: Metric) -> Vec<Distribution> {
    pipeline::values_by_continent(records.iter().copied(), metric)
        .into_iter()
        .map(|(continent, values)| Distribution { continent, values })
        .collect()
}

pub fn options(dataset: &Dataset) -> Options {
    let continents = pipeline::continents(dataset);
    let countries = continents
        .iter()
        .map(|c| (c.clone(), pipeline::countries_in(dataset, c)))
        .collect();

    Options {
        continents,
        countries,
        years: pipeline::years(dataset),
    }
}

/// Dataset shape, observations per continent, and the per-continent
/// distributions of GDP per capita and life expectancy for one year.
pub fn eda_view(dataset: &Dataset, selection: &Selection) -> EdaView {
    let years = pipeline::years(dataset);
    let year = selection.year.or_else(|| years.first().copied());

    let (gdp_percap, life_exp) = match year {
        Some(y) => {
            let rows = filter_records(dataset, &RecordFilter::default().years(y, y));
            (
                distributions(&rows, Metric::GdpPercap),
                distributions(&rows, Metric::LifeExp),
            )
        }
        None => (Vec::new(), Vec::new()),
    };

    EdaView {
        observations: dataset.len(),
        columns: REQUIRED_COLUMNS.len(),
        years,
        continent_counts: pipeline::count_by_continent(dataset)
            .into_iter()
            .map(|(continent, count)| ContinentCount { continent, count })
            .collect(),
        year,
        gdp_percap,
        life_exp,
    }
}

/// Every observation as GDP vs life expectancy, one series per continent,
/// and world population per year.
pub fn global_view(dataset: &Dataset) -> GlobalView<'_> {
    let rows: Vec<&Record> = dataset.iter().collect();

    GlobalView {
        scatter: series_by(&rows, |r| r.continent.as_str()),
        population: pipeline::rollup_by_year(dataset),
    }
}

/// Continent rollups over a year range, plus that continent's countries as
/// scatter series.
///
/// Defaults: the first continent and the dataset's full year range.
pub fn continent_view<'a>(dataset: &'a Dataset, selection: &Selection) -> ContinentView<'a> {
    let continent = selection
        .continent()
        .map(str::to_string)
        .or_else(|| pipeline::continents(dataset).into_iter().next());
    let bounds = pipeline::year_bounds(dataset);
    let year_min = selection.year_min.or(bounds.map(|b| b.0));
    let year_max = selection.year_max.or(bounds.map(|b| b.1));

    let Some(name) = continent.as_deref() else {
        return ContinentView {
            continent: None,
            year_min,
            year_max,
            rollups: Vec::new(),
            countries: Vec::new(),
        };
    };

    let filter = RecordFilter {
        continent: Some(name.to_string()),
        country: None,
        year_min,
        year_max,
    };
    let rows = filter_records(dataset, &filter);

    ContinentView {
        rollups: pipeline::rollup_by_continent_year(rows.iter().copied()),
        countries: series_by(&rows, |r| r.country.as_str()),
        continent,
        year_min,
        year_max,
    }
}

/// One country's observations over a year range.
///
/// Defaults: the first continent, its first country, and the years observed
/// for that continent. A country outside the chosen continent matches nothing.
pub fn country_view<'a>(dataset: &'a Dataset, selection: &Selection) -> CountryView<'a> {
    let continent = selection
        .continent()
        .map(str::to_string)
        .or_else(|| pipeline::continents(dataset).into_iter().next());
    let country = selection.country().map(str::to_string).or_else(|| {
        continent
            .as_deref()
            .and_then(|c| pipeline::countries_in(dataset, c).into_iter().next())
    });

    let bounds = continent.as_deref().and_then(|c| {
        pipeline::year_bounds(filter_records(dataset, &RecordFilter::default().continent(c)))
    });
    let year_min = selection.year_min.or(bounds.map(|b| b.0));
    let year_max = selection.year_max.or(bounds.map(|b| b.1));

    let records = match (&continent, &country) {
        (Some(continent), Some(country)) => {
            let filter = RecordFilter {
                continent: Some(continent.clone()),
                country: Some(country.clone()),
                year_min,
                year_max,
            };
            filter_records(dataset, &filter)
        }
        _ => Vec::new(),
    };

    CountryView {
        continent,
        country,
        year_min,
        year_max,
        records,
    }
}
