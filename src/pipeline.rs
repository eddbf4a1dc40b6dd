//! Filtering and group-by rollups over the Gapminder table.
//!
//! Every function here is pure: it reads records and returns fresh vectors.
//! Group outputs are sorted by their key, so time series come out in year
//! order whatever the row order of the source.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::dataset::Dataset;
use crate::record::Record;

/// Row predicates. `None` fields match everything; bounds are inclusive.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub continent: Option<String>,
    pub country: Option<String>,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
}

impl RecordFilter {
    pub fn continent(mut self, continent: &str) -> Self {
        self.continent = Some(continent.to_string());
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.country = Some(country.to_string());
        self
    }

    pub fn years(mut self, year_min: i32, year_max: i32) -> Self {
        self.year_min = Some(year_min);
        self.year_max = Some(year_max);
        self
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.continent
            .as_deref()
            .is_none_or(|c| record.continent == c)
            && self.country.as_deref().is_none_or(|c| record.country == c)
            && record.in_years(self.year_min, self.year_max)
    }
}

/// Mean GDP per capita and life expectancy, summed population, for one
/// continent in one year.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinentYearRollup {
    pub continent: String,
    pub year: i32,
    pub gdp_percap: f64,
    pub life_exp: f64,
    pub pop: u64,
}

/// Same aggregation as [`ContinentYearRollup`], collapsed across continents.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalYearRollup {
    pub year: i32,
    pub gdp_percap: f64,
    pub life_exp: f64,
    pub pop: u64,
}

/// Numeric columns of a [`Record`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    GdpPercap,
    LifeExp,
    Pop,
}

impl Metric {
    pub fn of(self, record: &Record) -> f64 {
        match self {
            Metric::GdpPercap => record.gdp_percap,
            Metric::LifeExp => record.life_exp,
            Metric::Pop => record.pop as f64,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::GdpPercap => "GDP per Capita",
            Metric::LifeExp => "Life Expectancy",
            Metric::Pop => "Population",
        }
    }
}

// Running totals for one group. Population is summed wider than a single
// record so large groups cannot overflow.
#[derive(Default)]
struct Accumulator {
    gdp_percap: f64,
    life_exp: f64,
    pop: u128,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, record: &Record) {
        self.gdp_percap += record.gdp_percap;
        self.life_exp += record.life_exp;
        self.pop += u128::from(record.pop);
        self.count += 1;
    }

    // count >= 1: groups only exist once a record was added.
    fn means(&self) -> (f64, f64) {
        let n = self.count as f64;
        (self.gdp_percap / n, self.life_exp / n)
    }

    // A `Dataset` guarantees its total fits; loose records saturate.
    fn pop(&self) -> u64 {
        u64::try_from(self.pop).unwrap_or(u64::MAX)
    }
}

/// Groups records by `key`, groups sorted by key.
fn group_by<'a, K, I, F>(records: I, key: F) -> BTreeMap<K, Accumulator>
where
    K: Ord,
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&Record) -> K,
{
    let mut groups: BTreeMap<K, Accumulator> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().add(record);
    }
    groups
}

/// Records matching every predicate of `filter`, in dataset order.
///
/// An empty result is a valid answer, including when `year_min > year_max`
/// or when the country is not in the table.
pub fn filter_records<'a>(dataset: &'a Dataset, filter: &RecordFilter) -> Vec<&'a Record> {
    dataset.iter().filter(|r| filter.matches(r)).collect()
}

/// Unweighted per-row means and population sums by (continent, year),
/// ordered by continent then year.
pub fn rollup_by_continent_year<'a, I>(records: I) -> Vec<ContinentYearRollup>
where
    I: IntoIterator<Item = &'a Record>,
{
    group_by(records, |r| (r.continent.clone(), r.year))
        .into_iter()
        .map(|((continent, year), acc)| {
            let (gdp_percap, life_exp) = acc.means();
            ContinentYearRollup {
                continent,
                year,
                gdp_percap,
                life_exp,
                pop: acc.pop(),
            }
        })
        .collect()
}

/// Unweighted per-row means and population sums by year, years ascending.
pub fn rollup_by_year<'a, I>(records: I) -> Vec<GlobalYearRollup>
where
    I: IntoIterator<Item = &'a Record>,
{
    group_by(records, |r| r.year)
        .into_iter()
        .map(|(year, acc)| {
            let (gdp_percap, life_exp) = acc.means();
            GlobalYearRollup {
                year,
                gdp_percap,
                life_exp,
                pop: acc.pop(),
            }
        })
        .collect()
}

/// Distinct continents, sorted.
pub fn continents(dataset: &Dataset) -> Vec<String> {
    dataset
        .iter()
        .map(|r| r.continent.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct countries of one continent, sorted.
pub fn countries_in(dataset: &Dataset, continent: &str) -> Vec<String> {
    dataset
        .iter()
        .filter(|r| r.continent == continent)
        .map(|r| r.country.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct years, ascending.
pub fn years_in<'a, I>(records: I) -> Vec<i32>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .map(|r| r.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn years(dataset: &Dataset) -> Vec<i32> {
    years_in(dataset)
}

/// Smallest and largest year, or `None` for no records.
pub fn year_bounds<'a, I>(records: I) -> Option<(i32, i32)>
where
    I: IntoIterator<Item = &'a Record>,
{
    records.into_iter().fold(None, |bounds, r| match bounds {
        None => Some((r.year, r.year)),
        Some((lo, hi)) => Some((lo.min(r.year), hi.max(r.year))),
    })
}

/// Number of observations per continent, sorted by continent.
pub fn count_by_continent(dataset: &Dataset) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for record in dataset {
        *counts.entry(record.continent.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(continent, n)| (continent.to_string(), n))
        .collect()
}

/// Values of `metric` per continent, continents sorted, values in record order.
pub fn values_by_continent<'a, I>(records: I, metric: Metric) -> Vec<(String, Vec<f64>)>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: BTreeMap<&'a str, Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.continent.as_str())
            .or_default()
            .push(metric.of(record));
    }
    groups
        .into_iter()
        .map(|(continent, values)| (continent.to_string(), values))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> Dataset {
        Dataset::new(vec![
            Record::new("Brazil", "Americas", 2000, 8000.0, 70.0, 170_000_000),
            Record::new("Argentina", "Americas", 2000, 9000.0, 74.0, 37_000_000),
            Record::new("Brazil", "Americas", 2005, 8800.0, 71.5, 186_000_000),
            Record::new("Kenya", "Africa", 2000, 1200.0, 51.0, 31_000_000),
            Record::new("Kenya", "Africa", 2005, 1400.0, 54.0, 36_000_000),
            Record::new("Japan", "Asia", 2000, 28000.0, 81.0, 127_000_000),
        ])
        .unwrap()
    }

    #[test]
    fn americas_2000_rollup() {
        let dataset = Dataset::new(vec![
            Record::new("Brazil", "Americas", 2000, 8000.0, 70.0, 170_000_000),
            Record::new("Argentina", "Americas", 2000, 9000.0, 74.0, 37_000_000),
        ])
        .unwrap();

        let rollups = rollup_by_continent_year(&dataset);

        assert_eq!(
            rollups,
            vec![ContinentYearRollup {
                continent: "Americas".to_string(),
                year: 2000,
                gdp_percap: 8500.0,
                life_exp: 72.0,
                pop: 207_000_000,
            }]
        );
    }

    #[test]
    fn continent_year_groups_sorted_by_key() {
        let keys: Vec<(String, i32)> = rollup_by_continent_year(&fixture())
            .into_iter()
            .map(|r| (r.continent, r.year))
            .collect();

        assert_eq!(
            keys,
            vec![
                ("Africa".to_string(), 2000),
                ("Africa".to_string(), 2005),
                ("Americas".to_string(), 2000),
                ("Americas".to_string(), 2005),
                ("Asia".to_string(), 2000),
            ]
        );
    }

    #[test]
    fn late_starting_country_keeps_years_ascending() {
        let dataset = Dataset::new(vec![
            Record::new("Afghanistan", "Asia", 2000, 780.0, 42.1, 20_000_000),
            Record::new("Afghanistan", "Asia", 2005, 900.0, 43.5, 25_000_000),
            Record::new("China", "Asia", 1995, 1500.0, 69.0, 1_200_000_000),
            Record::new("China", "Asia", 2000, 2000.0, 71.0, 1_260_000_000),
            Record::new("China", "Asia", 2005, 3000.0, 72.5, 1_300_000_000),
        ])
        .unwrap();

        let years: Vec<i32> = rollup_by_continent_year(&dataset)
            .iter()
            .map(|r| r.year)
            .collect();
        assert_eq!(years, vec![1995, 2000, 2005]);

        let years: Vec<i32> = rollup_by_year(&dataset).iter().map(|r| r.year).collect();
        assert_eq!(years, vec![1995, 2000, 2005]);
    }

    #[test]
    fn huge_populations_saturate_instead_of_overflowing() {
        let half = u64::MAX / 2 + 1;
        let rows = vec![
            Record::new("Atlantis", "Oceania", 2007, 1.0, 1.0, half),
            Record::new("Lemuria", "Oceania", 2007, 1.0, 1.0, half),
        ];

        let rollups = rollup_by_year(&rows);

        assert_eq!(rollups[0].pop, u64::MAX);
    }

    #[test]
    fn single_record_group_keeps_its_values() {
        let rollups = rollup_by_continent_year(&fixture());
        let asia = rollups.iter().find(|r| r.continent == "Asia").unwrap();

        assert_eq!(asia.gdp_percap, 28000.0);
        assert_eq!(asia.life_exp, 81.0);
        assert_eq!(asia.pop, 127_000_000);
    }

    #[test]
    fn year_rollup_is_unweighted() {
        let rollups = rollup_by_year(&fixture());
        let y2000 = rollups.iter().find(|r| r.year == 2000).unwrap();

        // (8000 + 9000 + 1200 + 28000) / 4, not weighted by population
        assert_eq!(y2000.gdp_percap, 11550.0);
        assert_eq!(y2000.life_exp, 69.0);
        assert_eq!(y2000.pop, 365_000_000);
        assert_eq!(
            rollups.iter().map(|r| r.year).collect::<Vec<_>>(),
            vec![2000, 2005]
        );
    }

    #[test]
    fn rollups_are_idempotent() {
        let dataset = fixture();

        assert_eq!(
            rollup_by_continent_year(&dataset),
            rollup_by_continent_year(&dataset)
        );
        assert_eq!(rollup_by_year(&dataset), rollup_by_year(&dataset));
    }

    #[test]
    fn population_sum_does_not_lose_precision() {
        let dataset = Dataset::new(vec![
            Record::new("China", "Asia", 2007, 4959.1, 72.96, 1_318_683_096),
            Record::new("India", "Asia", 2007, 2452.2, 64.7, 1_110_396_331),
            Record::new("Indonesia", "Asia", 2007, 3540.65, 70.65, 223_547_000),
        ])
        .unwrap();

        assert_eq!(rollup_by_year(&dataset)[0].pop, 2_652_626_427);
    }

    #[test]
    fn filter_is_conjunctive_and_ordered() {
        let dataset = fixture();
        let filter = RecordFilter::default().continent("Americas").years(2000, 2004);

        let rows: Vec<&str> = filter_records(&dataset, &filter)
            .into_iter()
            .map(|r| r.country.as_str())
            .collect();

        assert_eq!(rows, vec!["Brazil", "Argentina"]);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let dataset = fixture();

        assert_eq!(
            filter_records(&dataset, &RecordFilter::default()).len(),
            dataset.len()
        );
    }

    #[test]
    fn inverted_year_range_is_empty() {
        let filter = RecordFilter::default().continent("Americas").years(2005, 2000);

        assert!(filter_records(&fixture(), &filter).is_empty());
    }

    #[test]
    fn unknown_country_is_empty() {
        let filter = RecordFilter::default().country("Atlantis");

        assert!(filter_records(&fixture(), &filter).is_empty());
    }

    #[test]
    fn rollup_of_filtered_rows() {
        let dataset = fixture();
        let rows = filter_records(&dataset, &RecordFilter::default().continent("Africa"));

        let rollups = rollup_by_continent_year(rows.iter().copied());

        assert_eq!(rollups.len(), 2);
        assert!(rollups.iter().all(|r| r.continent == "Africa"));
    }

    #[test]
    fn selector_lists_are_sorted() {
        let dataset = fixture();

        assert_eq!(continents(&dataset), vec!["Africa", "Americas", "Asia"]);
        assert_eq!(countries_in(&dataset, "Americas"), vec!["Argentina", "Brazil"]);
        assert!(countries_in(&dataset, "Europe").is_empty());
        assert_eq!(years(&dataset), vec![2000, 2005]);
        assert_eq!(year_bounds(&dataset), Some((2000, 2005)));
        assert_eq!(year_bounds(std::iter::empty()), None);
    }

    #[test]
    fn counts_and_distributions_per_continent() {
        let dataset = fixture();

        assert_eq!(
            count_by_continent(&dataset),
            vec![
                ("Africa".to_string(), 2),
                ("Americas".to_string(), 3),
                ("Asia".to_string(), 1),
            ]
        );

        let rows = filter_records(&dataset, &RecordFilter::default().years(2000, 2000));
        let life = values_by_continent(rows.iter().copied(), Metric::LifeExp);
        assert_eq!(
            life,
            vec![
                ("Africa".to_string(), vec![51.0]),
                ("Americas".to_string(), vec![70.0, 74.0]),
                ("Asia".to_string(), vec![81.0]),
            ]
        );
    }
}
