use serde::{Deserialize, Serialize};

/// One country-year observation.
///
/// Field names serialize to the column names of the source table
/// (`gdpPercap`, `lifeExp`) so views and exports line up with the CSV.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub country: String,
    pub continent: String,
    pub year: i32,
    pub gdp_percap: f64,
    pub life_exp: f64,
    pub pop: u64,
}

impl Record {
    pub fn new(
        country: &str,
        continent: &str,
        year: i32,
        gdp_percap: f64,
        life_exp: f64,
        pop: u64,
    ) -> Self {
        Record {
            country: country.to_string(),
            continent: continent.to_string(),
            year,
            gdp_percap,
            life_exp,
            pop,
        }
    }

    pub fn in_years(&self, year_min: Option<i32>, year_max: Option<i32>) -> bool {
        year_min.is_none_or(|min| self.year >= min) && year_max.is_none_or(|max| self.year <= max)
    }
}
