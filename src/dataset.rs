use once_cell::sync::OnceCell;
use std::collections::{HashMap, HashSet};
use std::collections::hash_map::Entry;

use crate::error::LoadError;
use crate::record::Record;

/// The full Gapminder table, held in insertion order.
///
/// Construction checks that every (country, year) pair appears once, that
/// a country never changes continent, and that the population of all rows
/// sums within `u64`. After that the table is read-only.
#[derive(Clone, Debug)]
pub struct Dataset {
    records: Vec<Record>,
}

static GLOBAL: OnceCell<Dataset> = OnceCell::new();

impl Dataset {
    pub fn new(records: Vec<Record>) -> Result<Self, LoadError> {
        let mut continent_of: HashMap<&str, &str> = HashMap::new();
        let mut seen: HashSet<(&str, i32)> = HashSet::with_capacity(records.len());
        let mut total_pop: u64 = 0;

        for record in &records {
            match continent_of.entry(record.country.as_str()) {
                Entry::Occupied(entry) if *entry.get() != record.continent => {
                    return Err(LoadError::InconsistentContinent {
                        country: record.country.clone(),
                        first: entry.get().to_string(),
                        second: record.continent.clone(),
                    });
                }
                Entry::Occupied(_) => {}
                Entry::Vacant(entry) => {
                    entry.insert(record.continent.as_str());
                }
            }

            if !seen.insert((record.country.as_str(), record.year)) {
                return Err(LoadError::DuplicateObservation {
                    country: record.country.clone(),
                    year: record.year,
                });
            }

            total_pop = total_pop
                .checked_add(record.pop)
                .ok_or(LoadError::PopulationOverflow)?;
        }

        Ok(Dataset { records })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Install the process-wide dataset. Only the first call succeeds.
pub fn init_global(dataset: Dataset) -> Result<&'static Dataset, LoadError> {
    GLOBAL
        .try_insert(dataset)
        .map_err(|_| LoadError::AlreadyInitialised)
}

/// Read-only access to the dataset installed by [`init_global`].
pub fn global() -> Option<&'static Dataset> {
    GLOBAL.get()
}
