use flate2::Compression;
use flate2::write::GzEncoder;
use gapminder::{
    Dataset, LoadError, RecordFilter, filter_records, loader, rollup_by_continent_year,
    rollup_by_year,
};
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/gapminder_sample.csv")
}

fn fixture() -> Dataset {
    loader::from_csv(fixture_path()).expect("fixture loads")
}

fn filters() -> Vec<RecordFilter> {
    let mut out = vec![RecordFilter::default()];
    for continent in [None, Some("Americas"), Some("Africa"), Some("Oceania")] {
        for country in [None, Some("Brazil"), Some("Kenya"), Some("Atlantis")] {
            for (year_min, year_max) in [
                (None, None),
                (Some(2002), None),
                (None, Some(2002)),
                (Some(1997), Some(2002)),
                (Some(2007), Some(1997)),
            ] {
                out.push(RecordFilter {
                    continent: continent.map(str::to_string),
                    country: country.map(str::to_string),
                    year_min,
                    year_max,
                });
            }
        }
    }
    out
}

#[test]
fn filter_returns_exactly_the_matching_records_in_order() {
    let dataset = fixture();

    for filter in filters() {
        let result = filter_records(&dataset, &filter);
        let expected: Vec<_> = dataset.iter().filter(|r| filter.matches(r)).collect();

        assert_eq!(result, expected, "filter {:?}", filter);
        for record in &result {
            if let Some(c) = &filter.continent {
                assert_eq!(&record.continent, c);
            }
            if let Some(c) = &filter.country {
                assert_eq!(&record.country, c);
            }
            assert!(filter.year_min.is_none_or(|y| record.year >= y));
            assert!(filter.year_max.is_none_or(|y| record.year <= y));
        }
    }
}

#[test]
fn inverted_range_and_unknown_country_are_empty() {
    let dataset = fixture();

    let inverted = RecordFilter::default().continent("Americas").years(2005, 2000);
    assert!(filter_records(&dataset, &inverted).is_empty());

    let unknown = RecordFilter::default().country("Atlantis");
    assert!(filter_records(&dataset, &unknown).is_empty());
}

#[test]
fn year_rollup_population_matches_direct_sum() {
    let dataset = fixture();

    for rollup in rollup_by_year(&dataset) {
        let expected: u64 = dataset
            .iter()
            .filter(|r| r.year == rollup.year)
            .map(|r| r.pop)
            .sum();
        assert_eq!(rollup.pop, expected, "year {}", rollup.year);
    }
}

#[test]
fn continent_rollup_means_match_direct_computation() {
    let dataset = fixture();

    for rollup in rollup_by_continent_year(&dataset) {
        let group: Vec<_> = dataset
            .iter()
            .filter(|r| r.continent == rollup.continent && r.year == rollup.year)
            .collect();
        let n = group.len() as f64;
        let gdp = group.iter().map(|r| r.gdp_percap).sum::<f64>() / n;
        let life = group.iter().map(|r| r.life_exp).sum::<f64>() / n;

        assert!((rollup.gdp_percap - gdp).abs() < 1e-9);
        assert!((rollup.life_exp - life).abs() < 1e-9);
    }
}

#[test]
fn rollups_cover_every_group_once() {
    let dataset = fixture();

    let continent_years = rollup_by_continent_year(&dataset);
    assert_eq!(continent_years.len(), 4 * 3);
    assert_eq!(rollup_by_year(&dataset).len(), 3);
    assert_eq!(continent_years, rollup_by_continent_year(&dataset));
}

#[test]
fn loads_gzipped_source() {
    let plain = std::fs::read(fixture_path()).unwrap();
    let file = tempfile::Builder::new().suffix(".csv.gz").tempfile().unwrap();
    {
        let mut encoder = GzEncoder::new(file.reopen().unwrap(), Compression::default());
        encoder.write_all(&plain).unwrap();
        encoder.finish().unwrap();
    }

    let dataset = loader::from_csv(file.path()).unwrap();

    assert_eq!(dataset.records(), fixture().records());
}

#[test]
fn rejects_source_with_duplicate_rows() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "country,continent,year,lifeExp,pop,gdpPercap").unwrap();
    writeln!(file, "Kenya,Africa,2007,54.11,35610177,1463.249282").unwrap();
    writeln!(file, "Kenya,Africa,2007,54.11,35610177,1463.249282").unwrap();

    let err = loader::from_csv(file.path()).unwrap_err();

    assert!(matches!(err, LoadError::DuplicateObservation { year: 2007, .. }));
}
