#![cfg(not(tarpaulin_include))]

use std::error::Error;

use crate::loader::REQUIRED_COLUMNS;
use crate::record::Record;

/// Convert records to CSV format
///
/// Writes a header row with the source column names followed by one line
/// per record, so the output can be loaded back with [`crate::loader`].
///
/// # Arguments
/// * `records` - The rows to export, usually a filtered selection
///
/// # Returns
/// * `Result<String, Box<dyn Error>>` - CSV content as a string or an error
///
/// # Examples
/// ```
/// use gapminder::Record;
/// use gapminder::downloader::to_csv;
///
/// let rows = vec![Record::new("Chile", "Americas", 2007, 13171.64, 78.55, 16284741)];
/// let csv = to_csv(rows.iter()).unwrap();
/// assert!(csv.starts_with("country,continent,year,gdpPercap,lifeExp,pop\n"));
/// ```
pub fn to_csv<'a, I>(records: I) -> Result<String, Box<dyn Error>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut writer = csv::Writer::from_writer(Vec::new());

    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut content = String::from_utf8(bytes)?;
    // An empty export still carries the header row
    if content.is_empty() {
        content = REQUIRED_COLUMNS.join(",");
        content.push('\n');
    }

    Ok(content)
}

/// Convert records to XLSX format
///
/// One worksheet with a header row; numbers stay numeric cells.
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - XLSX file content as bytes or an error
#[cfg(feature = "web")]
pub fn to_xlsx<'a, I>(records: I) -> Result<Vec<u8>, Box<dyn Error>>
where
    I: IntoIterator<Item = &'a Record>,
{
    use rust_xlsxwriter::{Workbook, Worksheet};

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("gapminder")?;

    for (col, name) in REQUIRED_COLUMNS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (i, record) in records.into_iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &record.country)?;
        worksheet.write_string(row, 1, &record.continent)?;
        worksheet.write_number(row, 2, record.year)?;
        worksheet.write_number(row, 3, record.gdp_percap)?;
        worksheet.write_number(row, 4, record.life_exp)?;
        worksheet.write_number(row, 5, record.pop as f64)?;
    }

    workbook.push_worksheet(worksheet);
    let buffer = workbook.save_to_buffer()?;

    Ok(buffer)
}
