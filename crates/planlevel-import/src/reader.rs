//! Raw grid readers
//!
//! Both readers produce the sheet as a headerless grid of trimmed strings;
//! all layout interpretation happens in [`build_plan`](crate::build_plan).

use crate::ImportError;
use calamine::{open_workbook_auto, Reader, Sheets};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read an .xlsx or .xls workbook into a string grid.
///
/// Uses the named sheet when given, otherwise the first sheet.
pub(crate) fn read_xlsx(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<String>>, ImportError> {
    let mut workbook: Sheets<BufReader<File>> =
        open_workbook_auto(path).map_err(|e| ImportError::Spreadsheet(e.to_string()))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ImportError::Spreadsheet("workbook has no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| ImportError::Spreadsheet(format!("sheet '{sheet_name}': {e}")))?;

    let grid = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect()
        })
        .collect();

    Ok(grid)
}

/// Read a .csv file into a string grid.
///
/// The file is treated as headerless raw data; ragged rows are allowed and
/// short rows are padded later during normalization.
pub(crate) fn read_csv(path: &Path) -> Result<Vec<Vec<String>>, ImportError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|v| v.trim().to_string()).collect());
    }

    Ok(grid)
}
