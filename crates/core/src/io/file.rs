//! File readers and writers.
//!
//! CSV and JSON delegate to polars; Excel reads go through calamine and
//! writes through rust_xlsxwriter, with column types inferred from the
//! first non-empty cell per column.

use std::fs::File;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use polars::prelude::*;
use rust_xlsxwriter::Workbook;

use crate::error::{RegistryError, Result};
use crate::io::SheetSelector;

/// Read a CSV file with a header row, inferring column types.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    Ok(LazyCsvReader::new(path).finish()?.collect()?)
}

/// Read a record-oriented JSON array into a frame.
pub fn read_json(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)?;
    Ok(JsonReader::new(file)
        .with_json_format(JsonFormat::Json)
        .finish()?)
}

/// Read one worksheet from an Excel workbook. The first row is the header.
pub fn read_excel(path: &Path, sheet: &SheetSelector) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = match sheet {
        SheetSelector::Name(name) => {
            if !workbook.sheet_names().iter().any(|candidate| candidate == name) {
                return Err(RegistryError::SheetNotFound(name.clone()));
            }
            name.clone()
        }
        SheetSelector::Index(index) => workbook
            .sheet_names()
            .get(*index)
            .cloned()
            .ok_or_else(|| RegistryError::SheetNotFound(format!("#{index}")))?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    frame_from_range(&range)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.clone(),
        other => other.to_string(),
    }
}

/// Build a frame from a worksheet range: header row first, then one series
/// per column typed from its first non-empty cell.
fn frame_from_range(range: &Range<Data>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::default());
    };

    let headers: Vec<String> = header.iter().map(cell_to_string).collect();
    let data_rows: Vec<&[Data]> = rows.collect();

    let mut columns = Vec::with_capacity(headers.len());
    for (index, name) in headers.iter().enumerate() {
        let cells: Vec<&Data> = data_rows
            .iter()
            .map(|row| row.get(index).unwrap_or(&Data::Empty))
            .collect();

        let series = match cells.iter().find(|cell| !matches!(cell, Data::Empty)) {
            Some(Data::Bool(_)) => {
                let values: Vec<Option<bool>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Bool(value) => Some(*value),
                        _ => None,
                    })
                    .collect();
                Series::new(name.as_str().into(), values)
            }
            Some(Data::Int(_)) | Some(Data::Float(_)) | Some(Data::DateTime(_)) => {
                let values: Vec<Option<f64>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Int(value) => Some(*value as f64),
                        Data::Float(value) => Some(*value),
                        Data::DateTime(value) => Some(value.as_f64()),
                        _ => None,
                    })
                    .collect();
                Series::new(name.as_str().into(), values)
            }
            Some(_) => {
                let values: Vec<Option<String>> = cells
                    .iter()
                    .map(|cell| match cell {
                        Data::Empty => None,
                        other => Some(cell_to_string(other)),
                    })
                    .collect();
                Series::new(name.as_str().into(), values)
            }
            None => Series::new(name.as_str().into(), vec![None::<&str>; cells.len()]),
        };

        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}

/// Write a frame as CSV with a header row.
pub fn write_csv(frame: &DataFrame, path: &Path) -> Result<()> {
    let mut frame = frame.clone();
    let file = File::create(path)?;
    CsvWriter::new(file)
        .include_header(true)
        .finish(&mut frame)?;
    Ok(())
}

/// Write a frame as a JSON array of records.
pub fn write_json(frame: &DataFrame, path: &Path) -> Result<()> {
    let mut frame = frame.clone();
    let file = File::create(path)?;
    JsonWriter::new(file)
        .with_json_format(JsonFormat::Json)
        .finish(&mut frame)?;
    Ok(())
}

/// Write a frame as a single-worksheet Excel workbook.
pub fn write_excel(frame: &DataFrame, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (index, column) in frame.get_columns().iter().enumerate() {
        worksheet.write_string(0, index as u16, column.name().as_str())?;
    }

    for row in 0..frame.height() {
        for (index, column) in frame.get_columns().iter().enumerate() {
            let cell_row = (row + 1) as u32;
            let cell_col = index as u16;
            match column.get(row)? {
                AnyValue::Null => {}
                AnyValue::Boolean(value) => {
                    worksheet.write_boolean(cell_row, cell_col, value)?;
                }
                AnyValue::Int8(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::Int16(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::Int32(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::Int64(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::UInt8(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::UInt16(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::UInt32(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::UInt64(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::Float32(value) => {
                    worksheet.write_number(cell_row, cell_col, value as f64)?;
                }
                AnyValue::Float64(value) => {
                    worksheet.write_number(cell_row, cell_col, value)?;
                }
                AnyValue::String(value) => {
                    worksheet.write_string(cell_row, cell_col, value)?;
                }
                AnyValue::StringOwned(value) => {
                    worksheet.write_string(cell_row, cell_col, value.as_str())?;
                }
                other => {
                    worksheet.write_string(cell_row, cell_col, other.to_string())?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
