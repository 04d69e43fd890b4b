//! Excel export functionality

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use fleetsheet_domain::service::{classify_inspection, sort_by_group};
use fleetsheet_types::{Column, Error, Result, VehicleRecord};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use std::path::Path;
use tracing::info;

/// What to put in the sheet
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Columns after `rnr`, in order
    pub keys: Vec<Column>,
    /// Fill rows by inspection age
    pub colored: bool,
}

impl ExportOptions {
    pub fn new(keys: Vec<Column>, colored: bool) -> Self {
        Self { keys, colored }
    }

    /// `rnr` first, then the requested keys without repeating it
    pub fn columns(&self) -> Vec<Column> {
        std::iter::once(Column::Rnr)
            .chain(self.keys.iter().copied().filter(|c| *c != Column::Rnr))
            .collect()
    }
}

/// `vehicles_2024-05-01_13-45-00.xlsx`
pub fn default_file_name<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("vehicles_{}.xlsx", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Export records to an Excel file, rows sorted by group
pub fn export_to_excel(
    records: &[VehicleRecord],
    options: &ExportOptions,
    output_path: &Path,
) -> Result<()> {
    export_to_excel_on(records, options, output_path, Local::now().date_naive())
}

/// Same as [`export_to_excel`] with inspection ages measured from `today`
pub fn export_to_excel_on(
    records: &[VehicleRecord],
    options: &ExportOptions,
    output_path: &Path,
    today: NaiveDate,
) -> Result<()> {
    let mut rows = records.to_vec();
    sort_by_group(&mut rows);

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    write_vehicle_sheet(sheet, &rows, options, today)?;

    workbook
        .save(output_path)
        .map_err(|e| Error::Excel(e.to_string()))?;

    info!(rows = rows.len(), path = %output_path.display(), "Wrote spreadsheet");
    Ok(())
}

fn write_vehicle_sheet(
    sheet: &mut Worksheet,
    rows: &[VehicleRecord],
    options: &ExportOptions,
    today: NaiveDate,
) -> Result<()> {
    sheet
        .set_name("Vehicles")
        .map_err(|e| Error::Excel(e.to_string()))?;

    let columns = options.columns();

    // Header format
    let header_format = Format::new().set_bold();

    for (col, column) in columns.iter().enumerate() {
        sheet
            .write_string_with_format(0, col as u16, column.name(), &header_format)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    for (row_idx, record) in rows.iter().enumerate() {
        let row = (row_idx + 1) as u32;

        let fill = if options.colored {
            record
                .inspection_due
                .as_deref()
                .and_then(|hu| classify_inspection(hu, today))
                .map(|age| age.fill_rgb())
        } else {
            None
        };

        let mut row_format = Format::new();
        if let Some(rgb) = fill {
            row_format = row_format.set_background_color(Color::RGB(rgb));
        }

        for (col, column) in columns.iter().enumerate() {
            let value = record.field(*column).unwrap_or("");

            let mut format = row_format.clone();
            if *column == Column::LabelIds {
                if let Some(rgb) = record.color_code.as_deref().and_then(parse_color_code) {
                    format = format.set_font_color(Color::RGB(rgb));
                }
            }

            sheet
                .write_string_with_format(row, col as u16, value, &format)
                .map_err(|e| Error::Excel(e.to_string()))?;
        }
    }

    // Column widths
    for col in 0..columns.len() {
        sheet
            .set_column_width(col as u16, 16)
            .map_err(|e| Error::Excel(e.to_string()))?;
    }

    Ok(())
}

/// `#RRGGBB` or `RRGGBB`
fn parse_color_code(code: &str) -> Option<u32> {
    let hex = code.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
