//! Loader for client-uploaded vehicle inventories
//!
//! Uploads are semicolon-separated with a header row:
//! rnr;gruppe;kurzname;langtext;info;lagerort;labelIds;hu
//!
//! Files exported from German Excel are often Windows-1252 rather than UTF-8,
//! so undecodable input falls back to that encoding.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::WINDOWS_1252;
use tracing::{debug, warn};

use fleetsheet_types::{Column, CsvError, Error, VehicleRecord};

const UTF8_BOM: &str = "\u{feff}";

/// Load client records from a CSV file on disk
pub fn load_client_file<P: AsRef<Path>>(path: P) -> Result<Vec<VehicleRecord>, Error> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let bytes = std::fs::read(path)?;
    Ok(load_client_records(&bytes)?)
}

/// Parse an uploaded CSV body into vehicle records.
///
/// Unknown columns are ignored, missing optional columns yield `None`, and
/// empty cells are treated as absent.
pub fn load_client_records(bytes: &[u8]) -> Result<Vec<VehicleRecord>, CsvError> {
    let decoded = decode(bytes);
    let text: &str = decoded.strip_prefix(UTF8_BOM).unwrap_or(&*decoded);
    if text.trim().is_empty() {
        return Err(CsvError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| CsvError::Parse(e.to_string()))?
        .clone();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = result.map_err(|e| CsvError::Parse(format!("row {}: {}", row_idx + 2, e)))?;
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        records.push(layout.parse(&row));
    }

    debug!(count = records.len(), "Parsed client upload");
    Ok(records)
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            let (decoded, _, had_errors) = WINDOWS_1252.decode(bytes);
            if had_errors {
                warn!("Some characters could not be decoded from Windows-1252");
            }
            decoded
        }
    }
}

/// Header position of each canonical column
struct ColumnLayout {
    positions: Vec<(Column, usize)>,
}

impl ColumnLayout {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, CsvError> {
        let positions: Vec<(Column, usize)> = headers
            .iter()
            .enumerate()
            .filter_map(|(idx, header)| Column::from_name(header).map(|column| (column, idx)))
            .collect();

        if !positions.iter().any(|(column, _)| *column == Column::Kurzname) {
            return Err(CsvError::MissingColumn(Column::Kurzname.name().to_string()));
        }

        Ok(Self { positions })
    }

    fn parse(&self, row: &csv::StringRecord) -> VehicleRecord {
        let mut record = VehicleRecord::default();
        for (column, idx) in &self.positions {
            let value = row
                .get(*idx)
                .filter(|cell| !cell.is_empty())
                .map(|cell| cell.to_string());
            let slot = match column {
                Column::Rnr => &mut record.id,
                Column::Gruppe => &mut record.group,
                Column::Kurzname => &mut record.short_name,
                Column::Langtext => &mut record.long_text,
                Column::Info => &mut record.info,
                Column::Lagerort => &mut record.storage_location,
                Column::LabelIds => &mut record.label_ids,
                Column::Hu => &mut record.inspection_due,
            };
            // first header wins if a column is repeated
            if slot.is_none() {
                *slot = value;
            }
        }
        record
    }
}
