//! Spreadsheet output

pub mod excel;

pub use excel::{default_file_name, export_to_excel, export_to_excel_on, ExportOptions};
