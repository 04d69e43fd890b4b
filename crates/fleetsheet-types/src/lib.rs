//! Core types for fleet reconciliation

mod error;
mod record;

pub use error::*;
pub use record::*;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format for printed results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Canonical vehicle columns, named as in the upload and the fleet API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum Column {
    #[value(name = "rnr")]
    #[serde(rename = "rnr")]
    Rnr,
    #[value(name = "gruppe")]
    #[serde(rename = "gruppe")]
    Gruppe,
    #[value(name = "kurzname")]
    #[serde(rename = "kurzname")]
    Kurzname,
    #[value(name = "langtext")]
    #[serde(rename = "langtext")]
    Langtext,
    #[value(name = "info")]
    #[serde(rename = "info")]
    Info,
    #[value(name = "lagerort")]
    #[serde(rename = "lagerort")]
    Lagerort,
    #[value(name = "labelIds")]
    #[serde(rename = "labelIds")]
    LabelIds,
    #[value(name = "hu")]
    #[serde(rename = "hu")]
    Hu,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Rnr,
        Column::Gruppe,
        Column::Kurzname,
        Column::Langtext,
        Column::Info,
        Column::Lagerort,
        Column::LabelIds,
        Column::Hu,
    ];

    /// Header name in the upload and the fleet payload
    pub fn name(&self) -> &'static str {
        match self {
            Column::Rnr => "rnr",
            Column::Gruppe => "gruppe",
            Column::Kurzname => "kurzname",
            Column::Langtext => "langtext",
            Column::Info => "info",
            Column::Lagerort => "lagerort",
            Column::LabelIds => "labelIds",
            Column::Hu => "hu",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reject requested columns that appear more than once
pub fn ensure_unique_columns(columns: &[Column]) -> Result<()> {
    let mut duplicates: Vec<Column> = Vec::new();
    for (idx, column) in columns.iter().enumerate() {
        if columns[..idx].contains(column) && !duplicates.contains(column) {
            duplicates.push(*column);
        }
    }

    if duplicates.is_empty() {
        Ok(())
    } else {
        let names: Vec<&str> = duplicates.iter().map(|c| c.name()).collect();
        Err(Error::InvalidKeys(format!(
            "Duplicate keys found: {}",
            names.join(", ")
        )))
    }
}
