use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single vehicle row, from either the client upload or the fleet API.
///
/// Serialized names follow the upstream schema (`rnr`, `gruppe`, `kurzname`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleRecord {
    #[serde(rename = "rnr", default, deserialize_with = "lenient_string")]
    pub id: Option<String>,

    #[serde(rename = "gruppe", default, deserialize_with = "lenient_string")]
    pub group: Option<String>,

    /// Natural dedup key
    #[serde(rename = "kurzname", default, deserialize_with = "lenient_string")]
    pub short_name: Option<String>,

    #[serde(rename = "langtext", default, deserialize_with = "lenient_string")]
    pub long_text: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub info: Option<String>,

    #[serde(rename = "lagerort", default, deserialize_with = "lenient_string")]
    pub storage_location: Option<String>,

    /// Raw comma-delimited label identifiers
    #[serde(rename = "labelIds", default, deserialize_with = "lenient_string")]
    pub label_ids: Option<String>,

    /// Inspection due date (HU)
    #[serde(rename = "hu", default, deserialize_with = "lenient_string")]
    pub inspection_due: Option<String>,

    #[serde(
        rename = "colorCode",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub color_code: Option<String>,
}

impl VehicleRecord {
    /// True when the inspection date is present and not blank
    pub fn has_inspection_due(&self) -> bool {
        self.inspection_due
            .as_deref()
            .map(|hu| !hu.trim().is_empty())
            .unwrap_or(false)
    }

    /// Value of a canonical column, as rendered in the sheet
    pub fn field(&self, column: crate::Column) -> Option<&str> {
        use crate::Column;
        match column {
            Column::Rnr => self.id.as_deref(),
            Column::Gruppe => self.group.as_deref(),
            Column::Kurzname => self.short_name.as_deref(),
            Column::Langtext => self.long_text.as_deref(),
            Column::Info => self.info.as_deref(),
            Column::Lagerort => self.storage_location.as_deref(),
            Column::LabelIds => self.label_ids.as_deref(),
            Column::Hu => self.inspection_due.as_deref(),
        }
    }
}

/// Normalize a JSON scalar into an optional string.
///
/// The fleet API is loose about types: ids come back as numbers, empty
/// cells as `null` or `""`. Arrays (e.g. label id lists) are joined with commas.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(value_to_string)
                .collect::<Vec<_>>()
                .join(",");
            if joined.is_empty() {
                None
            } else {
                Some(joined)
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_string(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_mixed_types() {
        let record: VehicleRecord = serde_json::from_value(json!({
            "rnr": 42,
            "gruppe": "Bagger",
            "kurzname": "B-01",
            "labelIds": null,
            "hu": "",
            "extra": "ignored"
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("42"));
        assert_eq!(record.short_name.as_deref(), Some("B-01"));
        assert!(record.label_ids.is_none());
        assert!(record.inspection_due.is_none());
        assert!(!record.has_inspection_due());
    }

    #[test]
    fn test_label_id_array_joined() {
        assert_eq!(
            value_to_string(&json!([7, "9"])).as_deref(),
            Some("7,9")
        );
        assert_eq!(value_to_string(&json!([])), None);
    }

    #[test]
    fn test_color_code_omitted_when_unset() {
        let record = VehicleRecord {
            short_name: Some("A".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("colorCode").is_none());
        assert_eq!(value["kurzname"], "A");
    }
}
