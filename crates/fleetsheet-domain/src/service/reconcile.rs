//! Merge of fleet API records with client-uploaded records
//!
//! The merge is three independent steps applied in a fixed order:
//! 1. [`project`] raw fleet rows onto the canonical columns
//! 2. [`dedup_by_short_name`] over `external ++ client` (first occurrence wins)
//! 3. [`retain_inspected`] drops rows without an inspection date

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{Map, Value};

use fleetsheet_types::{value_to_string, Column, VehicleRecord};

/// Deduplicated, filtered record sequence.
///
/// Only [`reconcile`] builds one, so every instance holds: unique `kurzname`
/// and a non-blank `hu` on every record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReconciledSet(Vec<VehicleRecord>);

impl ReconciledSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VehicleRecord> {
        self.0.iter()
    }

    pub fn into_records(self) -> Vec<VehicleRecord> {
        self.0
    }
}

impl AsRef<[VehicleRecord]> for ReconciledSet {
    fn as_ref(&self) -> &[VehicleRecord] {
        &self.0
    }
}

/// Project one raw fleet row onto the canonical column set.
///
/// Columns outside the canonical set are dropped, including any `colorCode`
/// the upstream may already carry.
pub fn project_row(row: &Map<String, Value>) -> VehicleRecord {
    let get = |column: Column| row.get(column.name()).and_then(value_to_string);

    VehicleRecord {
        id: get(Column::Rnr),
        group: get(Column::Gruppe),
        short_name: get(Column::Kurzname),
        long_text: get(Column::Langtext),
        info: get(Column::Info),
        storage_location: get(Column::Lagerort),
        label_ids: get(Column::LabelIds),
        inspection_due: get(Column::Hu),
        color_code: None,
    }
}

pub fn project(rows: &[Map<String, Value>]) -> Vec<VehicleRecord> {
    rows.iter().map(project_row).collect()
}

/// Keep the first record for every `kurzname`, preserving order.
///
/// A missing short name is a key of its own: only the first record without
/// one survives.
pub fn dedup_by_short_name(records: Vec<VehicleRecord>) -> Vec<VehicleRecord> {
    let mut seen: HashSet<Option<String>> = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| seen.insert(record.short_name.clone()))
        .collect()
}

/// Drop records whose inspection date is absent or blank
pub fn retain_inspected(records: Vec<VehicleRecord>) -> Vec<VehicleRecord> {
    records
        .into_iter()
        .filter(VehicleRecord::has_inspection_due)
        .collect()
}

/// Merge fleet records with client records.
///
/// External records come first, so on a `kurzname` collision the fleet
/// version is kept and the client duplicate is dropped. Deduplication runs
/// before the inspection filter: a fleet record without `hu` still shadows a
/// client record of the same name.
pub fn reconcile(external: Vec<VehicleRecord>, client: Vec<VehicleRecord>) -> ReconciledSet {
    let mut combined = external;
    combined.extend(client);

    ReconciledSet(retain_inspected(dedup_by_short_name(combined)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(short_name: &str, hu: Option<&str>) -> VehicleRecord {
        VehicleRecord {
            short_name: Some(short_name.to_string()),
            inspection_due: hu.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    fn short_names(set: &ReconciledSet) -> Vec<&str> {
        set.iter()
            .map(|r| r.short_name.as_deref().unwrap_or(""))
            .collect()
    }

    #[test]
    fn test_external_wins_collision_and_missing_hu_dropped() {
        let external = vec![record("A", Some("2024"))];
        let client = vec![record("A", None), record("B", Some("2025"))];

        let result = reconcile(external, client);

        assert_eq!(result.len(), 2);
        assert_eq!(short_names(&result), vec!["A", "B"]);
        assert_eq!(result.as_ref()[0].inspection_due.as_deref(), Some("2024"));
        assert_eq!(result.as_ref()[1].inspection_due.as_deref(), Some("2025"));
    }

    #[test]
    fn test_external_fields_retained_on_collision() {
        let mut fleet = record("X1", Some("2023-05-01"));
        fleet.info = Some("from fleet".to_string());
        fleet.id = Some("100".to_string());
        let mut upload = record("X1", Some("2030-01-01"));
        upload.info = Some("from client".to_string());
        upload.id = Some("999".to_string());

        let result = reconcile(vec![fleet.clone()], vec![upload]).into_records();

        assert_eq!(result, vec![fleet]);
    }

    #[test]
    fn test_fleet_record_without_hu_still_shadows_client() {
        let result = reconcile(vec![record("A", None)], vec![record("A", Some("2025"))]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_empty_sources() {
        assert!(reconcile(Vec::new(), Vec::new()).is_empty());

        let only_client = reconcile(
            Vec::new(),
            vec![record("C", Some("2024")), record("D", Some("  "))],
        );
        assert_eq!(short_names(&only_client), vec!["C"]);

        let only_external = reconcile(
            vec![record("E", None), record("F", Some("2026-01"))],
            Vec::new(),
        );
        assert_eq!(short_names(&only_external), vec!["F"]);
    }

    #[test]
    fn test_order_is_stable() {
        let external = vec![
            record("Z", Some("1")),
            record("M", Some("2")),
            record("Z", Some("3")),
        ];
        let client = vec![record("A", Some("4")), record("M", Some("5"))];

        let result = reconcile(external, client);

        assert_eq!(short_names(&result), vec!["Z", "M", "A"]);
        assert_eq!(result.as_ref()[0].inspection_due.as_deref(), Some("1"));
    }

    #[test]
    fn test_uniqueness_and_completeness_hold() {
        let names = ["a", "b", "a", "c", "b", "d", "a"];
        let hus = [Some("1"), None, Some("2"), Some(""), Some("3"), Some("4"), None];
        let external: Vec<_> = names
            .iter()
            .zip(hus.iter())
            .take(4)
            .map(|(n, h)| record(n, *h))
            .collect();
        let client: Vec<_> = names
            .iter()
            .zip(hus.iter())
            .skip(4)
            .map(|(n, h)| record(n, *h))
            .collect();

        let result = reconcile(external, client);

        let mut seen = HashSet::new();
        for r in result.iter() {
            assert!(seen.insert(r.short_name.clone()), "duplicate {:?}", r.short_name);
            assert!(r.has_inspection_due());
        }
        assert_eq!(short_names(&result), vec!["a", "d"]);
    }

    #[test]
    fn test_missing_short_name_is_one_key() {
        let anonymous = VehicleRecord {
            inspection_due: Some("2024".to_string()),
            ..Default::default()
        };
        let result = dedup_by_short_name(vec![anonymous.clone(), anonymous]);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_project_drops_extraneous_columns() {
        let row = json!({
            "rnr": 17,
            "gruppe": "LKW",
            "kurzname": "L-17",
            "langtext": "Kipper",
            "info": "",
            "lagerort": "Halle 2",
            "labelIds": "76, 13",
            "hu": "2024-11-30",
            "colorCode": "#ff0000",
            "vondat": "2020-01-01",
            "profilePictureUrl": null
        });
        let rows = vec![row.as_object().unwrap().clone()];

        let projected = project(&rows);

        assert_eq!(projected.len(), 1);
        let r = &projected[0];
        assert_eq!(r.id.as_deref(), Some("17"));
        assert_eq!(r.storage_location.as_deref(), Some("Halle 2"));
        assert_eq!(r.label_ids.as_deref(), Some("76, 13"));
        assert!(r.info.is_none());
        assert!(r.color_code.is_none());
    }
}
