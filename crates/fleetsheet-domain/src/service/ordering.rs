//! Presentation ordering

use fleetsheet_types::VehicleRecord;

/// Stable sort by `gruppe`; records without a group go last.
pub fn sort_by_group(records: &mut [VehicleRecord]) {
    records.sort_by(|a, b| match (&a.group, &b.group) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, group: Option<&str>) -> VehicleRecord {
        VehicleRecord {
            short_name: Some(name.to_string()),
            group: group.map(|g| g.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_sort_by_group_is_stable() {
        let mut records = vec![
            record("1", Some("LKW")),
            record("2", None),
            record("3", Some("Bagger")),
            record("4", Some("LKW")),
            record("5", Some("Bagger")),
        ];

        sort_by_group(&mut records);

        let order: Vec<_> = records
            .iter()
            .map(|r| r.short_name.as_deref().unwrap())
            .collect();
        assert_eq!(order, vec!["3", "5", "1", "4", "2"]);
    }
}
