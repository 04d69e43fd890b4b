//! Output formatting module

use fleetsheet_types::{OutputFormat, Result, VehicleRecord};

const TABLE_COLUMNS: [(&str, usize); 6] = [
    ("rnr", 8),
    ("gruppe", 10),
    ("kurzname", 16),
    ("labelIds", 10),
    ("hu", 12),
    ("colorCode", 9),
];

pub fn output_records(output_format: OutputFormat, records: &[VehicleRecord]) -> Result<()> {
    if output_format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(records)?;
        println!("{}", content);
    } else {
        print!("{}", render_table(records));
    }
    Ok(())
}

fn render_table(records: &[VehicleRecord]) -> String {
    let mut out = String::new();

    let header: Vec<String> = TABLE_COLUMNS
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');
    let rule_len = TABLE_COLUMNS.iter().map(|(_, w)| w + 1).sum::<usize>() - 1;
    out.push_str(&"-".repeat(rule_len));
    out.push('\n');

    for record in records {
        let cells = [
            record.id.as_deref(),
            record.group.as_deref(),
            record.short_name.as_deref(),
            record.label_ids.as_deref(),
            record.inspection_due.as_deref(),
            record.color_code.as_deref(),
        ];
        let line: Vec<String> = cells
            .iter()
            .zip(TABLE_COLUMNS.iter())
            .map(|(cell, (_, width))| {
                format!("{:<width$}", truncate(cell.unwrap_or("-"), *width), width = width)
            })
            .collect();
        out.push_str(line.join(" ").trim_end());
        out.push('\n');
    }

    out.push_str(&format!("\n{} vehicles\n", records.len()));
    out
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{}~", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_row_per_record() {
        let records = vec![
            VehicleRecord {
                id: Some("1".to_string()),
                short_name: Some("Kran".to_string()),
                inspection_due: Some("2024-01-01".to_string()),
                color_code: Some("#ff0000".to_string()),
                ..Default::default()
            },
            VehicleRecord {
                short_name: Some("Bagger mit sehr langem Namen".to_string()),
                inspection_due: Some("2025".to_string()),
                ..Default::default()
            },
        ];

        let table = render_table(&records);
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("rnr"));
        assert!(lines[2].contains("Kran"));
        assert!(lines[2].contains("#ff0000"));
        assert!(lines[3].starts_with("-"));
        assert!(lines[3].contains("Bagger mit sehr~"));
        assert!(table.ends_with("2 vehicles\n"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 4), "abc~");
    }
}
