//! Label identifier handling

/// First identifier of a raw comma-delimited `labelIds` value, trimmed.
///
/// Returns `None` for absent, empty, or blank-leading values; those records
/// are never looked up.
pub fn first_label_id(raw: Option<&str>) -> Option<String> {
    let first = raw?.split(',').next()?.trim();
    if first.is_empty() {
        None
    } else {
        Some(first.to_string())
    }
}
