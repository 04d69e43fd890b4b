//! Domain services

pub mod inspection;
pub mod labels;
pub mod ordering;
pub mod reconcile;

pub use inspection::{classify_inspection, parse_inspection_date, InspectionAge};
pub use labels::first_label_id;
pub use ordering::sort_by_group;
pub use reconcile::{
    dedup_by_short_name, project, project_row, reconcile, retain_inspected, ReconciledSet,
};
