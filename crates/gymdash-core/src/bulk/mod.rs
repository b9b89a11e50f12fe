//! Bulk operations over selected plans.

pub mod coordinator;
pub mod export;
pub mod report;
pub mod selection;

pub use coordinator::{AssignRequest, BulkCoordinator};
pub use export::{CsvExport, DIET_HEADER, WORKOUT_HEADER, export_file_name, plans_to_csv};
pub use report::{BulkCounts, BulkReport, ItemOutcome};
pub use selection::Selection;
