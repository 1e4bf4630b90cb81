//! Command-line reporting over JHMH reservations: fetch a record from the
//! reporting API (or read it from disk) and print or export its details.

pub mod api;
pub mod config;
pub mod report;

pub use api::{ApiClient, ApiConfig, ApiError, DetailsQuery, HealthStatus};
pub use config::ReportConfig;
pub use report::{ReservationReport, load_record, parse_record, print_report, to_json, write_breakdown_csv};
