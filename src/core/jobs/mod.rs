mod records;
mod types;
mod views;

#[cfg(test)]
pub use records::JOBS_KEY;
pub use records::RecordStore;
pub use types::{BookingParams, Job, JobStatus, PDF_PLACEHOLDER, ServiceType, local_timestamp};
pub use views::{DEFAULT_RECENT_JOBS, dashboard, history};
