use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document reference used until the webhook hands back a real one.
pub const PDF_PLACEHOLDER: &str = "#";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 3] = [
        JobStatus::Pending,
        JobStatus::InProgress,
        JobStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::InProgress => "In Progress",
            JobStatus::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job status '{0}' (expected Pending, In Progress or Completed)")]
pub struct StatusParseError(pub String);

impl FromStr for JobStatus {
    type Err = StatusParseError;

    /// Accepts the display strings plus the spellings people type in a shell
    /// (`in_progress`, `in-progress`, any case).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "pending" => Ok(JobStatus::Pending),
            "inprogress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ServiceType {
    #[default]
    #[serde(rename = "Standard Turnover")]
    StandardTurnover,
    #[serde(rename = "Deep Clean + Repair")]
    DeepCleanRepair,
    #[serde(rename = "Express (24h)")]
    Express,
    #[serde(rename = "Emergency Service")]
    Emergency,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::StandardTurnover,
        ServiceType::DeepCleanRepair,
        ServiceType::Express,
        ServiceType::Emergency,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::StandardTurnover => "Standard Turnover",
            ServiceType::DeepCleanRepair => "Deep Clean + Repair",
            ServiceType::Express => "Express (24h)",
            ServiceType::Emergency => "Emergency Service",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown service type '{0}'")]
pub struct ServiceTypeParseError(pub String);

impl FromStr for ServiceType {
    type Err = ServiceTypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ServiceTypeParseError(s.to_string()))
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The booking form's fields. Serialized as-is for the webhook body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingParams {
    pub client_name: String,
    pub client_email: String,
    pub address: String,
    pub unit: String,
    pub service_type: ServiceType,
    pub lockbox: String,
}

/// A booking/work-order record.
///
/// `service_type` stays a plain string so records written by older clients
/// load unchanged; new bookings always carry one of the [`ServiceType`] labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub timestamp: String,
    pub client_name: String,
    pub client_email: String,
    pub address: String,
    pub unit: String,
    pub service_type: String,
    pub lockbox: String,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
}

impl Job {
    pub fn from_booking(
        id: String,
        timestamp: String,
        params: &BookingParams,
        pdf_url: Option<String>,
    ) -> Self {
        Self {
            id,
            timestamp,
            client_name: params.client_name.clone(),
            client_email: params.client_email.clone(),
            address: params.address.clone(),
            unit: params.unit.clone(),
            service_type: params.service_type.label().to_string(),
            lockbox: params.lockbox.clone(),
            status: JobStatus::Pending,
            pdf_url,
        }
    }
}

/// Creation time in the same shape a US-locale browser prints it,
/// e.g. `3/14/2026, 9:05:12 AM`.
pub fn local_timestamp() -> String {
    chrono::Local::now()
        .format("%-m/%-d/%Y, %-I:%M:%S %p")
        .to_string()
}
