//! Booking submission: form state, validation, webhook delivery and the
//! hand-off of the resulting job to the record store.

mod delivery;

pub use delivery::{DeliveryError, DeliveryMode, DeliveryReceipt, HttpTransport, WebhookTransport};

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::core::jobs::{BookingParams, Job, RecordStore, local_timestamp};
use crate::core::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("a submission is already in progress for this form")]
    AlreadySubmitting,
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Required-field and email syntax checks, mirroring what the browser form enforces.
pub fn validate(params: &BookingParams) -> Result<(), ValidationError> {
    let required = [
        ("Client name", &params.client_name),
        ("Client email", &params.client_email),
        ("Property address", &params.address),
        ("Unit", &params.unit),
        ("Lockbox / access", &params.lockbox),
    ];
    for (label, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField(label));
        }
    }
    if !looks_like_email(params.client_email.trim()) {
        return Err(ValidationError::InvalidEmail(params.client_email.clone()));
    }
    Ok(())
}

fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// One booking form instance. Fields are frozen while a submission is in flight.
#[derive(Debug, Default)]
pub struct BookingForm {
    params: BookingParams,
    state: FlowState,
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(params: BookingParams) -> Self {
        Self {
            params,
            state: FlowState::Idle,
        }
    }

    pub fn params(&self) -> &BookingParams {
        &self.params
    }

    /// `None` while submitting.
    pub fn params_mut(&mut self) -> Option<&mut BookingParams> {
        match self.state {
            FlowState::Idle => Some(&mut self.params),
            FlowState::Submitting => None,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> FlowState {
        self.state
    }

    /// `Idle → Submitting`. Returns the snapshot to deliver.
    pub fn begin_submit(&mut self) -> Result<BookingParams, BookingError> {
        if self.state == FlowState::Submitting {
            return Err(BookingError::AlreadySubmitting);
        }
        validate(&self.params)?;
        self.state = FlowState::Submitting;
        Ok(self.params.clone())
    }

    /// Back to `Idle`. The fields reset only on success so a failed
    /// submission can be retried as-is.
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.state = FlowState::Idle;
        if succeeded {
            self.params = BookingParams::default();
        }
    }
}

/// Runs submissions against the shared record store and current settings.
pub struct BookingService {
    records: Arc<Mutex<RecordStore>>,
    settings: Arc<RwLock<Settings>>,
    transport: Arc<dyn WebhookTransport>,
}

impl BookingService {
    pub fn new(
        records: Arc<Mutex<RecordStore>>,
        settings: Arc<RwLock<Settings>>,
        transport: Arc<dyn WebhookTransport>,
    ) -> Self {
        Self {
            records,
            settings,
            transport,
        }
    }

    pub async fn submit(&self, form: &mut BookingForm) -> Result<Job, BookingError> {
        let params = form.begin_submit()?;
        let outcome = self.dispatch(&params).await;
        form.finish_submit(outcome.is_ok());
        outcome
    }

    /// Deliver an already validated booking and record it on success.
    /// The record store lock is only taken after delivery completes.
    pub async fn dispatch(&self, params: &BookingParams) -> Result<Job, BookingError> {
        let (endpoint, mode, delay) = {
            let settings = self.settings.read().await;
            (
                settings.webhook_url.trim().to_string(),
                settings.delivery_mode,
                settings.simulated_delay(),
            )
        };

        let receipt = if endpoint.is_empty() {
            info!(
                "No webhook configured, simulating delivery ({} ms)",
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            DeliveryReceipt::placeholder()
        } else {
            match self.transport.deliver(&endpoint, params, mode).await {
                Ok(receipt) => receipt,
                Err(e) => {
                    warn!("Booking for '{}' not submitted: {}", params.client_name, e);
                    return Err(e.into());
                }
            }
        };

        let job = {
            let mut records = self.records.lock().await;
            let job = Job::from_booking(
                records.allocate_id(),
                local_timestamp(),
                params,
                Some(receipt.pdf_url),
            );
            records.add(job.clone()).await;
            job
        };

        info!(
            "Booking {} recorded for {} ({})",
            job.id, job.client_name, job.service_type
        );
        Ok(job)
    }
}

#[cfg(test)]
mod tests;
