use super::*;
use crate::core::jobs::{JOBS_KEY, JobStatus, ServiceType};
use crate::core::store::MemoryStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Transport double that answers every call with a fixed outcome.
struct ScriptedTransport {
    reply: fn() -> Result<DeliveryReceipt, DeliveryError>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(reply: fn() -> Result<DeliveryReceipt, DeliveryError>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebhookTransport for ScriptedTransport {
    async fn deliver(
        &self,
        _endpoint: &str,
        _params: &BookingParams,
        _mode: DeliveryMode,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)()
    }
}

struct Fixture {
    backing: Arc<MemoryStore>,
    records: Arc<Mutex<RecordStore>>,
    service: BookingService,
}

async fn fixture(webhook_url: &str, transport: Arc<dyn WebhookTransport>) -> Fixture {
    let backing = Arc::new(MemoryStore::default());
    let records = Arc::new(Mutex::new(RecordStore::load(backing.clone()).await));
    let settings = Settings {
        webhook_url: webhook_url.to_string(),
        ..Settings::default()
    };
    let service = BookingService::new(
        records.clone(),
        Arc::new(RwLock::new(settings)),
        transport,
    );
    Fixture {
        backing,
        records,
        service,
    }
}

fn jane() -> BookingParams {
    BookingParams {
        client_name: "Jane Doe".into(),
        client_email: "jane@x.com".into(),
        address: "1 Oak Rd".into(),
        unit: "2A".into(),
        service_type: ServiceType::Express,
        lockbox: "9999".into(),
    }
}

fn is_fix_id(id: &str) -> bool {
    id.strip_prefix("FIX-")
        .and_then(|n| n.parse::<u64>().ok())
        .is_some_and(|n| n <= 9999)
}

#[test]
fn validation_requires_every_field() {
    assert_eq!(validate(&jane()), Ok(()));

    let mut missing_unit = jane();
    missing_unit.unit = "   ".into();
    assert_eq!(
        validate(&missing_unit),
        Err(ValidationError::MissingField("Unit"))
    );

    let mut missing_name = jane();
    missing_name.client_name.clear();
    assert_eq!(
        validate(&missing_name),
        Err(ValidationError::MissingField("Client name"))
    );
}

#[test]
fn validation_checks_email_syntax() {
    for bad in ["jane", "jane@", "@x.com", "jane doe@x.com", "a@b@c.com", "jane@.com"] {
        let mut params = jane();
        params.client_email = bad.into();
        assert!(
            matches!(validate(&params), Err(ValidationError::InvalidEmail(_))),
            "{} should be rejected",
            bad
        );
    }
}

#[test]
fn form_fields_are_frozen_while_submitting() {
    let mut form = BookingForm::with_params(jane());
    assert!(form.params_mut().is_some());

    form.begin_submit().unwrap();
    assert_eq!(form.state(), FlowState::Submitting);
    assert!(form.params_mut().is_none());
    assert!(matches!(
        form.begin_submit(),
        Err(BookingError::AlreadySubmitting)
    ));

    form.finish_submit(false);
    assert_eq!(form.state(), FlowState::Idle);
    assert_eq!(form.params(), &jane());
}

#[test]
fn invalid_form_never_enters_submitting() {
    let mut form = BookingForm::new();
    assert!(matches!(
        form.begin_submit(),
        Err(BookingError::Invalid(ValidationError::MissingField(_)))
    ));
    assert_eq!(form.state(), FlowState::Idle);
}

#[tokio::test(start_paused = true)]
async fn empty_endpoint_simulates_then_records_pending_job() {
    let transport = ScriptedTransport::new(|| Ok(DeliveryReceipt::placeholder()));
    let fx = fixture("", transport.clone()).await;
    let mut form = BookingForm::with_params(jane());

    let started = tokio::time::Instant::now();
    let job = fx.service.submit(&mut form).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(1500));

    assert_eq!(transport.calls(), 0);
    assert!(is_fix_id(&job.id), "unexpected id {}", job.id);
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.service_type, "Express (24h)");
    assert_eq!(job.pdf_url.as_deref(), Some("#"));

    let records = fx.records.lock().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records.jobs()[0], job);
    assert_eq!(form.params(), &BookingParams::default());
    assert_eq!(form.state(), FlowState::Idle);
}

#[tokio::test]
async fn delivered_booking_uses_receipt_pdf_and_persists() {
    let transport = ScriptedTransport::new(|| {
        Ok(DeliveryReceipt {
            pdf_url: "https://drive/work-order.pdf".into(),
        })
    });
    let fx = fixture("https://hooks.example.com/exec", transport.clone()).await;
    let mut form = BookingForm::with_params(jane());

    let job = fx.service.submit(&mut form).await.unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(job.pdf_url.as_deref(), Some("https://drive/work-order.pdf"));
    let persisted: Vec<Job> =
        serde_json::from_str(&fx.backing.raw(JOBS_KEY).expect("snapshot written")).unwrap();
    assert_eq!(persisted, vec![job]);
}

#[tokio::test]
async fn transport_failure_records_nothing_and_keeps_form() {
    let transport =
        ScriptedTransport::new(|| Err(DeliveryError::Transport("connection refused".into())));
    let fx = fixture("http://127.0.0.1:9/exec", transport).await;

    let existing = Job::from_booking("FIX-1".into(), local_timestamp(), &jane(), None);
    fx.records.lock().await.add(existing.clone()).await;

    let mut form = BookingForm::with_params(jane());
    let err = fx.service.submit(&mut form).await.unwrap_err();

    assert!(matches!(
        err,
        BookingError::Delivery(DeliveryError::Transport(_))
    ));
    assert_eq!(fx.records.lock().await.jobs(), &[existing]);
    assert_eq!(form.params(), &jane());
    assert_eq!(form.state(), FlowState::Idle);
}

#[tokio::test]
async fn rejected_booking_can_be_retried_from_same_form() {
    let failing = ScriptedTransport::new(|| Err(DeliveryError::Rejected("HTTP 500".into())));
    let fx = fixture("https://hooks.example.com/exec", failing).await;
    let mut form = BookingForm::with_params(jane());
    assert!(fx.service.submit(&mut form).await.is_err());

    let working = ScriptedTransport::new(|| Ok(DeliveryReceipt::placeholder()));
    let retry = BookingService::new(
        fx.records.clone(),
        Arc::new(RwLock::new(Settings {
            webhook_url: "https://hooks.example.com/exec".into(),
            ..Settings::default()
        })),
        working,
    );
    let job = retry.submit(&mut form).await.unwrap();
    assert_eq!(job.client_name, "Jane Doe");
    assert_eq!(fx.records.lock().await.len(), 1);
}

#[tokio::test]
async fn real_transport_against_closed_port_fails() {
    let fx = fixture("http://127.0.0.1:9/exec", Arc::new(HttpTransport::new())).await;
    let mut form = BookingForm::with_params(jane());

    let err = fx.service.submit(&mut form).await.unwrap_err();
    assert!(matches!(
        err,
        BookingError::Delivery(DeliveryError::Transport(_))
    ));
    assert!(fx.records.lock().await.is_empty());
    assert_eq!(fx.backing.raw(JOBS_KEY), None);
}

#[tokio::test(start_paused = true)]
async fn repeated_submissions_stack_newest_first() {
    let transport = ScriptedTransport::new(|| Ok(DeliveryReceipt::placeholder()));
    let fx = fixture("", transport).await;

    let mut ids = Vec::new();
    for n in 0..3 {
        let mut params = jane();
        params.unit = format!("{}", n);
        let job = fx
            .service
            .submit(&mut BookingForm::with_params(params))
            .await
            .unwrap();
        ids.push(job.id);
    }

    let records = fx.records.lock().await;
    let stored: Vec<&str> = records.jobs().iter().map(|j| j.id.as_str()).collect();
    ids.reverse();
    assert_eq!(stored, ids.iter().map(String::as_str).collect::<Vec<_>>());
}
