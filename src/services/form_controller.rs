//! Booking form state machine.
//!
//! A form starts `Idle`, enters `Submitting` while a submit is being
//! processed and lands in `Submitted` once a valid booking has been handed to
//! the intake endpoint. `Submitted` is transient: a timer returns the form to
//! `Idle` after `dismiss_after`. Invalid submissions go straight back to
//! `Idle` with per-field errors and never reach the network.

use chrono::{Local, NaiveDate};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::client::IntakeTransport;
use crate::error::BookingError;
use crate::models::booking::{
    BookingField, BookingPayload, BookingRequest, DispatchOutcome, FieldErrors, FormSnapshot,
    SubmissionState, SubmitOutcome,
};
use crate::services::submission_log::SubmissionLog;
use crate::services::validation::{validate, validate_field};

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Source of "today" for the appointment date rule
pub type TodayFn = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

#[derive(Clone)]
pub struct FormSettings {
    pub dismiss_after: Duration,
    pub today: TodayFn,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            dismiss_after: DEFAULT_DISMISS_AFTER,
            today: Arc::new(|| Local::now().date_naive()),
        }
    }
}

#[derive(Default)]
struct FormState {
    request: BookingRequest,
    errors: FieldErrors,
    state: SubmissionState,
    submit_attempted: bool,
    dismiss_task: Option<JoinHandle<()>>,
    discarded: bool,
}

impl FormState {
    fn cancel_dismiss(&mut self) {
        if let Some(task) = self.dismiss_task.take() {
            task.abort();
        }
    }

    fn clear(&mut self) {
        self.request = BookingRequest::default();
        self.errors.clear();
        self.submit_attempted = false;
    }
}

fn lock(inner: &Mutex<FormState>) -> MutexGuard<'_, FormState> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct BookingFormController {
    id: String,
    inner: Arc<Mutex<FormState>>,
    transport: Arc<dyn IntakeTransport>,
    ledger: Option<Arc<SubmissionLog>>,
    settings: FormSettings,
}

impl BookingFormController {
    pub fn new(
        id: impl Into<String>,
        transport: Arc<dyn IntakeTransport>,
        ledger: Option<Arc<SubmissionLog>>,
        settings: FormSettings,
    ) -> Self {
        Self {
            id: id.into(),
            inner: Arc::new(Mutex::new(FormState::default())),
            transport,
            ledger,
            settings,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SubmissionState {
        lock(&self.inner).state
    }

    pub fn request(&self) -> BookingRequest {
        lock(&self.inner).request.clone()
    }

    pub fn errors(&self) -> FieldErrors {
        lock(&self.inner).errors.clone()
    }

    pub fn snapshot(&self) -> FormSnapshot {
        let form = lock(&self.inner);
        FormSnapshot {
            id: self.id.clone(),
            state: form.state,
            request: form.request.clone(),
            errors: form.errors.clone(),
            submit_attempted: form.submit_attempted,
        }
    }

    /// Set one field. Once a submit has been attempted the field's own error
    /// entry is refreshed; other fields are left alone.
    pub fn update_field(&self, field: BookingField, value: impl Into<String>) -> bool {
        let today = (self.settings.today)();
        let mut form = lock(&self.inner);

        let changed = form.request.set(field, value.into());

        if form.submit_attempted {
            let verdict = validate_field(field, &form.request, today);
            match verdict {
                Some(message) => form.errors.insert(field, message),
                None => {
                    form.errors.remove(field);
                }
            }
        }

        if changed {
            debug!("Form {} updated field {}", self.id, field);
        }
        changed
    }

    /// Validate and hand the booking to the intake endpoint.
    ///
    /// Transport and configuration failures are logged and reported as
    /// `Accepted`; the visitor sees the same confirmation either way.
    pub async fn submit(&self) -> Result<SubmitOutcome, BookingError> {
        let request = {
            let mut form = lock(&self.inner);
            if form.state == SubmissionState::Submitting {
                warn!("Form {} rejected a submit while another is in flight", self.id);
                return Err(BookingError::SubmissionInFlight);
            }
            form.cancel_dismiss();
            form.state = SubmissionState::Submitting;
            form.submit_attempted = true;
            form.request.clone()
        };

        info!("Form {} submitting booking request", self.id);

        let booking = match validate(&request, (self.settings.today)()) {
            Ok(booking) => booking,
            Err(errors) => {
                info!(
                    "Form {} rejected with {} invalid field(s)",
                    self.id,
                    errors.len()
                );
                let mut form = lock(&self.inner);
                form.errors = errors.clone();
                form.state = SubmissionState::Idle;
                return Ok(SubmitOutcome::Rejected(errors));
            }
        };

        let payload = BookingPayload::from(booking);

        // The hand-off runs in its own task so a dropped caller cannot strand
        // the form in `Submitting`.
        let task = tokio::spawn(complete_submission(
            self.id.clone(),
            Arc::clone(&self.inner),
            Arc::clone(&self.transport),
            self.ledger.clone(),
            self.settings.dismiss_after,
            payload,
        ));

        match task.await {
            Ok(outcome) => Ok(SubmitOutcome::Accepted(outcome)),
            Err(e) => {
                error!("Form {} submission task failed: {}", self.id, e);
                let mut form = lock(&self.inner);
                if form.state == SubmissionState::Submitting {
                    form.state = SubmissionState::Idle;
                }
                Err(BookingError::Transport(format!("submission task failed: {}", e)))
            }
        }
    }

    /// Return to an empty idle form. Refused while a submission is in flight.
    pub fn reset(&self) -> Result<(), BookingError> {
        let mut form = lock(&self.inner);
        if form.state == SubmissionState::Submitting {
            warn!("Form {} rejected a reset while a submission is in flight", self.id);
            return Err(BookingError::SubmissionInFlight);
        }
        form.cancel_dismiss();
        form.clear();
        form.state = SubmissionState::Idle;
        debug!("Form {} reset", self.id);
        Ok(())
    }

    /// Cancel any pending timer. Called when the form is discarded.
    pub fn teardown(&self) {
        let mut form = lock(&self.inner);
        form.discarded = true;
        form.cancel_dismiss();
    }
}

impl Drop for BookingFormController {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Dispatch a validated booking, record it and move the form to `Submitted`
async fn complete_submission(
    id: String,
    inner: Arc<Mutex<FormState>>,
    transport: Arc<dyn IntakeTransport>,
    ledger: Option<Arc<SubmissionLog>>,
    dismiss_after: Duration,
    payload: BookingPayload,
) -> DispatchOutcome {
    let outcome = match transport.dispatch(payload.clone()).await {
        Ok(()) => {
            info!("Form {} booking sent to intake endpoint", id);
            DispatchOutcome::Delivered
        }
        Err(BookingError::IntakeNotConfigured) => {
            error!(
                "Form {} booking not forwarded: intake endpoint is not configured",
                id
            );
            DispatchOutcome::NotConfigured
        }
        Err(err) => {
            warn!("Form {} booking may not have been delivered: {}", id, err);
            DispatchOutcome::TransportFailed
        }
    };

    if let Some(ledger) = &ledger {
        if let Err(e) = ledger.record(&payload, outcome) {
            error!("Failed to record submission for form {}: {}", id, e);
        }
    }

    {
        let mut form = lock(&inner);
        form.clear();
        form.state = SubmissionState::Submitted;
        if !form.discarded {
            form.dismiss_task = Some(schedule_dismiss(&inner, dismiss_after, id.clone()));
        }
    }

    info!("Form {} submitted ({})", id, outcome.as_str());
    outcome
}

fn schedule_dismiss(
    inner: &Arc<Mutex<FormState>>,
    delay: Duration,
    id: String,
) -> JoinHandle<()> {
    let inner: Weak<Mutex<FormState>> = Arc::downgrade(inner);

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        if let Some(inner) = inner.upgrade() {
            let mut form = lock(&inner);
            if form.state == SubmissionState::Submitted {
                form.state = SubmissionState::Idle;
                form.dismiss_task = None;
                debug!("Form {} confirmation dismissed", id);
            }
        }
    })
}
