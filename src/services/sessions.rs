use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::client::IntakeTransport;
use crate::error::BookingError;
use crate::models::booking::SubmissionState;
use crate::services::form_controller::{BookingFormController, FormSettings};
use crate::services::submission_log::SubmissionLog;

const SESSION_ID_LEN: usize = 16;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_MAX_FORMS: usize = 10_000;
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Bounds on the number and lifetime of live forms
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    /// Forms untouched for this long are discarded
    pub idle_ttl: Duration,
    pub max_forms: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: DEFAULT_IDLE_TTL,
            max_forms: DEFAULT_MAX_FORMS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FormSummary {
    pub id: String,
    pub state: SubmissionState,
}

struct SessionEntry {
    form: Arc<BookingFormController>,
    last_seen: Instant,
}

type SessionMap = HashMap<String, SessionEntry>;

/// Live booking forms keyed by session id
pub struct FormSessions {
    forms: Mutex<SessionMap>,
    transport: Arc<dyn IntakeTransport>,
    ledger: Option<Arc<SubmissionLog>>,
    settings: FormSettings,
    limits: SessionLimits,
}

fn generate_session_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(char::from)
        .collect()
}

// Drop idle entries; forms with a submission in flight are kept
fn evict_expired(forms: &mut SessionMap, idle_ttl: Duration) -> usize {
    let before = forms.len();
    forms.retain(|id, entry| {
        let keep = entry.last_seen.elapsed() < idle_ttl
            || entry.form.state() == SubmissionState::Submitting;
        if !keep {
            entry.form.teardown();
            debug!("Expired idle booking form {}", id);
        }
        keep
    });
    before - forms.len()
}

impl FormSessions {
    pub fn new(
        transport: Arc<dyn IntakeTransport>,
        ledger: Option<Arc<SubmissionLog>>,
        settings: FormSettings,
        limits: SessionLimits,
    ) -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            transport,
            ledger,
            settings,
            limits,
        }
    }

    fn forms(&self) -> MutexGuard<'_, SessionMap> {
        self.forms.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn create(&self) -> Result<Arc<BookingFormController>, BookingError> {
        let mut forms = self.forms();

        if forms.len() >= self.limits.max_forms {
            evict_expired(&mut forms, self.limits.idle_ttl);
        }
        if forms.len() >= self.limits.max_forms {
            warn!(
                "Refusing new booking form: {} forms already live",
                forms.len()
            );
            return Err(BookingError::TooManyForms(self.limits.max_forms));
        }

        let mut id = generate_session_id();
        while forms.contains_key(&id) {
            id = generate_session_id();
        }

        let form = Arc::new(BookingFormController::new(
            id.clone(),
            Arc::clone(&self.transport),
            self.ledger.clone(),
            self.settings.clone(),
        ));
        forms.insert(
            id.clone(),
            SessionEntry {
                form: Arc::clone(&form),
                last_seen: Instant::now(),
            },
        );

        info!("Created booking form {} ({} live)", id, forms.len());
        Ok(form)
    }

    /// Look up a form and mark it as recently used
    pub fn get(&self, id: &str) -> Result<Arc<BookingFormController>, BookingError> {
        let mut forms = self.forms();
        let entry = forms
            .get_mut(id)
            .ok_or_else(|| BookingError::SessionNotFound(id.to_string()))?;
        entry.last_seen = Instant::now();
        Ok(Arc::clone(&entry.form))
    }

    /// Discard a form and cancel its pending timer
    pub fn remove(&self, id: &str) -> Result<(), BookingError> {
        let entry = self
            .forms()
            .remove(id)
            .ok_or_else(|| BookingError::SessionNotFound(id.to_string()))?;
        entry.form.teardown();

        info!("Removed booking form {}", id);
        Ok(())
    }

    /// Discard every form idle for longer than the configured TTL
    pub fn evict_idle(&self) -> usize {
        let evicted = evict_expired(&mut self.forms(), self.limits.idle_ttl);
        if evicted > 0 {
            info!("Expired {} idle booking form(s)", evicted);
        }
        evicted
    }

    /// Run `evict_idle` every `period` until the registry is dropped
    pub fn spawn_expiry_sweep(self: &Arc<Self>, period: Duration) -> JoinHandle<()> {
        let sessions: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(sessions) = sessions.upgrade() else {
                    break;
                };
                sessions.evict_idle();
            }
        })
    }

    pub fn list(&self) -> Vec<FormSummary> {
        let mut summaries: Vec<FormSummary> = self
            .forms()
            .values()
            .map(|entry| FormSummary {
                id: entry.form.id().to_string(),
                state: entry.form.state(),
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    pub fn len(&self) -> usize {
        self.forms().len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms().is_empty()
    }
}
