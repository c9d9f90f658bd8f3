use axum_test::TestServer;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::client::{IntakeTransport, MockIntakeTransport};
use crate::handlers::api::AppState;
use crate::routes::create_router;
use crate::services::content::ContentStore;
use crate::services::form_controller::FormSettings;
use crate::services::sessions::{FormSessions, SessionLimits};
use crate::services::submission_log::SubmissionLog;

/// Fixed "today" used by every test form
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
}

pub fn test_settings() -> FormSettings {
    FormSettings {
        dismiss_after: Duration::from_secs(5),
        today: Arc::new(test_today),
    }
}

/// Field values of a booking that passes validation
pub fn valid_booking_fields() -> Vec<(&'static str, &'static str)> {
    vec![
        ("fullName", "Jo"),
        ("email", "jo@x.com"),
        ("phoneNumber", "9876543210"),
        ("petType", "dog"),
        ("appointmentDate", "2030-01-01"),
        ("appointmentTime", "10:00"),
        ("subject", "Checkup needed"),
        ("message", "Annual wellness visit"),
    ]
}

pub fn load_test_content() -> ContentStore {
    ContentStore::load(concat!(env!("CARGO_MANIFEST_DIR"), "/data")).unwrap()
}

pub fn create_test_state(
    transport: MockIntakeTransport,
    ledger: Option<Arc<SubmissionLog>>,
) -> Arc<AppState> {
    let transport: Arc<dyn IntakeTransport> = Arc::new(transport);
    Arc::new(AppState {
        sessions: Arc::new(FormSessions::new(
            transport,
            ledger.clone(),
            test_settings(),
            SessionLimits::default(),
        )),
        content: load_test_content(),
        ledger,
    })
}

pub fn create_test_server(app_state: Arc<AppState>, is_production: bool) -> TestServer {
    TestServer::new(create_router(app_state, is_production)).unwrap()
}

/// Create a form through the API and return its id
pub async fn create_form(server: &TestServer) -> String {
    let response = server.post("/forms").await;
    let body: Value = response.json();
    body["id"].as_str().unwrap().to_string()
}

/// Fill every field of a form with valid values through the API
pub async fn fill_valid_form(server: &TestServer, form_id: &str) {
    for (field, value) in valid_booking_fields() {
        server
            .put(&format!("/forms/{}/fields/{}", form_id, field))
            .json(&json!({ "value": value }))
            .await
            .assert_status_ok();
    }
}
