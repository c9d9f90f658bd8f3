use axum::{
    extract::{Json as ExtractJson, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::booking::{BookingField, FieldErrors, FormSnapshot, SubmitOutcome};
use crate::models::common::{CategoryParams, FieldUpdate, SearchParams};
use crate::models::content::{ClinicInfo, FaqCategory, ServiceItem};
use crate::services::content::{search_faq, service_categories, services_in_category, ContentStore};
use crate::services::sessions::{FormSessions, FormSummary};
use crate::services::submission_log::{SubmissionLog, SubmissionRecord};

pub const SUBMITTED_MESSAGE: &str = "Thanks! We'll get back to you within 24 hours";
pub const REJECTED_MESSAGE: &str = "Please correct the highlighted fields";

// AppState struct containing shared resources
pub struct AppState {
    pub sessions: Arc<FormSessions>,
    pub content: ContentStore,
    pub ledger: Option<Arc<SubmissionLog>>,
}

// Response structure for the submit endpoint
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub form: FormSnapshot,
}

// Create a new booking form session
pub async fn create_form(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<FormSnapshot>), StatusCode> {
    let form = state.sessions.create()?;
    Ok((StatusCode::CREATED, Json(form.snapshot())))
}

// Fetch the current state of a form
pub async fn get_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<String>,
) -> Result<Json<FormSnapshot>, StatusCode> {
    let form = state.sessions.get(&form_id)?;
    Ok(Json(form.snapshot()))
}

// Set one field of a form
pub async fn update_field(
    State(state): State<Arc<AppState>>,
    Path((form_id, field_name)): Path<(String, String)>,
    ExtractJson(update): ExtractJson<FieldUpdate>,
) -> Result<Json<FormSnapshot>, StatusCode> {
    let field: BookingField = field_name.parse().map_err(|e| {
        warn!("Rejected update for form {}: {}", form_id, e);
        StatusCode::from(e)
    })?;
    let form = state.sessions.get(&form_id)?;

    if field == BookingField::Service
        && !update.value.is_empty()
        && !state.content.has_service_named(&update.value)
    {
        warn!(
            "Form {} selected service '{}' which is not in the catalog",
            form_id, update.value
        );
    }

    form.update_field(field, update.value);
    Ok(Json(form.snapshot()))
}

// Submit a form
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<String>,
) -> Result<(StatusCode, Json<SubmitResponse>), StatusCode> {
    let form = state.sessions.get(&form_id)?;

    match form.submit().await? {
        SubmitOutcome::Accepted(_) => Ok((
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                success: true,
                message: SUBMITTED_MESSAGE.to_string(),
                errors: None,
                form: form.snapshot(),
            }),
        )),
        SubmitOutcome::Rejected(errors) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(SubmitResponse {
                success: false,
                message: REJECTED_MESSAGE.to_string(),
                errors: Some(errors),
                form: form.snapshot(),
            }),
        )),
    }
}

// Clear a form back to empty
pub async fn reset_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<String>,
) -> Result<Json<FormSnapshot>, StatusCode> {
    let form = state.sessions.get(&form_id)?;
    form.reset()?;
    Ok(Json(form.snapshot()))
}

// Discard a form
pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    state.sessions.remove(&form_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// List live forms (management)
pub async fn list_forms(State(state): State<Arc<AppState>>) -> Json<Vec<FormSummary>> {
    Json(state.sessions.list())
}

// List logged submissions (management)
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SubmissionRecord>>, StatusCode> {
    let Some(ledger) = &state.ledger else {
        return Err(StatusCode::NOT_FOUND);
    };

    match ledger.read_all() {
        Ok(records) => {
            info!("Returning {} logged submissions", records.len());
            Ok(Json(records))
        }
        Err(e) => {
            error!("Failed to read submission log: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

// Service catalog, optionally filtered by category
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CategoryParams>,
) -> Json<Vec<ServiceItem>> {
    let services = services_in_category(&state.content.services, params.category.as_deref())
        .into_iter()
        .cloned()
        .collect();
    Json(services)
}

pub async fn list_service_categories(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(service_categories(&state.content.services))
}

pub async fn search_faqs(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<FaqCategory>> {
    Json(search_faq(&state.content.faq, &params.q))
}

pub async fn clinic_info(State(state): State<Arc<AppState>>) -> Json<ClinicInfo> {
    Json(state.content.clinic.clone())
}
