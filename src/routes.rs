use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tracing::info;

use crate::handlers::api::{
    clinic_info, create_form, delete_form, get_form, list_forms, list_service_categories,
    list_services, list_submissions, reset_form, search_faqs, submit_form, update_field, AppState,
};
use crate::handlers::health::health_check;

pub fn create_router(app_state: Arc<AppState>, is_production: bool) -> Router {
    let mut router = Router::new();

    // Health check is always available
    let health_route = Router::new().route("/health", get(health_check));
    router = router.merge(health_route);

    // Booking form routes are always available
    let form_routes = Router::new()
        .route("/forms", post(create_form))
        .route("/forms/:form_id", get(get_form).delete(delete_form))
        .route("/forms/:form_id/fields/:field", put(update_field))
        .route("/forms/:form_id/submit", post(submit_form))
        .route("/forms/:form_id/reset", post(reset_form));
    router = router.merge(form_routes);

    // Read-only site content
    let content_routes = Router::new()
        .route("/services", get(list_services))
        .route("/services/categories", get(list_service_categories))
        .route("/faq", get(search_faqs))
        .route("/clinic", get(clinic_info));
    router = router.merge(content_routes);

    // Only add management routes if not in production mode
    if !is_production {
        let management_routes = Router::new()
            .route("/admin/forms", get(list_forms))
            .route("/admin/submissions", get(list_submissions));

        router = router.merge(management_routes);

        info!("Management routes enabled - server running in development mode");
    } else {
        info!("Running in production mode - management routes are not exposed");
    }

    router.with_state(app_state)
}
