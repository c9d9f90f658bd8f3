use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{error_handling::HandleErrorLayer, http::StatusCode};
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use lifecare_booking_service::{
    create_router,
    services::{
        content::ContentStore,
        form_controller::DEFAULT_DISMISS_AFTER,
        sessions::{FormSessions, SessionLimits, SWEEP_INTERVAL},
        submission_log::create_submission_log,
    },
    AppState, FormSettings, IntakeClient,
};

// Error handler
async fn handle_error(error: BoxError) -> (StatusCode, String) {
    if error.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            "Request took too long".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", error),
        )
    }
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    #[cfg(feature = "sentry-monitoring")]
    let _sentry = env::var("SENTRY_DSN").ok().map(|dsn| {
        info!("Sentry error tracking enabled");
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    // Initialize the intake endpoint client
    let client = IntakeClient::from_env().expect("Failed to initialize intake client");

    // Load static site content
    let content_dir = env::var("CONTENT_DIR").unwrap_or_else(|_| "data".to_string());
    let content = ContentStore::load(&content_dir).expect("Failed to load site content");

    // Open the submission log
    let ledger = create_submission_log().expect("Failed to open submission log");
    if let Some(ledger) = &ledger {
        info!("Recording submissions to {}", ledger.path());
    }

    // Load the confirmation dismiss delay from environment or default to 5 seconds
    let dismiss_after = env::var("FORM_DISMISS_SECS")
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_DISMISS_AFTER);

    let settings = FormSettings {
        dismiss_after,
        ..FormSettings::default()
    };

    // Check if running in production mode
    let is_production = env::var("ENVIRONMENT")
        .map(|val| val.to_lowercase() == "production")
        .unwrap_or(false);

    if is_production {
        info!("Running in PRODUCTION mode - restricting available endpoints");
    } else {
        info!("Running in DEVELOPMENT mode - all endpoints will be available");
    }

    // Bound how many forms may be live and how long an idle one is kept
    let defaults = SessionLimits::default();
    let limits = SessionLimits {
        idle_ttl: env::var("FORM_IDLE_TTL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.idle_ttl),
        max_forms: env::var("MAX_LIVE_FORMS")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.max_forms),
    };
    info!(
        "Forms expire after {}s idle, at most {} live",
        limits.idle_ttl.as_secs(),
        limits.max_forms
    );

    let sessions = Arc::new(FormSessions::new(
        Arc::new(client),
        ledger.clone(),
        settings,
        limits,
    ));
    let _sweep = sessions.spawn_expiry_sweep(SWEEP_INTERVAL);

    // Create shared application state
    let app_state = Arc::new(AppState {
        sessions,
        content,
        ledger,
    });

    // Create router with appropriate routes based on environment
    let app = create_router(app_state, is_production).layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_error))
            .load_shed()
            .concurrency_limit(64)
            .timeout(Duration::from_secs(30))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::new().allow_origin(Any)),
    );

    let addr: SocketAddr = env::var("BIND_ADDR")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));
    info!("Server listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    // Set up signal handler for graceful shutdown
    let shutdown = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received interrupt signal, starting graceful shutdown");
            },
            _ = terminate => {
                info!("Received terminate signal, starting graceful shutdown");
            },
        }
    };

    // Start server with graceful shutdown
    info!("Server is ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .expect("Failed to start server");

    info!("Server has been gracefully shut down");
}
