use dotenv::dotenv;
use futures::future::{self, BoxFuture, FutureExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::env;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::auth::IntakeSigner;
use crate::error::BookingError;
use crate::models::booking::BookingPayload;

/// Value shipped in the sample configuration; treated the same as unset
pub const PLACEHOLDER_ENDPOINT: &str = "YOUR_INTAKE_ENDPOINT_URL";

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Hand-off of a validated booking to the intake endpoint.
///
/// Implementations resolve once the request has been sent. The response is
/// never inspected, so `Ok(())` only means nothing failed on our side.
#[cfg_attr(test, mockall::automock)]
pub trait IntakeTransport: Send + Sync {
    fn dispatch(&self, payload: BookingPayload) -> BoxFuture<'static, Result<(), BookingError>>;
}

/// Drop empty and placeholder endpoint values
pub fn normalize_endpoint(raw: Option<String>) -> Option<String> {
    raw.map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty() && url != PLACEHOLDER_ENDPOINT)
}

/// Fire-and-forget client for the spreadsheet-backed intake endpoint
#[derive(Clone)]
pub struct IntakeClient {
    client: Client,
    endpoint: Option<String>,
    signer: Option<IntakeSigner>,
}

impl IntakeClient {
    pub fn new(
        endpoint: Option<String>,
        timeout: Duration,
        signing_secret: Option<String>,
    ) -> Result<Self, BookingError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BookingError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: normalize_endpoint(endpoint),
            signer: signing_secret
                .filter(|secret| !secret.is_empty())
                .map(IntakeSigner::new),
        })
    }

    /// Create an intake client from environment variables
    pub fn from_env() -> Result<Self, BookingError> {
        dotenv().ok();

        let endpoint = env::var("INTAKE_ENDPOINT_URL").ok();
        let timeout_secs = env::var("INTAKE_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let signing_secret = env::var("INTAKE_SIGNING_SECRET").ok();

        let client = Self::new(endpoint, Duration::from_secs(timeout_secs), signing_secret)?;

        if client.is_configured() {
            info!(
                "Intake endpoint configured with {}s timeout{}",
                timeout_secs,
                if client.signer.is_some() { ", signing enabled" } else { "" }
            );
        } else {
            warn!("INTAKE_ENDPOINT_URL is not set; booking submissions will not be forwarded");
        }

        Ok(client)
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

impl IntakeTransport for IntakeClient {
    fn dispatch(&self, payload: BookingPayload) -> BoxFuture<'static, Result<(), BookingError>> {
        let Some(url) = self.endpoint.clone() else {
            return future::ready(Err(BookingError::IntakeNotConfigured)).boxed();
        };

        let body = match serde_json::to_string(&payload) {
            Ok(body) => body,
            Err(e) => {
                return future::ready(Err(BookingError::Transport(format!(
                    "Failed to serialize payload: {}",
                    e
                ))))
                .boxed()
            }
        };

        let mut request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json");

        if let Some(signer) = &self.signer {
            for (name, value) in signer.headers(&body) {
                request = request.header(name, value);
            }
        }

        let request = request.body(body);

        async move {
            debug!("Dispatching booking payload to {}", url);

            // Response status and body are never read
            request
                .send()
                .await
                .map_err(|e| BookingError::Transport(e.to_string()))?;

            Ok(())
        }
        .boxed()
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;
