//! Lifecare Booking Service
//!
//! This library hosts the appointment booking form of the Lifecare Pet
//! Specialty Clinic website. Each form is a small state machine that collects
//! the visitor's request, validates it field by field and hands valid
//! bookings to an external, spreadsheet-backed intake endpoint.
//!
//! # Modules
//!
//! - `services::form_controller`: the booking form state machine
//! - `services::validation`: per-field rules for a booking request
//! - `client`: fire-and-forget transport to the intake endpoint
//! - `auth`: optional HMAC signing of outbound payloads
//! - `services::content`: static clinic content, FAQ search and service filter
//!
//! # Delivery
//!
//! The intake endpoint never acknowledges a booking, so transport failures
//! cannot be told apart from success. The form always shows its confirmation;
//! the real outcome of every hand-off is logged and written to the CSV
//! submission log.

pub mod auth;
pub mod client;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

#[cfg(test)]
mod tests;

// Re-export the main API types for ease of use
pub use client::{IntakeClient, IntakeTransport};
pub use error::BookingError;
pub use handlers::api::AppState;
pub use routes::create_router;
pub use services::form_controller::{BookingFormController, FormSettings};
