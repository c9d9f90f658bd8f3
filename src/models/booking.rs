use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::BookingError;

/// Fields of the booking form, named on the wire as the intake endpoint expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingField {
    FullName,
    Email,
    PhoneNumber,
    PetType,
    Service,
    AppointmentDate,
    AppointmentTime,
    Subject,
    Message,
}

impl BookingField {
    pub const ALL: [BookingField; 9] = [
        BookingField::FullName,
        BookingField::Email,
        BookingField::PhoneNumber,
        BookingField::PetType,
        BookingField::Service,
        BookingField::AppointmentDate,
        BookingField::AppointmentTime,
        BookingField::Subject,
        BookingField::Message,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingField::FullName => "fullName",
            BookingField::Email => "email",
            BookingField::PhoneNumber => "phoneNumber",
            BookingField::PetType => "petType",
            BookingField::Service => "service",
            BookingField::AppointmentDate => "appointmentDate",
            BookingField::AppointmentTime => "appointmentTime",
            BookingField::Subject => "subject",
            BookingField::Message => "message",
        }
    }
}

impl fmt::Display for BookingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingField {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingField::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| BookingError::UnknownField(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetType {
    Dog,
    Cat,
    Bird,
    Rabbit,
    Exotic,
    Other,
}

impl PetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PetType::Dog => "dog",
            PetType::Cat => "cat",
            PetType::Bird => "bird",
            PetType::Rabbit => "rabbit",
            PetType::Exotic => "exotic",
            PetType::Other => "other",
        }
    }
}

impl FromStr for PetType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dog" => Ok(PetType::Dog),
            "cat" => Ok(PetType::Cat),
            "bird" => Ok(PetType::Bird),
            "rabbit" => Ok(PetType::Rabbit),
            "exotic" => Ok(PetType::Exotic),
            "other" => Ok(PetType::Other),
            _ => Err(()),
        }
    }
}

/// In-progress form input. `None` means the field was never entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub pet_type: Option<String>,
    pub service: Option<String>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

impl BookingRequest {
    pub fn get(&self, field: BookingField) -> Option<&str> {
        let slot = match field {
            BookingField::FullName => &self.full_name,
            BookingField::Email => &self.email,
            BookingField::PhoneNumber => &self.phone_number,
            BookingField::PetType => &self.pet_type,
            BookingField::Service => &self.service,
            BookingField::AppointmentDate => &self.appointment_date,
            BookingField::AppointmentTime => &self.appointment_time,
            BookingField::Subject => &self.subject,
            BookingField::Message => &self.message,
        };
        slot.as_deref()
    }

    /// Set a single field, returning whether the stored value changed
    pub fn set(&mut self, field: BookingField, value: String) -> bool {
        let slot = match field {
            BookingField::FullName => &mut self.full_name,
            BookingField::Email => &mut self.email,
            BookingField::PhoneNumber => &mut self.phone_number,
            BookingField::PetType => &mut self.pet_type,
            BookingField::Service => &mut self.service,
            BookingField::AppointmentDate => &mut self.appointment_date,
            BookingField::AppointmentTime => &mut self.appointment_time,
            BookingField::Subject => &mut self.subject,
            BookingField::Message => &mut self.message,
        };

        if slot.as_deref() == Some(value.as_str()) {
            return false;
        }
        *slot = Some(value);
        true
    }

    pub fn is_empty(&self) -> bool {
        *self == BookingRequest::default()
    }
}

/// Human-readable error per failing field. A field with no entry is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<BookingField, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: BookingField, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn remove(&mut self, field: BookingField) -> Option<String> {
        self.0.remove(&field)
    }

    pub fn get(&self, field: BookingField) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: BookingField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = BookingField> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// A request that passed every field rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBooking {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub pet_type: PetType,
    pub service: Option<String>,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub subject: String,
    pub message: String,
}

/// Body posted to the intake endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub pet_type: String,
    pub service: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub subject: String,
    pub message: String,
}

impl From<ValidBooking> for BookingPayload {
    fn from(booking: ValidBooking) -> Self {
        Self {
            full_name: booking.full_name,
            email: booking.email,
            phone_number: booking.phone_number,
            pet_type: booking.pet_type.as_str().to_string(),
            service: booking.service.unwrap_or_default(),
            appointment_date: booking.appointment_date.format("%Y-%m-%d").to_string(),
            appointment_time: booking.appointment_time.format("%H:%M").to_string(),
            subject: booking.subject,
            message: booking.message,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Submitted,
}

/// How the hand-off to the intake endpoint went. Never shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Delivered,
    TransportFailed,
    NotConfigured,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Delivered => "delivered",
            DispatchOutcome::TransportFailed => "transport_failed",
            DispatchOutcome::NotConfigured => "not_configured",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted(DispatchOutcome),
    Rejected(FieldErrors),
}

/// Serializable view of one form session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    pub id: String,
    pub state: SubmissionState,
    pub request: BookingRequest,
    pub errors: FieldErrors,
    pub submit_attempted: bool,
}
