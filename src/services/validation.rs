use chrono::{NaiveDate, NaiveTime};
use tracing::debug;
use validator::ValidateEmail;

use crate::models::booking::{BookingField, BookingRequest, FieldErrors, PetType, ValidBooking};

pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters";
pub const INVALID_EMAIL: &str = "Invalid email address";
pub const PHONE_TOO_SHORT: &str = "Phone number must be at least 10 digits";
pub const PET_TYPE_REQUIRED: &str = "Please select a pet type";
pub const DATE_REQUIRED: &str = "Please select an appointment date";
pub const DATE_INVALID: &str = "Invalid appointment date";
pub const DATE_IN_PAST: &str = "Appointment date cannot be in the past";
pub const TIME_REQUIRED: &str = "Please select an appointment time";
pub const TIME_INVALID: &str = "Invalid appointment time";
pub const SUBJECT_TOO_SHORT: &str = "Subject must be at least 5 characters";
pub const MESSAGE_TOO_SHORT: &str = "Message must be at least 10 characters";

type Rule<T> = Result<T, &'static str>;

fn min_chars(value: Option<&str>, min: usize, message: &'static str) -> Rule<String> {
    match value {
        Some(v) if v.chars().count() >= min => Ok(v.to_string()),
        _ => Err(message),
    }
}

fn parse_full_name(value: Option<&str>) -> Rule<String> {
    min_chars(value, 2, NAME_TOO_SHORT)
}

// Domain must be dotted with an alphabetic top-level label of 2+ letters
fn has_dotted_domain(email: &str) -> bool {
    email
        .rsplit_once('@')
        .and_then(|(_, domain)| domain.rsplit_once('.'))
        .is_some_and(|(host, tld)| {
            !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        })
}

fn parse_email(value: Option<&str>) -> Rule<String> {
    match value {
        Some(v) if v.validate_email() && has_dotted_domain(v) => Ok(v.to_string()),
        _ => Err(INVALID_EMAIL),
    }
}

fn parse_phone_number(value: Option<&str>) -> Rule<String> {
    min_chars(value, 10, PHONE_TOO_SHORT)
}

fn parse_pet_type(value: Option<&str>) -> Rule<PetType> {
    value
        .and_then(|v| v.parse::<PetType>().ok())
        .ok_or(PET_TYPE_REQUIRED)
}

fn parse_service(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn parse_appointment_date(value: Option<&str>, today: NaiveDate) -> Rule<NaiveDate> {
    let raw = match value {
        Some(v) if !v.is_empty() => v,
        _ => return Err(DATE_REQUIRED),
    };
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| DATE_INVALID)?;
    if date < today {
        return Err(DATE_IN_PAST);
    }
    Ok(date)
}

fn parse_appointment_time(value: Option<&str>) -> Rule<NaiveTime> {
    match value {
        Some(v) if !v.is_empty() => {
            NaiveTime::parse_from_str(v, "%H:%M").map_err(|_| TIME_INVALID)
        }
        _ => Err(TIME_REQUIRED),
    }
}

fn parse_subject(value: Option<&str>) -> Rule<String> {
    min_chars(value, 5, SUBJECT_TOO_SHORT)
}

fn parse_message(value: Option<&str>) -> Rule<String> {
    min_chars(value, 10, MESSAGE_TOO_SHORT)
}

/// Check one field in isolation, returning its error message if it fails
pub fn validate_field(
    field: BookingField,
    request: &BookingRequest,
    today: NaiveDate,
) -> Option<&'static str> {
    let value = request.get(field);
    match field {
        BookingField::FullName => parse_full_name(value).err(),
        BookingField::Email => parse_email(value).err(),
        BookingField::PhoneNumber => parse_phone_number(value).err(),
        BookingField::PetType => parse_pet_type(value).err(),
        BookingField::Service => None,
        BookingField::AppointmentDate => parse_appointment_date(value, today).err(),
        BookingField::AppointmentTime => parse_appointment_time(value).err(),
        BookingField::Subject => parse_subject(value).err(),
        BookingField::Message => parse_message(value).err(),
    }
}

// Record a failed rule and keep the parsed value otherwise
fn check<T>(errors: &mut FieldErrors, field: BookingField, rule: Rule<T>) -> Option<T> {
    match rule {
        Ok(value) => Some(value),
        Err(message) => {
            errors.insert(field, message);
            None
        }
    }
}

/// Validate the whole request. Every failing field is reported; the request
/// is only accepted when all of them pass.
pub fn validate(request: &BookingRequest, today: NaiveDate) -> Result<ValidBooking, FieldErrors> {
    let mut errors = FieldErrors::default();

    let full_name = check(&mut errors, BookingField::FullName, parse_full_name(request.full_name.as_deref()));
    let email = check(&mut errors, BookingField::Email, parse_email(request.email.as_deref()));
    let phone_number = check(
        &mut errors,
        BookingField::PhoneNumber,
        parse_phone_number(request.phone_number.as_deref()),
    );
    let pet_type = check(&mut errors, BookingField::PetType, parse_pet_type(request.pet_type.as_deref()));
    let appointment_date = check(
        &mut errors,
        BookingField::AppointmentDate,
        parse_appointment_date(request.appointment_date.as_deref(), today),
    );
    let appointment_time = check(
        &mut errors,
        BookingField::AppointmentTime,
        parse_appointment_time(request.appointment_time.as_deref()),
    );
    let subject = check(&mut errors, BookingField::Subject, parse_subject(request.subject.as_deref()));
    let message = check(&mut errors, BookingField::Message, parse_message(request.message.as_deref()));

    match (
        full_name,
        email,
        phone_number,
        pet_type,
        appointment_date,
        appointment_time,
        subject,
        message,
    ) {
        (
            Some(full_name),
            Some(email),
            Some(phone_number),
            Some(pet_type),
            Some(appointment_date),
            Some(appointment_time),
            Some(subject),
            Some(message),
        ) => Ok(ValidBooking {
            full_name,
            email,
            phone_number,
            pet_type,
            service: parse_service(request.service.as_deref()),
            appointment_date,
            appointment_time,
            subject,
            message,
        }),
        _ => {
            debug!(
                "Booking request failed validation on fields: {:?}",
                errors.fields().collect::<Vec<_>>()
            );
            Err(errors)
        }
    }
}
