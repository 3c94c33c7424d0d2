use chrono::{Local, NaiveDate, NaiveTime};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::database::models::AppointmentInput;

/// Field-level validation failures, keyed by field name. Serialized as a
/// plain map so clients can attach messages to the offending form fields.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

const PHONE_PATTERN: &str = r"^\+?\d{7,15}$";
const ZIP_PATTERN: &str = r"^\d{5}(-\d{4})?$";
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

/// Validate an appointment form against the current local date and time.
pub fn validate_appointment(input: &AppointmentInput) -> Result<(), ValidationErrors> {
    let now = Local::now();
    validate_appointment_at(input, now.date_naive(), now.time())
}

/// Validation core, parameterized on "today" so the schedule rules can be
/// pinned down in tests.
pub fn validate_appointment_at(
    input: &AppointmentInput,
    today: NaiveDate,
    now: NaiveTime,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if input.first_name.trim().chars().count() < 2 {
        errors.add("firstName", "First name must be at least 2 characters");
    }
    if input.last_name.trim().chars().count() < 2 {
        errors.add("lastName", "Last name must be at least 2 characters");
    }

    if input.title.trim().is_empty() {
        errors.add("title", "Title is required");
    } else if input.title.chars().count() > 100 {
        errors.add("title", "Title must be at most 100 characters");
    }

    if let Some(email) = non_blank(&input.email) {
        if !Regex::new(EMAIL_PATTERN).unwrap().is_match(email) {
            errors.add("email", "Enter a valid email address");
        }
    }

    if let Some(phone) = non_blank(&input.phone) {
        if !Regex::new(PHONE_PATTERN).unwrap().is_match(phone) {
            errors.add("phone", "Enter a valid phone number (digits, optional leading +)");
        }
    }

    if let Some(zip) = non_blank(&input.zip_code) {
        if !Regex::new(ZIP_PATTERN).unwrap().is_match(zip) {
            errors.add("zipCode", "Enter a ZIP code in 12345 or 12345-6789 form");
        }
    }

    if let Some(date) = input.scheduled_date {
        if date < today {
            errors.add("scheduledDate", "Appointment date cannot be in the past");
        } else if date == today {
            if let Some(time) = input.scheduled_time {
                if time < now {
                    errors.add("scheduledTime", "Appointment time cannot be in the past");
                }
            }
        }
    }

    errors.into_result()
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
