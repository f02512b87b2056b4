use chrono::{DateTime, NaiveDate, NaiveDateTime};
use thiserror::Error;

pub const NAME_MAX_CHARS: usize = 50;

/// A field rejected by the form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name must be at most {max} characters")]
    NameTooLong { max: usize },

    #[error("Please enter a valid date and time")]
    InvalidDateTime,
}

/// Errors of a whole date form submission, one slot per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub name: Option<FieldError>,
    pub date: Option<FieldError>,
}

impl FormErrors {
    pub fn is_valid(&self) -> bool {
        self.name.is_none() && self.date.is_none()
    }
}

pub fn validate_name(name: &str) -> Result<(), FieldError> {
    match name.chars().count() {
        0 => Err(FieldError::NameRequired),
        n if n > NAME_MAX_CHARS => Err(FieldError::NameTooLong {
            max: NAME_MAX_CHARS,
        }),
        _ => Ok(()),
    }
}

/// Accepts nothing, an empty string, an ISO date-time with or without
/// offset, or an ISO date. Empty input normalizes to `None`.
pub fn validate_optional_datetime(value: Option<&str>) -> Result<Option<String>, FieldError> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if is_iso_datetime(value) || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        Ok(Some(value.to_string()))
    } else {
        Err(FieldError::InvalidDateTime)
    }
}

pub fn validate_form(name: &str, date: Option<&str>) -> FormErrors {
    FormErrors {
        name: validate_name(name).err(),
        date: validate_optional_datetime(date).err(),
    }
}

fn is_iso_datetime(value: &str) -> bool {
    // the date and time must be joined by `T`
    if value.get(10..11) != Some("T") {
        return false;
    }
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M").is_ok()
}
