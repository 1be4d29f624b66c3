//! Field validation for inbound hearing events
//!
//! Runs before the relay pipeline; a payload that fails here is rejected
//! without telemetry or publishing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{Defendant, HearingEvent, ProsecutionCase};

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// JSON path of the field, e.g. `hearing.courtCentre.code`
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn blank(field: impl Into<String>) -> Self {
        Self::new(field, "must not be blank")
    }

    fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "must not be null")
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors found in one payload
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Validation failed with {} field error(s)", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

impl HearingEvent {
    /// Validate the fields the relay depends on
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        let hearing = self.hearing();

        if is_blank(&hearing.id) {
            errors.push(FieldError::blank("hearing.id"));
        }
        if is_blank(&hearing.court_centre.id) {
            errors.push(FieldError::blank("hearing.courtCentre.id"));
        }
        if is_blank(&hearing.court_centre.code) {
            errors.push(FieldError::blank("hearing.courtCentre.code"));
        }

        for (index, case) in hearing.prosecution_cases.iter().enumerate() {
            validate_case(case, &format!("hearing.prosecutionCases[{index}]"), &mut errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { errors })
        }
    }
}

fn validate_case(case: &ProsecutionCase, path: &str, errors: &mut Vec<FieldError>) {
    if is_blank(&case.id) {
        errors.push(FieldError::blank(format!("{path}.id")));
    }
    for (index, defendant) in case.defendants.iter().enumerate() {
        validate_defendant(defendant, &format!("{path}.defendants[{index}]"), errors);
    }
}

fn validate_defendant(defendant: &Defendant, path: &str, errors: &mut Vec<FieldError>) {
    if is_blank(&defendant.id) {
        errors.push(FieldError::blank(format!("{path}.id")));
    }
    if let Some(person) = &defendant.person_defendant {
        match &person.person_details {
            Some(details) if is_blank(&details.last_name) => errors.push(FieldError::blank(
                format!("{path}.personDefendant.personDetails.lastName"),
            )),
            Some(_) => {}
            None => errors.push(FieldError::missing(format!(
                "{path}.personDefendant.personDetails"
            ))),
        }
    }
}
