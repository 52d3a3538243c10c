//! Field limits and validation for task input.

use std::fmt;

use thiserror::Error;

use crate::{CreateTaskRequest, TaskListQuery, UpdateTaskRequest, MAX_LIMIT};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
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
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// All field errors found in one piece of input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("validation failed: {}", summary(.0))]
pub struct ValidationErrors(pub Vec<FieldError>);

fn summary(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldError::new(field, message)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty() && title.chars().count() <= TITLE_MAX_CHARS
}

pub fn is_valid_description(description: &str) -> bool {
    description.chars().count() <= DESCRIPTION_MAX_CHARS
}

fn check_title(title: &str, errors: &mut ValidationErrors) {
    if title.trim().is_empty() {
        errors.push("title", "must not be empty");
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.push(
            "title",
            format!("must be at most {TITLE_MAX_CHARS} characters"),
        );
    }
}

fn check_description(description: &str, errors: &mut ValidationErrors) {
    if !is_valid_description(description) {
        errors.push(
            "description",
            format!("must be at most {DESCRIPTION_MAX_CHARS} characters"),
        );
    }
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        check_title(&self.title, &mut errors);
        if let Some(description) = &self.description {
            check_description(description, &mut errors);
        }
        errors.into_result()
    }
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if let Some(title) = &self.title {
            check_title(title, &mut errors);
        }
        if let Some(description) = &self.description {
            check_description(description, &mut errors);
        }
        errors.into_result()
    }
}

impl TaskListQuery {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let limit = self.limit();
        if limit == 0 || limit > MAX_LIMIT {
            errors.push("limit", format!("must be between 1 and {MAX_LIMIT}"));
        }
        errors.into_result()
    }
}
