use std::fmt;

use serde::Serialize;

pub(crate) const REQUIRED: &str = "This field is required.";

/// A single field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field-level failure collected while validating one form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            fields: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|error| error.field == field)
    }

    pub fn messages_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.fields
            .iter()
            .filter(move |error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .fields
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(f, "{}", rendered.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Collects field errors so a form reports every problem at once.
#[derive(Debug, Default)]
pub(crate) struct FormValidator {
    errors: ValidationErrors,
}

impl FormValidator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.fields.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Required text whose trimmed length must fall inside `min..=max` characters.
    pub(crate) fn text(&mut self, field: &str, value: Option<&str>, min: usize, max: usize) -> String {
        let trimmed = value.map(str::trim).unwrap_or_default();
        if trimmed.is_empty() && min > 0 {
            self.reject(field, REQUIRED);
            return String::new();
        }
        self.length(field, trimmed, min, max);
        trimmed.to_string()
    }

    /// Optional text bounded only by a maximum length.
    pub(crate) fn optional_text(&mut self, field: &str, value: Option<&str>, max: usize) -> String {
        let trimmed = value.map(str::trim).unwrap_or_default();
        self.length(field, trimmed, 0, max);
        trimmed.to_string()
    }

    pub(crate) fn email(&mut self, field: &str, value: Option<&str>) -> String {
        let before = self.errors.fields.len();
        let email = self.text(field, value, 1, 64);
        if self.errors.fields.len() == before && !looks_like_email(&email) {
            self.reject(field, "Invalid email address.");
        }
        email
    }

    pub(crate) fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() {
            self.reject(field, REQUIRED);
        }
        value
    }

    /// Required only while a sibling field holds a truthy value.
    pub(crate) fn required_if<T>(&mut self, field: &str, value: Option<T>, sibling: bool) -> Option<T> {
        if sibling && value.is_none() {
            self.reject(field, REQUIRED);
        }
        value
    }

    pub(crate) fn finish(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    fn length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let count = value.chars().count();
        if count < min || count > max {
            let message = if min == 0 {
                format!("Field cannot be longer than {max} characters.")
            } else {
                format!("Field must be between {min} and {max} characters long.")
            };
            self.reject(field, message);
        }
    }
}

fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !value.chars().any(char::is_whitespace)
}
