//! Registry of named string formats (`date`, `date-time`, `uuid`, ...).
//!
//! DTO fields that carry a formatted string are checked against the
//! registry the client was built with before any request is sent.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use chrono::{DateTime, NaiveDate};
use uuid::Uuid;

use crate::error::ValidationError;

/// Returns true when `value` is a valid instance of the format.
pub type FormatValidator = fn(&str) -> bool;

static GLOBAL: LazyLock<Arc<FormatRegistry>> =
    LazyLock::new(|| Arc::new(FormatRegistry::with_builtins()));

#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    validators: BTreeMap<String, FormatValidator>,
}

impl FormatRegistry {
    /// An empty registry. Every format check fails with `UnknownFormat`.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry
            .add("date", is_date)
            .add("date-time", is_date_time)
            .add("uuid", is_uuid)
            .add("email", is_email);
        registry
    }

    /// The process-wide registry used when a client is built without one.
    ///
    /// Always the same allocation; it is never mutated after initialisation.
    pub fn global() -> Arc<FormatRegistry> {
        Arc::clone(&GLOBAL)
    }

    /// Register (or replace) a format.
    pub fn add(&mut self, name: impl Into<String>, validator: FormatValidator) -> &mut Self {
        self.validators.insert(name.into(), validator);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    /// Check `value` of `field` against `format`.
    pub fn check(&self, field: &str, format: &str, value: &str) -> Result<(), ValidationError> {
        let validator = self
            .validators
            .get(format)
            .ok_or_else(|| ValidationError::UnknownFormat {
                field: field.to_string(),
                format: format.to_string(),
            })?;
        if validator(value) {
            Ok(())
        } else {
            Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                format: format.to_string(),
                value: value.to_string(),
            })
        }
    }
}

fn is_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn is_date_time(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
}

fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = FormatRegistry::with_builtins();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["date", "date-time", "email", "uuid"]);
    }

    #[test]
    fn global_is_a_singleton() {
        let a = FormatRegistry::global();
        let b = FormatRegistry::global();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.contains("date-time"));
    }

    #[test]
    fn date_formats() {
        let registry = FormatRegistry::with_builtins();
        assert!(registry.check("dueDate", "date", "2024-02-29").is_ok());
        assert!(registry.check("dueDate", "date", "2023-02-29").is_err());
        assert!(registry
            .check("reportedAt", "date-time", "2024-05-01T10:00:00Z")
            .is_ok());
        assert!(registry
            .check("reportedAt", "date-time", "2024-05-01 10:00")
            .is_err());
    }

    #[test]
    fn uuid_and_email_formats() {
        let registry = FormatRegistry::with_builtins();
        assert!(registry
            .check("id", "uuid", "00000000-0000-0000-0000-000000000000")
            .is_ok());
        assert!(registry.check("id", "uuid", "not-a-uuid").is_err());
        assert!(registry.check("user", "email", "ana@example.com").is_ok());
        assert!(registry.check("user", "email", "ana@").is_err());
        assert!(registry.check("user", "email", "a b@example.com").is_err());
    }

    #[test]
    fn invalid_value_reports_field_and_format() {
        let registry = FormatRegistry::with_builtins();
        let err = registry.check("dueDate", "date", "tomorrow").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidFormat {
                field: "dueDate".to_string(),
                format: "date".to_string(),
                value: "tomorrow".to_string(),
            }
        );
    }

    #[test]
    fn unknown_format_is_rejected() {
        let registry = FormatRegistry::new();
        let err = registry.check("dueDate", "date", "2024-01-01").unwrap_err();
        assert!(matches!(err, ValidationError::UnknownFormat { .. }));
    }

    #[test]
    fn custom_format_can_be_added() {
        let mut registry = FormatRegistry::new();
        registry.add("tag", |v: &str| !v.is_empty() && v.chars().all(|c| c.is_ascii_lowercase()));
        assert!(registry.check("tags", "tag", "backend").is_ok());
        assert!(registry.check("tags", "tag", "Backend").is_err());
    }
}
