use serde::Serialize;
use std::borrow::Cow;
use std::str::FromStr;
use utoipa::ToSchema;

/// A single failing request field, reported back to the caller alongside every other failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: &'static str,
    #[schema(value_type = String)]
    pub message: Cow<'static, str>,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Collects field errors while request values are converted into domain values.
///
/// Every `require_*` method returns `None` exactly when it recorded an error, so a caller that gets
/// `Some` for all required values and an empty error list holds a fully valid request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject(&mut self, field: &'static str, message: impl Into<Cow<'static, str>>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn require_text(
        &mut self,
        field: &'static str,
        value: Option<String>,
        message: &'static str,
    ) -> Option<String> {
        match non_blank(value) {
            Some(v) => Some(v),
            None => {
                self.reject(field, message);
                None
            }
        }
    }

    /// Parses a required value, e.g. an enum or an id. Blank and missing values get `missing_message`,
    /// unparseable values get `invalid_message`.
    pub fn require_parsed<T: FromStr>(
        &mut self,
        field: &'static str,
        value: Option<String>,
        missing_message: &'static str,
        invalid_message: impl Into<Cow<'static, str>>,
    ) -> Option<T> {
        let Some(raw) = non_blank(value) else {
            self.reject(field, missing_message);
            return None;
        };

        match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.reject(field, invalid_message);
                None
            }
        }
    }

    /// Validates a value that may be left out. A supplied value must not be blank.
    pub fn optional_text(
        &mut self,
        field: &'static str,
        value: Option<String>,
        message: &'static str,
    ) -> Option<String> {
        let raw = value?;
        if raw.trim().is_empty() {
            self.reject(field, message);
            None
        } else {
            Some(raw)
        }
    }

    /// Parses a value that may be left out. A supplied value must parse.
    pub fn optional_parsed<T: FromStr>(
        &mut self,
        field: &'static str,
        value: Option<String>,
        invalid_message: impl Into<Cow<'static, str>>,
    ) -> Option<T> {
        let raw = value?;
        match raw.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                self.reject(field, invalid_message);
                None
            }
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }
}

/// `None` for missing, empty, and whitespace only values.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
