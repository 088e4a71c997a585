//! The module contains the errors the engine can return.
//!
//! Field-level problems are never reported one at a time: every check of a
//! submission runs and the failures are gathered into [`ValidationErrors`],
//! carried by [`EngineError::Validation`]. The remaining variants describe
//! conditions that stop an operation as a whole:
//!
//! - [`ReferentialIntegrity`] a rubric is still referenced by listings.
//! - [`KeyNotFound`] an item is not found.
//! - [`Unauthenticated`] credentials are missing or wrong.
//!
//!  [`ReferentialIntegrity`]: EngineError::ReferentialIntegrity
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Unauthenticated`]: EngineError::Unauthenticated
use std::fmt;

use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;

/// What a single field failed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    DuplicateName,
    InvalidName,
    InvalidTitle,
    BannedTitle,
    MissingDescription,
    InvalidPrice,
    NegativePrice,
    MissingRubric,
    UnknownRubric,
    InvalidKeyword,
    InvalidFileName,
    DuplicateEmail,
    DuplicateUsername,
    InvalidUsername,
    PasswordMismatch,
    InvalidPassword,
}

impl ValidationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DuplicateName => "duplicate_name",
            Self::InvalidName => "invalid_name",
            Self::InvalidTitle => "invalid_title",
            Self::BannedTitle => "banned_title",
            Self::MissingDescription => "missing_description",
            Self::InvalidPrice => "invalid_price",
            Self::NegativePrice => "negative_price",
            Self::MissingRubric => "missing_rubric",
            Self::UnknownRubric => "unknown_rubric",
            Self::InvalidKeyword => "invalid_keyword",
            Self::InvalidFileName => "invalid_file_name",
            Self::DuplicateEmail => "duplicate_email",
            Self::DuplicateUsername => "duplicate_username",
            Self::InvalidUsername => "invalid_username",
            Self::PasswordMismatch => "password_mismatch",
            Self::InvalidPassword => "invalid_password",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub kind: ValidationKind,
    pub message: String,
}

/// Every field failure of one submission, in the order they were found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &'static str, kind: ValidationKind, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.push(field, kind, message);
        errors
    }

    pub fn push(&mut self, field: &'static str, kind: ValidationKind, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            kind,
            message: message.into(),
        });
    }

    /// Appends `other`, skipping failures already reported for the same
    /// field and kind. The first message wins.
    pub fn merge(&mut self, other: ValidationErrors) {
        for error in other.0 {
            if !self
                .0
                .iter()
                .any(|e| e.field == error.field && e.kind == error.kind)
            {
                self.0.push(error);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, kind: ValidationKind) -> bool {
        self.0.iter().any(|e| e.kind == kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when nothing failed, the collected failures otherwise.
    pub fn into_result(self) -> Result<(), EngineError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(self))
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", error.field, error.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("\"{0}\" is still referenced by listings!")]
    ReferentialIntegrity(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Authentication required")]
    Unauthenticated,
    #[error("Invalid kind: {0}")]
    InvalidKind(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// `true` when this is a validation failure that includes `kind`.
    pub fn has_kind(&self, kind: ValidationKind) -> bool {
        matches!(self, Self::Validation(errors) if errors.contains(kind))
    }
}

impl From<ValidationErrors> for EngineError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::ReferentialIntegrity(a), Self::ReferentialIntegrity(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Unauthenticated, Self::Unauthenticated) => true,
            (Self::InvalidKind(a), Self::InvalidKind(b)) => a == b,
            (Self::Hashing(a), Self::Hashing(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
