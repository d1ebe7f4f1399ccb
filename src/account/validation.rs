//! Input validation for user account fields
//!
//! Validated newtypes keep their field private so the only way to build one
//! is through `new()`.

use std::fmt;
use validator::ValidateEmail;

// ============================================================================
// Validation Errors
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),

    #[error("Invalid length for {field}: expected {min}-{max}, got {actual}")]
    InvalidLength {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },

    #[error("Invalid email: '{0}'")]
    InvalidEmail(String),
}

// ============================================================================
// Email - lower-cased, syntactically valid address
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Lower-case and validate an email address.
    ///
    /// # Examples
    /// ```
    /// use auth_service::account::validation::Email;
    ///
    /// let email = Email::new("Neo@Matrix.IO").unwrap();
    /// assert_eq!(email.as_str(), "neo@matrix.io");
    ///
    /// assert!(Email::new("not-an-email").is_err());
    /// ```
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        let email = raw.trim().to_lowercase();
        if email.is_empty() {
            return Err(ValidationError::Missing("email"));
        }
        if email.len() > 255 {
            return Err(ValidationError::InvalidLength {
                field: "email",
                min: 3,
                max: 255,
                actual: email.len(),
            });
        }
        if !email.validate_email() {
            return Err(ValidationError::InvalidEmail(email));
        }
        Ok(Self(email))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Username
// ============================================================================

/// Non-empty username that fits the `VARCHAR(50)` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(raw: &str) -> Result<Self, ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::Missing("username"));
        }
        let len = raw.chars().count();
        if len > 50 {
            return Err(ValidationError::InvalidLength {
                field: "username",
                min: 1,
                max: 50,
                actual: len,
            });
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
