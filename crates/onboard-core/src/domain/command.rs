use serde::{Deserialize, Serialize};
use std::fmt;

use crate::CoreError;

/// Source tag used when the caller does not name one
pub const DEFAULT_SOURCE: &str = "web";

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 8;

fn default_source() -> String {
    DEFAULT_SOURCE.to_string()
}

/// Input to a provisioning run
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupCommand {
    /// Account email
    pub email: String,

    /// Credential material, handed to the signup handler untouched
    pub password: String,

    /// Origin of the signup (web, cli, partner, ...)
    #[serde(default = "default_source")]
    pub source: String,
}

impl SignupCommand {
    /// Create a command
    pub fn new(email: impl Into<String>, password: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            source: source.into(),
        }
    }

    /// Reject malformed commands before they reach the orchestrator
    pub fn validate(&self) -> Result<(), CoreError> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err(CoreError::ValidationError("email is required".to_string()));
        }

        let mut parts = email.split('@');
        let local = parts.next().unwrap_or_default();
        let domain = parts.next().unwrap_or_default();
        if local.is_empty() || domain.is_empty() || parts.next().is_some() || email.contains(char::is_whitespace) {
            return Err(CoreError::ValidationError(format!("invalid email address: {}", email)));
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(CoreError::ValidationError(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.source.trim().is_empty() {
            return Err(CoreError::ValidationError("source must not be empty".to_string()));
        }

        Ok(())
    }
}

impl fmt::Debug for SignupCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}
