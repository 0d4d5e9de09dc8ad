//! Contact form request validation

use super::ApiError;
use crate::upstream::mailer::ContactMessage;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("invalid regex"));

/// Raw contact form body; every field may be absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
    pub turnstile_token: Option<String>,
}

/// A submission that passed local validation, along with its challenge token.
#[derive(Debug)]
pub struct ValidatedContact {
    pub message: ContactMessage,
    pub token: String,
}

impl ContactRequest {
    /// Checks run in a fixed order and stop at the first failure.
    pub fn validate(self) -> Result<ValidatedContact, ApiError> {
        let (Some(name), Some(email), Some(subject), Some(message)) = (
            non_empty(self.name),
            non_empty(self.email),
            non_empty(self.subject),
            non_empty(self.message),
        ) else {
            return Err(ApiError::BadRequest("All fields are required"));
        };

        if !EMAIL_REGEX.is_match(&email) {
            return Err(ApiError::BadRequest("Invalid email address"));
        }

        let Some(token) = non_empty(self.turnstile_token) else {
            return Err(ApiError::BadRequest("CAPTCHA verification required"));
        };

        Ok(ValidatedContact {
            message: ContactMessage {
                name,
                email,
                subject,
                message,
            },
            token,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
