//! Cloudflare Turnstile token verification

use crate::Result;
use crate::upstream::client::Client;
use core::time::Duration;
use ohno::IntoAppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const LOG_TARGET: &str = " turnstile";

/// Cloudflare's published test secret; every token verifies successfully against it.
pub const ALWAYS_PASS_SECRET: &str = "1x0000000000000000000000000000000AA";

#[derive(Debug, Serialize)]
struct SiteVerifyRequest<'a> {
    secret: &'a str,
    response: &'a str,
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,

    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

/// Checks client-supplied challenge tokens against the siteverify endpoint.
#[derive(Debug, Clone)]
pub struct Verifier {
    client: Client,
    secret: Arc<str>,
}

impl Verifier {
    pub fn new(verify_url: &str, secret: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::new(None, verify_url, timeout)?,
            secret: Arc::from(secret),
        })
    }

    /// Returns whether the token was accepted.
    ///
    /// A rejected token is `Ok(false)`; an unreachable or misbehaving service is an error.
    pub async fn verify(&self, token: &str) -> Result<bool> {
        let request = SiteVerifyRequest {
            secret: &self.secret,
            response: token,
        };

        let resp = self
            .client
            .post_form(self.client.base_url().clone(), &request)
            .await
            .into_result("verifying CAPTCHA token")?;

        let outcome: SiteVerifyResponse = resp.json().await.into_app_err("parsing CAPTCHA verification response")?;

        if !outcome.success {
            log::info!(target: LOG_TARGET, "CAPTCHA token rejected: {}", outcome.error_codes.join(", "));
        }

        Ok(outcome.success)
    }
}
