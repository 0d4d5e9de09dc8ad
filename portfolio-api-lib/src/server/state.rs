use crate::Result;
use crate::upstream::github::Provider;
use crate::upstream::link_metadata::Fetcher;
use crate::upstream::mailer::Mailer;
use crate::upstream::turnstile::{ALWAYS_PASS_SECRET, Verifier};
use axum::http::HeaderValue;
use core::time::Duration;
use ohno::{IntoAppError, bail};

const LOG_TARGET: &str = "     state";

/// Everything the server needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_user: String,
    pub github_api_url: String,
    pub github_graphql_url: String,
    pub github_token: Option<String>,
    pub turnstile_verify_url: String,
    pub turnstile_secret: Option<String>,
    pub resend_api_url: String,
    pub resend_api_key: Option<String>,
    pub contact_from: String,
    pub contact_to: Vec<String>,
    pub site_url: String,
    pub request_timeout: Duration,
    pub repo_cache_max_age: Duration,

    /// Outside production the anti-bot check runs against the always-pass test secret.
    pub production: bool,

    /// Let link previews reach loopback and private-network hosts.
    pub allow_private_link_targets: bool,
}

/// Shared, immutable state handed to every handler.
#[derive(Debug)]
pub struct AppState {
    pub github: Provider,
    pub verifier: Verifier,
    pub mailer: Mailer,
    pub links: Fetcher,
    pub site_url: String,
    pub repo_cache_control: HeaderValue,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let turnstile_secret = if config.production {
            match config.turnstile_secret.as_deref().filter(|s| !s.is_empty()) {
                Some(secret) => secret,
                None => bail!("a Turnstile secret key is required in production mode"),
            }
        } else {
            log::info!(target: LOG_TARGET, "Not in production mode, CAPTCHA tokens are checked against the test secret");
            ALWAYS_PASS_SECRET
        };

        if config.github_token.is_none() {
            log::warn!(target: LOG_TARGET, "No GitHub token configured, contribution requests will fail");
        }

        if config.resend_api_key.is_none() {
            log::warn!(target: LOG_TARGET, "No email API key configured, contact form submissions will fail");
        }

        let repo_cache_control = HeaderValue::from_str(&format!("public, max-age={}", config.repo_cache_max_age.as_secs()))
            .into_app_err("building cache-control header")?;

        Ok(Self {
            github: Provider::new(
                config.github_token.as_deref(),
                &config.github_api_url,
                &config.github_graphql_url,
                &config.github_user,
                config.request_timeout,
            )?,
            verifier: Verifier::new(&config.turnstile_verify_url, turnstile_secret, config.request_timeout)?,
            mailer: Mailer::new(
                &config.resend_api_url,
                config.resend_api_key.as_deref(),
                &config.contact_from,
                &config.contact_to,
                config.request_timeout,
            )?,
            links: Fetcher::new(config.request_timeout, config.allow_private_link_targets)?,
            site_url: config.site_url.trim_end_matches('/').to_string(),
            repo_cache_control,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            github_user: "devrohit06".into(),
            github_api_url: "https://api.github.com".into(),
            github_graphql_url: "https://api.github.com/graphql".into(),
            github_token: Some("token".into()),
            turnstile_verify_url: "https://challenges.cloudflare.com/turnstile/v0/siteverify".into(),
            turnstile_secret: None,
            resend_api_url: "https://api.resend.com".into(),
            resend_api_key: Some("key".into()),
            contact_from: "Contact Form <portfolio@example.com>".into(),
            contact_to: vec!["owner@example.com".into()],
            site_url: "https://example.com/".into(),
            request_timeout: Duration::from_secs(5),
            repo_cache_max_age: Duration::from_secs(3600),
            production: false,
            allow_private_link_targets: false,
        }
    }

    #[test]
    fn test_new_development() {
        let state = AppState::new(&config()).unwrap();
        assert_eq!(state.site_url, "https://example.com");
        assert_eq!(state.repo_cache_control, "public, max-age=3600");
        assert_eq!(state.github.user(), "devrohit06");
    }

    #[test]
    fn test_production_requires_turnstile_secret() {
        let cfg = AppConfig {
            production: true,
            ..config()
        };
        let _ = AppState::new(&cfg).unwrap_err();

        let cfg = AppConfig {
            production: true,
            turnstile_secret: Some("secret".into()),
            ..config()
        };
        let _ = AppState::new(&cfg).unwrap();
    }

    #[test]
    fn test_bad_upstream_url() {
        let cfg = AppConfig {
            github_api_url: "not a url".into(),
            ..config()
        };
        let _ = AppState::new(&cfg).unwrap_err();
    }
}
