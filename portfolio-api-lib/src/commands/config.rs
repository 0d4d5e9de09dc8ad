use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use url::Url;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "portfolio.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// GitHub account whose contributions are reported
    #[serde(default = "default_github_user")]
    pub github_user: String,

    /// Base URL of the GitHub REST API
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    /// GitHub GraphQL endpoint
    #[serde(default = "default_github_graphql_url")]
    pub github_graphql_url: String,

    /// Turnstile siteverify endpoint
    #[serde(default = "default_turnstile_verify_url")]
    pub turnstile_verify_url: String,

    /// Base URL of the Resend API
    #[serde(default = "default_resend_api_url")]
    pub resend_api_url: String,

    /// Sender shown on contact form emails
    #[serde(default = "default_contact_from")]
    pub contact_from: String,

    /// Recipients of contact form emails
    #[serde(default = "default_contact_to")]
    pub contact_to: Vec<String>,

    /// Public address of the site
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Timeout applied to every outbound request
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Client cache lifetime advertised on project repository responses
    #[serde(default = "default_repo_cache_max_age", with = "humantime_serde")]
    pub repo_cache_max_age: Duration,
}

fn default_github_user() -> String {
    "devrohit06".into()
}

fn default_github_api_url() -> String {
    "https://api.github.com".into()
}

fn default_github_graphql_url() -> String {
    "https://api.github.com/graphql".into()
}

fn default_turnstile_verify_url() -> String {
    "https://challenges.cloudflare.com/turnstile/v0/siteverify".into()
}

fn default_resend_api_url() -> String {
    "https://api.resend.com".into()
}

fn default_contact_from() -> String {
    "Contact Form <portfolio@rohitk06.in>".into()
}

fn default_contact_to() -> Vec<String> {
    vec!["rohitk290106@gmail.com".into()]
}

fn default_site_url() -> String {
    "https://rohitk06.in".into()
}

const fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

const fn default_repo_cache_max_age() -> Duration {
    Duration::from_secs(60 * 60)
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `portfolio.toml` in `dir` is used if it exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = dir.join(DEFAULT_CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Save the default configuration to a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written
    pub fn save_default(output_path: &Utf8Path) -> Result<()> {
        fs::write(output_path, DEFAULT_CONFIG_TOML).into_app_err_with(|| format!("writing default configuration to {output_path}"))?;
        Ok(())
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is empty, zero, or not an http(s) URL where one is expected
    pub fn validate(&self) -> Result<()> {
        if self.github_user.trim().is_empty() {
            return Err(app_err!("github_user must not be empty"));
        }

        for (name, value) in [
            ("github_api_url", &self.github_api_url),
            ("github_graphql_url", &self.github_graphql_url),
            ("turnstile_verify_url", &self.turnstile_verify_url),
            ("resend_api_url", &self.resend_api_url),
            ("site_url", &self.site_url),
        ] {
            let url = Url::parse(value).into_app_err_with(|| format!("{name} is not a valid URL: '{value}'"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(app_err!("{name} must be an http or https URL, got '{value}'"));
            }
        }

        if self.contact_from.trim().is_empty() {
            return Err(app_err!("contact_from must not be empty"));
        }

        if self.contact_to.is_empty() {
            return Err(app_err!("contact_to must list at least one recipient"));
        }

        if let Some(blank) = self.contact_to.iter().position(|r| r.trim().is_empty()) {
            return Err(app_err!("contact_to entry {blank} is empty"));
        }

        if self.request_timeout.is_zero() {
            return Err(app_err!("request_timeout must be greater than zero"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
