use super::Host;
use super::common::{ConfigArgs, LogLevel, init_logging};
use super::config::Config;
use crate::Result;
use crate::server::{self, AppConfig, AppState};
use camino::Utf8PathBuf;
use clap::Parser;
use core::net::SocketAddr;
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "     serve";

#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Address to listen on
    #[arg(long, value_name = "ADDR", env = "PORTFOLIO_ADDRESS", default_value = "0.0.0.0:4321")]
    pub address: SocketAddr,

    /// GitHub personal access token
    #[arg(long, value_name = "TOKEN", env = "GITHUB_ACCESS_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Resend API key used to deliver contact form emails
    #[arg(long, value_name = "KEY", env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    /// Cloudflare Turnstile secret key, only used in production mode
    #[arg(long, value_name = "SECRET", env = "TURNSTILE_SECRET_KEY", hide_env_values = true)]
    pub turnstile_secret: Option<String>,

    /// Verify CAPTCHA tokens with the real secret instead of the test one
    #[arg(long, env = "PORTFOLIO_PRODUCTION")]
    pub production: bool,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

impl ServeArgs {
    /// Merge file settings with command-line secrets.
    #[must_use]
    pub fn app_config(&self, config: Config) -> AppConfig {
        AppConfig {
            github_user: config.github_user,
            github_api_url: config.github_api_url,
            github_graphql_url: config.github_graphql_url,
            github_token: non_empty(self.github_token.as_ref()),
            turnstile_verify_url: config.turnstile_verify_url,
            turnstile_secret: non_empty(self.turnstile_secret.as_ref()),
            resend_api_url: config.resend_api_url,
            resend_api_key: non_empty(self.resend_api_key.as_ref()),
            contact_from: config.contact_from,
            contact_to: config.contact_to,
            site_url: config.site_url,
            request_timeout: config.request_timeout,
            repo_cache_max_age: config.repo_cache_max_age,
            production: self.production,
            allow_private_link_targets: false,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

pub async fn serve<H: Host>(host: &mut H, args: &ServeArgs) -> Result<()> {
    init_logging(args.log_level);

    let config = Config::load(&Utf8PathBuf::from("."), args.config.config.as_ref())?;
    log::debug!(target: LOG_TARGET, "Serving contributions for '{}'", config.github_user);

    let state = Arc::new(AppState::new(&args.app_config(config))?);

    let _ = writeln!(host.output(), "Portfolio API listening on {}", args.address);
    server::serve(state, args.address).await
}
