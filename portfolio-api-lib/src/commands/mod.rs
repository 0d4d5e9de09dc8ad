//! Command-line interface and orchestration for portfolio-api
//!
//! Three commands:
//!
//! - **serve**: load the configuration, merge in secrets from arguments or the environment,
//!   build the shared server state and run the HTTP API until shut down
//! - **init**: write the default configuration file
//! - **validate**: load a configuration file and report whether it is usable
//!
//! Non-secret settings live in a TOML file (`portfolio.toml` unless `--config` says
//! otherwise). Tokens and keys only ever come from the command line or environment.

mod common;
mod config;
mod host;
mod init;
mod run;
mod serve;
mod validate;

pub use common::{ConfigArgs, LogLevel};
pub use config::Config;
pub use host::Host;
pub use init::{InitArgs, init_config};
pub use run::run;
pub use serve::{ServeArgs, serve};
pub use validate::{ValidateArgs, validate_config};
