#![doc(hidden)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core library for portfolio-api
//!
//! This library holds everything behind the portfolio site's server-side API: the GitHub
//! contribution aggregator, the project README proxy, the contact form relay and a few
//! small supporting routes.
//!
//! # Module Organization
//!
//! - [`commands`]: Command-line interface and orchestration
//! - [`upstream`]: Clients for the third-party services the API talks to
//! - [`server`]: HTTP router, shared state and route handlers

pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

pub mod commands;
pub mod server;
pub mod upstream;

pub use crate::commands::{Host, run};
