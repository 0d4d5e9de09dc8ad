//! Clients for the third-party services behind the API
//!
//! Every outbound call goes through [`client::Client`], which classifies responses into
//! [`client::ApiResult`] so callers decide per call whether a failure is fatal.
//!
//! - [`github`]: contribution calendar (GraphQL) and project repository lookups (REST)
//! - [`turnstile`]: anti-bot token verification
//! - [`mailer`]: transactional email delivery for the contact form
//! - [`link_metadata`]: title/description/image extraction for link previews
//!
//! Project lookups fan out into independent sub-fetches whose outcomes are
//! [`FetchResult`]s, so a failed best-effort call only nulls its own field.

pub mod client;
mod fetch_result;
pub mod github;
pub mod link_metadata;
pub mod mailer;
mod repo_spec;
pub mod turnstile;

pub use fetch_result::{FetchResult, merge3};
pub use repo_spec::RepoSpec;
