//! HTTP client shared by every upstream integration
//!
//! Thin wrapper over [`reqwest::Client`] that carries a base URL, optional bearer
//! authentication and a request timeout, and classifies responses into [`ApiResult`].

use crate::Result;
use chrono::{DateTime, Utc};
use core::time::Duration;
use ohno::IntoAppError;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use url::Url;

const USER_AGENT: &str = concat!("portfolio-api/", env!("CARGO_PKG_VERSION"));

/// Rate limit information from response headers
#[derive(Debug, Clone, Copy)]
pub struct RateLimitInfo {
    pub remaining: usize,
    pub reset_at: DateTime<Utc>,
}

/// Result of an upstream API call
#[derive(Debug)]
pub enum ApiResult<T> {
    /// Request succeeded
    Success(T),

    /// The requested resource was not found (404)
    NotFound,

    /// The upstream refused the request because a rate limit was hit
    RateLimited(Option<RateLimitInfo>),

    /// Request failed (transport error or any other non-2xx status)
    Failed(ohno::AppError),
}

impl<T> ApiResult<T> {
    /// Collapse the classification into a plain result, treating every non-success as an error.
    pub fn into_result(self, what: &str) -> Result<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::NotFound => Err(ohno::app_err!("{what}: not found")),
            Self::RateLimited(Some(info)) => Err(ohno::app_err!(
                "{what}: rate limited ({} remaining, resets at {})",
                info.remaining,
                info.reset_at
            )),
            Self::RateLimited(None) => Err(ohno::app_err!("{what}: rate limited")),
            Self::Failed(e) => Err(e),
        }
    }
}

/// Upstream API client
#[derive(Debug, Clone)]
#[expect(clippy::struct_field_names, reason = "client field stores the underlying HTTP client")]
pub struct Client {
    client: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Create a new client with an optional bearer token
    pub fn new(token: Option<&str>, base_url: &str, timeout: Duration) -> Result<Self> {
        let mut client_builder = reqwest::Client::builder().user_agent(USER_AGENT).timeout(timeout);

        if let Some(t) = token.filter(|t| !t.is_empty()) {
            let mut auth_val = HeaderValue::from_str(&format!("Bearer {t}"))?;
            auth_val.set_sensitive(true);

            let mut headers = HeaderMap::new();
            let _ = headers.insert(AUTHORIZATION, auth_val);

            client_builder = client_builder.default_headers(headers);
        }

        let base_url = Url::parse(base_url).into_app_err_with(|| format!("parsing upstream URL '{base_url}'"))?;

        Ok(Self {
            client: client_builder.build()?,
            base_url,
        })
    }

    /// Get the base URL for this client
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build a URL by appending percent-encoded path segments to the base URL
    pub fn url_for<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ohno::app_err!("upstream URL '{}' cannot carry a path", self.base_url))?;
            let _ = path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Issue a GET request with the given `Accept` header and classify the result
    pub async fn get(&self, url: Url, accept: &'static str) -> ApiResult<reqwest::Response> {
        let request = self.client.get(url).header(ACCEPT, accept);
        classify(request.send().await).await
    }

    /// Issue a POST request with a JSON body and classify the result
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> ApiResult<reqwest::Response> {
        let request = self.client.post(url).header(ACCEPT, "application/json").json(body);
        classify(request.send().await).await
    }

    /// Issue a POST request with a form-encoded body and classify the result
    pub async fn post_form<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> ApiResult<reqwest::Response> {
        let request = self.client.post(url).header(ACCEPT, "application/json").form(body);
        classify(request.send().await).await
    }
}

async fn classify(sent: reqwest::Result<reqwest::Response>) -> ApiResult<reqwest::Response> {
    let resp = match sent {
        Ok(r) => r,
        Err(e) => return ApiResult::Failed(e.into()),
    };

    let status = resp.status();
    if status.is_success() {
        return ApiResult::Success(resp);
    }

    let status_code = status.as_u16();
    if status_code == 404 {
        return ApiResult::NotFound;
    }

    // GitHub signals exhausted quotas with 403 and a zero remaining count, or with 429
    let rate_limit = extract_rate_limit_from_headers(resp.headers());
    if status_code == 429 || (status_code == 403 && rate_limit.is_some_and(|info| info.remaining == 0)) {
        return ApiResult::RateLimited(rate_limit);
    }

    let body = resp.text().await.unwrap_or_default();
    ApiResult::Failed(ohno::app_err!("upstream returned HTTP {status}: {}", truncate(&body, 200)))
}

fn truncate(s: &str, max_chars: usize) -> &str {
    s.char_indices().nth(max_chars).and_then(|(idx, _)| s.get(..idx)).unwrap_or(s)
}

/// Extract rate limit information from API response headers
fn extract_rate_limit_from_headers(headers: &HeaderMap) -> Option<RateLimitInfo> {
    let remaining = headers.get("x-ratelimit-remaining")?.to_str().ok()?.parse::<usize>().ok()?;

    let reset_timestamp = headers.get("x-ratelimit-reset")?.to_str().ok()?.parse::<i64>().ok()?;

    let reset_at = DateTime::from_timestamp(reset_timestamp, 0)?;

    Some(RateLimitInfo { remaining, reset_at })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> Client {
        Client::new(None, base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_extract_rate_limit_from_headers() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4999"));
        let _ = headers.insert("x-ratelimit-reset", HeaderValue::from_static("1704067200"));

        let rate_limit = extract_rate_limit_from_headers(&headers).unwrap();

        assert_eq!(rate_limit.remaining, 4999);
        assert_eq!(rate_limit.reset_at.timestamp(), 1_704_067_200);
    }

    #[test]
    fn test_extract_rate_limit_missing_headers() {
        let headers = HeaderMap::new();
        assert!(extract_rate_limit_from_headers(&headers).is_none());
    }

    #[test]
    fn test_extract_rate_limit_invalid_remaining() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-ratelimit-remaining", HeaderValue::from_static("invalid"));
        let _ = headers.insert("x-ratelimit-reset", HeaderValue::from_static("1704067200"));

        assert!(extract_rate_limit_from_headers(&headers).is_none());
    }

    #[test]
    fn test_client_new_with_token() {
        let client = Client::new(Some("test_token"), "https://api.github.com", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.github.com/");
    }

    #[test]
    fn test_client_new_rejects_bad_url() {
        assert!(Client::new(None, "not a url", Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_url_for_appends_segments() {
        let url = client("https://api.github.com").url_for(["repos", "devrohit06", "lito"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/devrohit06/lito");
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let url = client("http://127.0.0.1:9000/api/v3").url_for(["repos", "a", "b", "readme"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/api/v3/repos/a/b/readme");
    }

    #[test]
    fn test_url_for_encodes_segments() {
        let url = client("https://api.github.com").url_for(["repos", "a b", "c?d"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/repos/a%20b/c%3Fd");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("hi", 3), "hi");
        assert_eq!(truncate("héllo", 2), "hé");
    }

    #[test]
    fn test_into_result_not_found() {
        let result: ApiResult<()> = ApiResult::NotFound;
        let err = result.into_result("fetching thing").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
