//! Link preview metadata
//!
//! Fetches an HTML page and pulls the title, description, preview image and site name out of
//! its `<title>` element and `og:*` / `twitter:*` / `description` meta tags.

use crate::Result;
use core::net::IpAddr;
use core::time::Duration;
use futures_util::StreamExt;
use ohno::{IntoAppError, bail};
use regex::Regex;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::redirect::Policy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;
use url::{Host, Url};

const LOG_TARGET: &str = "      link";

/// Only the start of a page is read; metadata lives in `<head>`.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

const MAX_REDIRECTS: usize = 5;

static TITLE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("invalid regex"));
static META_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<meta\s[^>]*>").expect("invalid regex"));
static ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)([a-z][a-z0-9:_-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("invalid regex"));

/// Preview data for one URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMetadata {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub site_name: Option<String>,
}

/// Fetches pages and extracts their preview metadata.
///
/// Unless built with `allow_private`, every hop of a fetch must resolve to public addresses only.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    allow_private: bool,
}

impl Fetcher {
    pub fn new(timeout: Duration, allow_private: bool) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("portfolio-api/", env!("CARGO_PKG_VERSION"), " (link preview)"))
            .timeout(timeout)
            .redirect(Policy::none())
            .build()?;

        Ok(Self { client, allow_private })
    }

    /// Fail unless `url` is http(s) and its host resolves to public addresses only.
    pub async fn check_target(&self, url: &Url) -> Result<()> {
        if !matches!(url.scheme(), "http" | "https") {
            bail!("'{url}' is not an http or https URL");
        }

        if self.allow_private {
            return Ok(());
        }

        for ip in resolve(url).await? {
            if !is_public(ip) {
                bail!("'{url}' resolves to non-public address {ip}");
            }
        }

        Ok(())
    }

    pub async fn fetch(&self, url: &Url) -> Result<LinkMetadata> {
        let mut current = url.clone();
        let mut redirects = 0;

        let resp = loop {
            self.check_target(&current).await?;

            let resp = self
                .client
                .get(current.clone())
                .header(ACCEPT, "text/html,application/xhtml+xml")
                .send()
                .await
                .into_app_err_with(|| format!("fetching '{current}'"))?;

            if !resp.status().is_redirection() {
                break resp;
            }

            redirects += 1;
            if redirects > MAX_REDIRECTS {
                bail!("fetching '{url}' took more than {MAX_REDIRECTS} redirects");
            }

            let Some(location) = resp.headers().get(LOCATION).and_then(|v| v.to_str().ok()) else {
                bail!("redirect from '{current}' has no usable location");
            };

            let next = current
                .join(location)
                .into_app_err_with(|| format!("resolving redirect from '{current}' to '{location}'"))?;
            log::debug!(target: LOG_TARGET, "'{current}' redirects to '{next}'");
            current = next;
        };

        let status = resp.status();
        if !status.is_success() {
            bail!("fetching '{current}' returned HTTP {status}");
        }

        let is_html = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_none_or(|v| v.contains("html"));

        if !is_html {
            log::debug!(target: LOG_TARGET, "'{current}' is not an HTML page, returning bare metadata");
            return Ok(LinkMetadata {
                url: url.to_string(),
                ..LinkMetadata::default()
            });
        }

        let body = read_capped(resp, MAX_BODY_BYTES).await?;

        // Relative image paths resolve against the page that was finally served
        let mut metadata = extract(&body, &current);
        metadata.url = url.to_string();
        Ok(metadata)
    }
}

async fn resolve(url: &Url) -> Result<Vec<IpAddr>> {
    let port = url.port_or_known_default().unwrap_or(80);

    match url.host() {
        Some(Host::Ipv4(ip)) => Ok(vec![IpAddr::V4(ip)]),
        Some(Host::Ipv6(ip)) => Ok(vec![IpAddr::V6(ip)]),
        Some(Host::Domain(domain)) => {
            let addrs: Vec<IpAddr> = tokio::net::lookup_host((domain, port))
                .await
                .into_app_err_with(|| format!("resolving '{domain}'"))?
                .map(|addr| addr.ip())
                .collect();

            if addrs.is_empty() {
                bail!("'{domain}' did not resolve to any address");
            }

            Ok(addrs)
        }
        None => bail!("'{url}' has no host"),
    }
}

/// Whether `ip` is routable on the public internet.
fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [first, second, ..] = v4.octets();
            let this_network = first == 0;
            let shared = first == 100 && (second & 0xc0) == 64;

            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation()
                || this_network
                || shared)
        }
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_public(IpAddr::V4(v4)),
            None => !(v6.is_loopback() || v6.is_unspecified() || v6.is_unique_local() || v6.is_unicast_link_local()),
        },
    }
}

/// Read at most `limit` bytes of the body; the rest is never downloaded.
async fn read_capped(resp: reqwest::Response, limit: usize) -> Result<String> {
    if resp.content_length().is_some_and(|len| len > limit as u64) {
        log::debug!(target: LOG_TARGET, "'{}' is larger than {limit} bytes, reading only the start", resp.url());
    }

    let mut body = Vec::new();
    let mut stream = resp.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.into_app_err("reading page body")?;
        let room = limit - body.len();

        if chunk.len() >= room {
            body.extend_from_slice(chunk.get(..room).unwrap_or_default());
            break;
        }

        body.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Extract preview metadata from an HTML document.
#[must_use]
pub fn extract(html: &str, base: &Url) -> LinkMetadata {
    let meta = meta_tags(html);
    let pick = |keys: &[&str]| keys.iter().filter_map(|k| meta.get(*k)).find(|v| !v.is_empty()).cloned();

    let title = pick(&["og:title", "twitter:title"]).or_else(|| {
        TITLE_REGEX
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| decode_entities(m.as_str().trim()))
            .filter(|t| !t.is_empty())
    });

    let image = pick(&["og:image", "og:image:url", "twitter:image", "twitter:image:src"])
        .map(|src| base.join(&src).map_or(src, |resolved| resolved.to_string()));

    LinkMetadata {
        url: base.to_string(),
        title,
        description: pick(&["og:description", "twitter:description", "description"]),
        image,
        site_name: pick(&["og:site_name", "application-name"]),
    }
}

/// Map of lower-cased `property`/`name` attribute to decoded `content`, first occurrence wins.
fn meta_tags(html: &str) -> HashMap<String, String> {
    let mut tags = HashMap::new();

    for tag in META_REGEX.find_iter(html) {
        let mut key = None;
        let mut content = None;

        for attr in ATTR_REGEX.captures_iter(tag.as_str()) {
            let name = attr.get(1).map_or("", |m| m.as_str()).to_ascii_lowercase();
            let value = attr.get(2).or_else(|| attr.get(3)).map_or("", |m| m.as_str());

            match name.as_str() {
                "property" | "name" if key.is_none() => key = Some(value.trim().to_ascii_lowercase()),
                "content" => content = Some(decode_entities(value.trim())),
                _ => {}
            }
        }

        if let (Some(key), Some(content)) = (key, content) {
            let _ = tags.entry(key).or_insert(content);
        }
    }

    tags
}

fn decode_entities(s: &str) -> String {
    s.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
