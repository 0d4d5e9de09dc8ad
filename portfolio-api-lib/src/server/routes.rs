use super::contact::ContactRequest;
use super::{ApiError, AppState};
use crate::upstream::RepoSpec;
use crate::upstream::github::{ContributionSummary, ProjectRepo, normalize};
use crate::upstream::link_metadata::LinkMetadata;
use axum::Json;
use axum::body::Bytes;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::Uri;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use url::Url;

const LOG_TARGET: &str = "    routes";

const PROJECT_REPO_PREFIX: &str = "/api/project-repo";

const GITHUB_FAILURE: &str = "Failed to fetch GitHub data";
const REPO_FAILURE: &str = "Failed to fetch repository data";
const REPO_PARAMS_REQUIRED: &str = "Owner and repo parameters required";
const LINK_URL_REQUIRED: &str = "A valid url query parameter is required";

pub async fn github_contributions(State(state): State<Arc<AppState>>) -> Result<Json<ContributionSummary>, ApiError> {
    let data = state.github.fetch_contributions(Utc::now()).await.map_err(|e| {
        log::error!(target: LOG_TARGET, "Error fetching GitHub contributions: {e:#}");
        ApiError::UpstreamUnavailable(GITHUB_FAILURE)
    })?;

    let summary = normalize(data).map_err(|e| {
        log::error!(target: LOG_TARGET, "Unusable GitHub contributions response: {e:#}");
        ApiError::MalformedUpstream(GITHUB_FAILURE)
    })?;

    Ok(Json(summary))
}

pub async fn project_repo(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path((owner, repo)) = path.map_err(|e| {
        log::debug!(target: LOG_TARGET, "Rejected project path: {e}");
        ApiError::BadRequest(REPO_PARAMS_REQUIRED)
    })?;

    let spec = RepoSpec::new(&owner, &repo).map_err(|e| {
        log::debug!(target: LOG_TARGET, "Rejected project lookup: {e}");
        ApiError::BadRequest(REPO_PARAMS_REQUIRED)
    })?;

    let project: ProjectRepo = state.github.get_project_repo(&spec).await.map_err(|e| {
        log::error!(target: LOG_TARGET, "Error fetching repository data for '{spec}': {e:#}");
        ApiError::UpstreamUnavailable(REPO_FAILURE)
    })?;

    Ok(([(CACHE_CONTROL, state.repo_cache_control.clone())], Json(project)).into_response())
}

pub async fn contact(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let request: ContactRequest = serde_json::from_slice(&body).map_err(|e| {
        log::error!(target: LOG_TARGET, "Contact form error: unreadable body: {e}");
        ApiError::Internal
    })?;

    let validated = request.validate()?;

    let accepted = state.verifier.verify(&validated.token).await.map_err(|e| {
        log::error!(target: LOG_TARGET, "Contact form error: {e:#}");
        ApiError::Internal
    })?;

    if !accepted {
        return Err(ApiError::VerificationFailed);
    }

    let _id = state.mailer.send(&validated.message).await.map_err(|e| {
        log::error!(target: LOG_TARGET, "Email send error: {e:#}");
        ApiError::SendFailed
    })?;

    Ok(Json(json!({ "success": true, "message": "Message sent successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct LinkMetadataQuery {
    url: Option<String>,
}

pub async fn link_metadata(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LinkMetadataQuery>, QueryRejection>,
) -> Result<Json<LinkMetadata>, ApiError> {
    let Query(query) = query.map_err(|e| {
        log::debug!(target: LOG_TARGET, "Rejected link metadata query: {e}");
        ApiError::BadRequest(LINK_URL_REQUIRED)
    })?;

    let url = query
        .url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
        .ok_or(ApiError::BadRequest(LINK_URL_REQUIRED))?;

    state.links.check_target(&url).await.map_err(|e| {
        log::warn!(target: LOG_TARGET, "Refusing link metadata target: {e:#}");
        ApiError::BadRequest(LINK_URL_REQUIRED)
    })?;

    let metadata = state.links.fetch(&url).await.map_err(|e| {
        log::error!(target: LOG_TARGET, "Error fetching link metadata: {e:#}");
        ApiError::UpstreamUnavailable("Something went wrong")
    })?;

    Ok(Json(metadata))
}

pub async fn robots(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let body = format!(
        "User-agent: *\nAllow: /\n\n# Crawl-delay for polite crawling\nCrawl-delay: 10\n\nSitemap: {}/sitemap.xml\n",
        state.site_url
    );

    (
        [(CONTENT_TYPE, "text/plain; charset=utf-8"), (CACHE_CONTROL, "public, max-age=3600")],
        body,
    )
}

/// Anything under the project prefix that is not exactly `owner/repo` is a bad request rather than a miss.
pub async fn fallback(uri: Uri) -> ApiError {
    let path = uri.path();
    if path == PROJECT_REPO_PREFIX || path.starts_with(&format!("{PROJECT_REPO_PREFIX}/")) {
        return ApiError::BadRequest(REPO_PARAMS_REQUIRED);
    }

    ApiError::NotFound
}
