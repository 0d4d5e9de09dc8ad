use super::contributions::DateWindow;
use super::graphql::{self, ContributionsData};
use super::project_repo::ProjectRepo;
use crate::Result;
use crate::upstream::client::{ApiResult, Client};
use crate::upstream::fetch_result::{FetchResult, merge3};
use crate::upstream::repo_spec::RepoSpec;
use chrono::{DateTime, Utc};
use core::time::Duration;
use futures_util::future::join3;
use ohno::{EnrichableExt, IntoAppError};
use serde_json::{Map, Value};
use std::sync::Arc;

const LOG_TARGET: &str = "    github";

const ACCEPT_JSON: &str = "application/vnd.github.v3+json";
const ACCEPT_RAW: &str = "application/vnd.github.v3.raw";

/// Access to the GitHub REST and GraphQL APIs on behalf of the site owner.
#[derive(Debug, Clone)]
pub struct Provider {
    rest: Client,
    graphql: Client,
    user: Arc<str>,
}

impl Provider {
    pub fn new(token: Option<&str>, rest_url: &str, graphql_url: &str, user: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            rest: Client::new(token, rest_url, timeout)?,
            graphql: Client::new(token, graphql_url, timeout)?,
            user: Arc::from(user),
        })
    }

    /// The account whose contributions are reported.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Fetch the raw contribution calendar for the year leading up to `now`.
    ///
    /// Pass the result through [`normalize`](super::normalize) before handing it out.
    pub async fn fetch_contributions(&self, now: DateTime<Utc>) -> Result<ContributionsData> {
        let window = DateWindow::last_year(now)?;

        graphql::fetch_contributions(&self.graphql, &self.user, window)
            .await
            .map_err(|e| e.enrich_with(|| format!("fetching contributions for '{}'", self.user)))
    }

    /// Fetch repository metadata, README and language breakdown concurrently.
    ///
    /// Only the metadata is required; README and languages degrade to `None`.
    pub async fn get_project_repo(&self, spec: &RepoSpec) -> Result<ProjectRepo, Arc<ohno::AppError>> {
        let (info, readme, languages) = join3(self.fetch_repo_info(spec), self.fetch_readme(spec), self.fetch_languages(spec)).await;

        let info = FetchResult::mandatory(info.map_err(|e| e.enrich_with(|| format!("fetching repository info for '{spec}'"))));
        let readme = FetchResult::best_effort(readme.inspect_err(|e| {
            log::warn!(target: LOG_TARGET, "README fetch failed for '{spec}': {e:#}");
        }));
        let languages = FetchResult::best_effort(languages.inspect_err(|e| {
            log::warn!(target: LOG_TARGET, "Languages fetch failed for '{spec}': {e:#}");
        }));

        let (repo_info, readme_content, languages) = merge3(info, readme, languages)?;

        Ok(ProjectRepo {
            repo_info,
            readme_content,
            languages,
        })
    }

    async fn fetch_repo_info(&self, spec: &RepoSpec) -> Result<Value> {
        let url = self.rest.url_for(["repos", spec.owner(), spec.repo()])?;
        let resp = self.rest.get(url, ACCEPT_JSON).await.into_result("fetching repository info")?;
        resp.json().await.into_app_err("parsing repository info")
    }

    async fn fetch_readme(&self, spec: &RepoSpec) -> Result<Option<String>> {
        let url = self.rest.url_for(["repos", spec.owner(), spec.repo(), "readme"])?;
        match self.rest.get(url, ACCEPT_RAW).await {
            ApiResult::Success(resp) => Ok(Some(resp.text().await.into_app_err("reading README body")?)),
            ApiResult::NotFound | ApiResult::RateLimited(_) => Ok(None),
            ApiResult::Failed(e) => Err(e),
        }
    }

    async fn fetch_languages(&self, spec: &RepoSpec) -> Result<Option<Map<String, Value>>> {
        let url = self.rest.url_for(["repos", spec.owner(), spec.repo(), "languages"])?;
        match self.rest.get(url, ACCEPT_JSON).await {
            ApiResult::Success(resp) => Ok(Some(resp.json().await.into_app_err("parsing languages")?)),
            ApiResult::NotFound | ApiResult::RateLimited(_) => Ok(None),
            ApiResult::Failed(e) => Err(e),
        }
    }
}
