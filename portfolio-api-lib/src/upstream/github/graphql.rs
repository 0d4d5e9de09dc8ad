//! GitHub GraphQL query for the contribution calendar
//!
//! Issues a single query asking for the account's most recently pushed owned repository and its
//! contribution calendar over a [`DateWindow`].

use super::contributions::DateWindow;
use crate::Result;
use crate::upstream::client::Client;
use ohno::{IntoAppError, bail};
use serde::Deserialize;
use serde_json::json;

const LOG_TARGET: &str = "   graphql";

pub const CONTRIBUTIONS_QUERY: &str = r"
query ($userName: String!, $fromDate: DateTime!, $toDate: DateTime!) {
  user(login: $userName) {
    repositories(
      first: 1
      orderBy: { direction: DESC, field: PUSHED_AT }
      ownerAffiliations: [OWNER]
    ) {
      nodes {
        name
        pushedAt
      }
    }
    contributionsCollection(from: $fromDate, to: $toDate) {
      contributionCalendar {
        totalContributions
        weeks {
          contributionDays {
            contributionCount
            date
          }
        }
      }
    }
  }
}
";

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,

    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// Raw `data` member of the contributions query response.
#[derive(Debug, Deserialize)]
pub struct ContributionsData {
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub repositories: RepositoryConnection,
    pub contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize)]
pub struct RepositoryConnection {
    pub nodes: Vec<RepositoryNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryNode {
    pub name: String,

    /// `null` for repositories that were never pushed to.
    pub pushed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    pub total_contributions: u64,
    pub weeks: Vec<Week>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub contribution_days: Vec<Day>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub contribution_count: u32,
    pub date: String,
}

/// Run the contributions query against the GraphQL endpoint `client` points at.
pub async fn fetch_contributions(client: &Client, user_name: &str, window: DateWindow) -> Result<ContributionsData> {
    let (from_date, to_date) = window.to_iso_strings();

    let body = json!({
        "query": CONTRIBUTIONS_QUERY,
        "variables": {
            "userName": user_name,
            "fromDate": from_date,
            "toDate": to_date,
        },
    });

    log::debug!(target: LOG_TARGET, "Querying contributions for '{user_name}' from {from_date} to {to_date}");

    let resp = client
        .post_json(client.base_url().clone(), &body)
        .await
        .into_result("querying GitHub contributions")?;

    let parsed: GraphQlResponse<ContributionsData> = resp.json().await.into_app_err("parsing GitHub GraphQL response")?;

    if let Some(first) = parsed.errors.first() {
        bail!("GitHub GraphQL query failed: {} ({} error(s))", first.message, parsed.errors.len());
    }

    parsed.data.into_app_err("GitHub GraphQL response carried no data")
}
