//! Contribution calendar data and its normalization
//!
//! The upstream calendar is nested as weeks of days. The chart widget wants one flat,
//! chronologically ordered list with dates written as `YYYY/MM/DD`, plus the total count and
//! the timestamp of the most recent push.

use super::graphql::ContributionsData;
use crate::Result;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use ohno::bail;
use serde::Serialize;

/// Contributions made on a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributionDay {
    pub count: u32,

    /// Day in `YYYY/MM/DD` form.
    pub date: String,
}

/// Summary returned to the contribution chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionSummary {
    /// Push timestamp of the most recently pushed owned repository, as reported upstream.
    pub last_pushed_at: Option<String>,

    /// Total reported upstream; not re-derived from the per-day counts.
    pub total_contributions: u64,

    pub contributions: Vec<ContributionDay>,
}

/// Half-open query window `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    from: DateTime<Utc>,
    to: DateTime<Utc>,
}

impl DateWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Self> {
        if from >= to {
            bail!("invalid contribution window: {from} is not before {to}");
        }

        Ok(Self { from, to })
    }

    /// The year leading up to `now`.
    ///
    /// From 29 February the window starts on 1 March of the previous year, so it never spans
    /// more than 365 days.
    pub fn last_year(now: DateTime<Utc>) -> Result<Self> {
        let year = now.year() - 1;
        let from = now.with_year(year).or_else(|| {
            now.with_day(1)
                .and_then(|d| d.with_month(3))
                .and_then(|d| d.with_year(year))
        });

        let Some(from) = from else {
            bail!("cannot compute a one-year window ending at {now}");
        };

        Self::new(from, now)
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.from
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.to
    }

    /// Window bounds as `(from, to)` ISO-8601 strings with millisecond precision.
    #[must_use]
    pub fn to_iso_strings(&self) -> (String, String) {
        (
            self.from.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.to.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }
}

/// Rewrite an upstream `YYYY-MM-DD` date into the `YYYY/MM/DD` form the chart parses.
#[must_use]
pub fn reformat_date(date: &str) -> String {
    date.replace('-', "/")
}

/// Reshape the upstream payload into a [`ContributionSummary`].
///
/// Fails if the account owns no repositories, since there is then no push timestamp to report.
pub fn normalize(data: ContributionsData) -> Result<ContributionSummary> {
    let Some(user) = data.user else {
        bail!("upstream response has no user");
    };

    let Some(latest) = user.repositories.nodes.into_iter().next() else {
        bail!("account has no owned repositories");
    };

    let calendar = user.contributions_collection.contribution_calendar;

    let contributions = calendar
        .weeks
        .into_iter()
        .flat_map(|week| week.contribution_days)
        .map(|day| ContributionDay {
            count: day.contribution_count,
            date: reformat_date(&day.date),
        })
        .collect();

    Ok(ContributionSummary {
        last_pushed_at: latest.pushed_at,
        total_contributions: calendar.total_contributions,
        contributions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload(repos: &str, weeks: &str, total: u64) -> ContributionsData {
        let json = format!(
            r#"{{
                "user": {{
                    "repositories": {{ "nodes": {repos} }},
                    "contributionsCollection": {{
                        "contributionCalendar": {{
                            "totalContributions": {total},
                            "weeks": {weeks}
                        }}
                    }}
                }}
            }}"#
        );
        serde_json::from_str(&json).unwrap()
    }

    const TWO_WEEKS: &str = r#"[
        { "contributionDays": [
            { "contributionCount": 1, "date": "2024-03-03" },
            { "contributionCount": 0, "date": "2024-03-04" },
            { "contributionCount": 4, "date": "2024-03-05" }
        ] },
        { "contributionDays": [
            { "contributionCount": 2, "date": "2024-03-10" },
            { "contributionCount": 3, "date": "2024-03-11" }
        ] }
    ]"#;

    const ONE_REPO: &str = r#"[{ "name": "lito", "pushedAt": "2024-03-11T08:00:00Z" }]"#;

    #[test]
    fn test_reformat_date() {
        assert_eq!(reformat_date("2024-03-05"), "2024/03/05");
    }

    #[test]
    fn test_reformat_date_is_literal() {
        assert_eq!(reformat_date("2024/03/05"), "2024/03/05");
        assert_eq!(reformat_date("--"), "//");
        assert_eq!(reformat_date(""), "");
    }

    #[test]
    fn test_normalize_flattens_weeks_in_order() {
        let summary = normalize(payload(ONE_REPO, TWO_WEEKS, 10)).unwrap();

        let dates: Vec<_> = summary.contributions.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, ["2024/03/03", "2024/03/04", "2024/03/05", "2024/03/10", "2024/03/11"]);

        let counts: Vec<_> = summary.contributions.iter().map(|d| d.count).collect();
        assert_eq!(counts, [1, 0, 4, 2, 3]);
    }

    #[test]
    fn test_normalize_dates_non_decreasing() {
        let summary = normalize(payload(ONE_REPO, TWO_WEEKS, 10)).unwrap();
        assert!(summary.contributions.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_normalize_copies_totals_and_push_time() {
        let summary = normalize(payload(ONE_REPO, TWO_WEEKS, 10)).unwrap();
        assert_eq!(summary.total_contributions, 10);
        assert_eq!(summary.last_pushed_at.as_deref(), Some("2024-03-11T08:00:00Z"));
    }

    #[test]
    fn test_normalize_trusts_upstream_total() {
        let summary = normalize(payload(ONE_REPO, TWO_WEEKS, 999)).unwrap();
        assert_eq!(summary.total_contributions, 999);
    }

    #[test]
    fn test_normalize_no_repositories() {
        let err = normalize(payload("[]", TWO_WEEKS, 10)).unwrap_err();
        assert!(err.to_string().contains("no owned repositories"));
    }

    #[test]
    fn test_normalize_no_user() {
        let data: ContributionsData = serde_json::from_str(r#"{ "user": null }"#).unwrap();
        assert!(normalize(data).is_err());
    }

    #[test]
    fn test_normalize_empty_calendar() {
        let summary = normalize(payload(ONE_REPO, "[]", 0)).unwrap();
        assert!(summary.contributions.is_empty());
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = normalize(payload(ONE_REPO, TWO_WEEKS, 10)).unwrap();
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["lastPushedAt"], "2024-03-11T08:00:00Z");
        assert_eq!(json["totalContributions"], 10);
        assert_eq!(json["contributions"][2], serde_json::json!({ "count": 4, "date": "2024/03/05" }));
    }

    #[test]
    fn test_window_rejects_inverted_bounds() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert!(DateWindow::new(now, now).is_err());
        assert!(DateWindow::new(now, now - chrono::Duration::days(1)).is_err());
    }

    #[test]
    fn test_window_last_year() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 10, 11, 12).unwrap();
        let window = DateWindow::last_year(now).unwrap();

        assert_eq!(window.end(), now);
        assert_eq!(window.start(), Utc.with_ymd_and_hms(2023, 3, 5, 10, 11, 12).unwrap());
    }

    #[test]
    fn test_window_last_year_from_leap_day() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 6, 30, 0).unwrap();
        let window = DateWindow::last_year(now).unwrap();

        assert_eq!(window.start(), Utc.with_ymd_and_hms(2023, 3, 1, 6, 30, 0).unwrap());
        assert_eq!((window.end() - window.start()).num_days(), 365);
    }

    #[test]
    fn test_window_last_year_into_leap_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let window = DateWindow::last_year(now).unwrap();

        assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_window_iso_strings() {
        let now = Utc.with_ymd_and_hms(2024, 3, 5, 10, 11, 12).unwrap();
        let (from, to) = DateWindow::last_year(now).unwrap().to_iso_strings();

        assert_eq!(from, "2023-03-05T10:11:12.000Z");
        assert_eq!(to, "2024-03-05T10:11:12.000Z");
    }
}
