use serde::Serialize;
use serde_json::{Map, Value};

/// Everything the project page shows about one repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRepo {
    /// Repository object exactly as GitHub returned it.
    pub repo_info: Value,

    /// Raw README text, or `None` when it could not be fetched.
    pub readme_content: Option<String>,

    /// Language name to byte count, or `None` when it could not be fetched.
    pub languages: Option<Map<String, Value>>,
}
