//! Wire types for the handful of REST resources the tool touches.
//! Only the fields the workflow reads are deserialized.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: i64,
    pub title: String,
    pub body: Option<String>,
    #[serde(default)]
    pub labels: Vec<Label>,
    pub html_url: String,
    pub base: PrSide,
    pub head: PrSide,
}

/// One end of a pull request. `repo` is null when the backing fork
/// has been deleted.
#[derive(Debug, Clone, Deserialize)]
pub struct PrSide {
    #[serde(rename = "ref")]
    pub branch: String,
    pub repo: Option<RepoSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitRef {
    pub object: GitObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitObject {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileContent {
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub full_name: String,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

/// Permission flags of the acting credential on a repository.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub push: bool,
    #[serde(default)]
    pub pull: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub html_url: String,
}
