//! Thin typed wrapper over the GitHub REST API.
//!
//! One method per remote resource; explicit owner/repo/identifier parameters;
//! the bearer token is held by the client. Every method performs exactly one
//! HTTP round-trip and surfaces failures as [`RemoteError`].

pub mod types;

use crate::config::Config;
use crate::http::{self, RemoteError};
use base64::Engine;
use reqwest::Method;
use self::types::{FileContent, GitRef, IssueComment, Label, PullRequest, Repository, User};

pub struct GithubClient {
    client: reqwest::Client,
    cfg: Config,
    token: String,
}

impl GithubClient {
    pub fn new(cfg: Config, token: String) -> Result<Self, RemoteError> {
        let client = http::build_client(&cfg)?;
        Ok(Self { client, cfg, token })
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        http::get_json(&self.client, &self.cfg, &self.token, path).await
    }

    async fn send<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, RemoteError> {
        http::send_json(&self.client, &self.cfg, &self.token, method, path, body).await
    }

    /// GET /user
    pub async fn current_user(&self) -> Result<User, RemoteError> {
        self.get("/user").await
    }

    /// GET /repos/{owner}/{repo}/pulls/{number}
    pub async fn pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
    ) -> Result<PullRequest, RemoteError> {
        self.get(&format!("/repos/{}/{}/pulls/{}", owner, repo, number))
            .await
    }

    /// GET /repos/{owner}/{repo}/git/ref/heads/{branch}
    pub async fn branch_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<GitRef, RemoteError> {
        self.get(&format!(
            "/repos/{}/{}/git/ref/heads/{}",
            owner,
            repo,
            http::encode_path_segment(branch)
        ))
        .await
    }

    /// PATCH /repos/{owner}/{repo}/git/refs/heads/{branch}
    pub async fn update_branch_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
        force: bool,
    ) -> Result<GitRef, RemoteError> {
        let path = format!(
            "/repos/{}/{}/git/refs/heads/{}",
            owner,
            repo,
            http::encode_path_segment(branch)
        );
        self.send(
            Method::PATCH,
            &path,
            &serde_json::json!({ "sha": sha, "force": force }),
        )
        .await
    }

    /// POST /repos/{owner}/{repo}/git/refs
    pub async fn create_branch_ref(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<GitRef, RemoteError> {
        let path = format!("/repos/{}/{}/git/refs", owner, repo);
        self.send(
            Method::POST,
            &path,
            &serde_json::json!({ "ref": format!("refs/heads/{}", branch), "sha": sha }),
        )
        .await
    }

    /// PUT /repos/{owner}/{repo}/contents/{path} with base64 content
    pub async fn create_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
        message: &str,
        content: &str,
    ) -> Result<(), RemoteError> {
        let api_path = format!(
            "/repos/{}/{}/contents/{}",
            owner,
            repo,
            http::encode_file_path(path)
        );
        let encoded = base64::engine::general_purpose::STANDARD.encode(content.as_bytes());
        http::send_unit(
            &self.client,
            &self.cfg,
            &self.token,
            Method::PUT,
            &api_path,
            &serde_json::json!({ "message": message, "content": encoded, "branch": branch }),
        )
        .await
    }

    /// GET /repos/{owner}/{repo}/contents/{path}?ref={branch}, for the blob SHA
    pub async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<FileContent, RemoteError> {
        self.get(&format!(
            "/repos/{}/{}/contents/{}?ref={}",
            owner,
            repo,
            http::encode_file_path(path),
            http::encode_path_segment(branch)
        ))
        .await
    }

    /// DELETE /repos/{owner}/{repo}/contents/{path}
    pub async fn delete_file(
        &self,
        owner: &str,
        repo: &str,
        path: &str,
        branch: &str,
        message: &str,
        sha: &str,
    ) -> Result<(), RemoteError> {
        let api_path = format!(
            "/repos/{}/{}/contents/{}",
            owner,
            repo,
            http::encode_file_path(path)
        );
        http::send_unit(
            &self.client,
            &self.cfg,
            &self.token,
            Method::DELETE,
            &api_path,
            &serde_json::json!({ "message": message, "sha": sha, "branch": branch }),
        )
        .await
    }

    /// POST /repos/{owner}/{repo}/pulls
    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        title: &str,
        head: &str,
        base: &str,
        body: &str,
    ) -> Result<PullRequest, RemoteError> {
        let path = format!("/repos/{}/{}/pulls", owner, repo);
        self.send(
            Method::POST,
            &path,
            &serde_json::json!({ "title": title, "head": head, "base": base, "body": body }),
        )
        .await
    }

    /// POST /repos/{owner}/{repo}/issues/{number}/labels
    pub async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
        labels: &[String],
    ) -> Result<Vec<Label>, RemoteError> {
        let path = format!("/repos/{}/{}/issues/{}/labels", owner, repo, number);
        self.send(Method::POST, &path, &serde_json::json!({ "labels": labels }))
            .await
    }

    /// GET /repos/{owner}/{repo}, which carries the permission flags
    pub async fn repository(&self, owner: &str, repo: &str) -> Result<Repository, RemoteError> {
        self.get(&format!("/repos/{}/{}", owner, repo)).await
    }

    /// POST /repos/{owner}/{repo}/actions/workflows/{file}/dispatches (204)
    pub async fn dispatch_workflow(
        &self,
        owner: &str,
        repo: &str,
        workflow_file: &str,
        git_ref: &str,
        inputs: &serde_json::Value,
    ) -> Result<(), RemoteError> {
        let path = format!(
            "/repos/{}/{}/actions/workflows/{}/dispatches",
            owner,
            repo,
            http::encode_path_segment(workflow_file)
        );
        http::send_unit(
            &self.client,
            &self.cfg,
            &self.token,
            Method::POST,
            &path,
            &serde_json::json!({ "ref": git_ref, "inputs": inputs }),
        )
        .await
    }

    /// POST /repos/{owner}/{repo}/issues/{number}/comments
    pub async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        number: i64,
        body: &str,
    ) -> Result<IssueComment, RemoteError> {
        let path = format!("/repos/{}/{}/issues/{}/comments", owner, repo, number);
        self.send(Method::POST, &path, &serde_json::json!({ "body": body }))
            .await
    }
}
