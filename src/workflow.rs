//! Workflow-dispatch hand-off: once the mirrored PR exists, start the CI
//! pipeline that performs the actual translation. Never fails the run; every
//! path reduces to a [`WorkflowOutcome`] plus reporter lines.

use crate::github::GithubClient;
use crate::report::Reporter;
use log::warn;
use reqwest::StatusCode;

/// Provider identifier passed through to the translation workflow.
pub const AI_PROVIDER: &str = "openai";

/// Workflow filename, keyed by the repository that received the mirrored PR.
pub fn workflow_file(target_repo: &str) -> &'static str {
    match target_repo {
        "docs-cn" => "translate-docs-pr.yml",
        _ => "translate-docs-cn-pr.yml",
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome {
    /// The caller asked for mirror-only mode.
    NotRequested,
    Dispatched { status_url: String },
    /// The acting credential cannot push to the branch's repository.
    SkippedNoPermission,
    Failed { message: String },
}

/// Coordinates for one dispatch. `owner`/`repo` name the repository holding
/// the translation branch; `target_repo` selects the workflow file.
pub struct Dispatch<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
    pub target_repo: &'a str,
    pub base_branch: &'a str,
    pub source_pr_url: &'a str,
    pub target_pr_url: &'a str,
    pub web_url: &'a str,
}

impl Dispatch<'_> {
    fn status_url(&self, file: &str) -> String {
        format!(
            "{}/{}/{}/actions/workflows/{}",
            self.web_url, self.owner, self.repo, file
        )
    }
}

pub async fn trigger(
    client: &GithubClient,
    reporter: &dyn Reporter,
    dispatch: &Dispatch<'_>,
) -> WorkflowOutcome {
    let file = workflow_file(dispatch.target_repo);
    let status_url = dispatch.status_url(file);

    let repo = match client.repository(dispatch.owner, dispatch.repo).await {
        Ok(repo) => repo,
        Err(err) => {
            warn!("permission lookup failed: {}", err);
            reporter.error(&format!(
                "Could not check your permissions on {}/{}: {}",
                dispatch.owner, dispatch.repo, err
            ));
            reporter.log(&format!("You can start the workflow manually from {}.", status_url));
            return WorkflowOutcome::Failed {
                message: err.to_string(),
            };
        }
    };
    let permissions = repo.permissions.unwrap_or_default();
    if !(permissions.push || permissions.admin) {
        reporter.log(&format!(
            "You do not have write access to {}; skipping the automatic workflow trigger.",
            repo.full_name
        ));
        return WorkflowOutcome::SkippedNoPermission;
    }

    let inputs = serde_json::json!({
        "source_pr_url": dispatch.source_pr_url,
        "target_pr_url": dispatch.target_pr_url,
        "ai_provider": AI_PROVIDER,
    });
    match client
        .dispatch_workflow(
            dispatch.owner,
            dispatch.repo,
            file,
            dispatch.base_branch,
            &inputs,
        )
        .await
    {
        Ok(()) => {
            reporter.log(&format!(
                "Translation workflow dispatched; watch {} for progress.",
                status_url
            ));
            WorkflowOutcome::Dispatched { status_url }
        }
        Err(err) if err.status == StatusCode::UNPROCESSABLE_ENTITY => {
            reporter.error(&format!(
                "The workflow could not be dispatched (HTTP 422): {}. Most likely causes:",
                err.message
            ));
            reporter.log(&format!(
                "- {} is missing from the default branch of {}/{}",
                file, dispatch.owner, dispatch.repo
            ));
            reporter.log("- the workflow file does not declare a workflow_dispatch trigger");
            reporter.log(&format!(
                "- branch {} does not exist on {}/{}",
                dispatch.base_branch, dispatch.owner, dispatch.repo
            ));
            reporter.log(&format!("Check {} after fixing the workflow.", status_url));
            WorkflowOutcome::Failed {
                message: err.to_string(),
            }
        }
        Err(err) => {
            reporter.error(&format!(
                "Failed to dispatch the translation workflow: {}",
                err
            ));
            reporter.log(&format!("You can start it manually from {}.", status_url));
            WorkflowOutcome::Failed {
                message: err.to_string(),
            }
        }
    }
}
