//! The PR-mirroring orchestration: a linear state machine driven one network
//! round-trip at a time. Completed side effects are never rolled back on
//! failure; an orphaned branch or placeholder marks where the run stopped.

mod plan;
mod rewrite;

pub use self::plan::{
    branch_name, mirrored_labels, MirrorPlan, DONE_LABEL, EXCLUDED_LABEL_SUBSTRINGS,
};
pub use self::rewrite::{rewrite_description, PROVENANCE_MARKER};

use crate::config::Config;
use crate::credentials::{CredentialError, TokenProvider};
use crate::github::types::PullRequest;
use crate::github::GithubClient;
use crate::http::RemoteError;
use crate::locator::{PrLocator, RepoRef};
use crate::report::Reporter;
use crate::workflow::{self, WorkflowOutcome};
use log::{debug, error, warn};

/// Committed to the new branch so it has a diff against its base, then
/// removed once the pull request exists.
pub const PLACEHOLDER_PATH: &str = "translation-placeholder.md";
pub const PLACEHOLDER_CONTENT: &str =
    "This file keeps the translation branch non-empty until its pull request is opened.\n";

#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("{0} is not part of a known mirror pair (expected docs or docs-cn)")]
    UnknownRepository(String),
    #[error("source pull request is missing its {0}")]
    IncompleteSource(&'static str),
    #[error("branch {branch} already exists on {repo}; was this PR mirrored before?")]
    BranchExists { repo: String, branch: String },
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: RemoteError,
    },
}

fn remote(context: impl Into<String>, source: RemoteError) -> MirrorError {
    MirrorError::Remote {
        context: context.into(),
        source,
    }
}

/// Everything read from the source pull request, fetched once per run.
#[derive(Debug, Clone)]
pub struct PullRequestSnapshot {
    pub number: i64,
    pub title: String,
    pub description: Option<String>,
    pub labels: Vec<String>,
    pub base_repo: RepoRef,
    pub base_branch: String,
    pub head_repo: RepoRef,
    pub head_branch: String,
}

impl PullRequestSnapshot {
    fn from_wire(pr: PullRequest) -> Result<Self, MirrorError> {
        let base_repo = pr
            .base
            .repo
            .ok_or(MirrorError::IncompleteSource("base repository"))?;
        let head_repo = pr
            .head
            .repo
            .ok_or(MirrorError::IncompleteSource("head repository"))?;
        Ok(Self {
            number: pr.number,
            title: pr.title,
            description: pr.body,
            labels: pr.labels.into_iter().map(|l| l.name).collect(),
            base_repo: RepoRef::parse_full_name(&base_repo.full_name)
                .map_err(|_| MirrorError::IncompleteSource("base repository name"))?,
            base_branch: pr.base.branch,
            head_repo: RepoRef::parse_full_name(&head_repo.full_name)
                .map_err(|_| MirrorError::IncompleteSource("head repository name"))?,
            head_branch: pr.head.branch,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MirrorRequest {
    pub source: PrLocator,
    /// `false` is the "mirror only" mode: skip the workflow-dispatch step.
    pub trigger_workflow: bool,
}

#[derive(Debug)]
pub enum MirrorOutcome {
    /// The source PR already carries the done label; nothing was mutated.
    AlreadyMirrored,
    Completed {
        pr_url: String,
        pr_number: i64,
        workflow: WorkflowOutcome,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    ResolveIdentity,
    FetchSource,
    CheckDoneLabel,
    SyncBaseBranch,
    CreateBranch,
    CommitPlaceholder,
    CreatePr,
    AddLabels,
    DeletePlaceholder,
    TriggerWorkflow,
}

const SEQUENCE: [Step; 10] = [
    Step::ResolveIdentity,
    Step::FetchSource,
    Step::CheckDoneLabel,
    Step::SyncBaseBranch,
    Step::CreateBranch,
    Step::CommitPlaceholder,
    Step::CreatePr,
    Step::AddLabels,
    Step::DeletePlaceholder,
    Step::TriggerWorkflow,
];

impl Step {
    /// Soft steps are logged and skipped on failure; the mirrored PR is still
    /// achievable (or already exists) without them.
    fn is_soft(self) -> bool {
        matches!(
            self,
            Step::CommitPlaceholder | Step::AddLabels | Step::DeletePlaceholder
        )
    }
}

enum Progress {
    Advance,
    Halt(MirrorOutcome),
}

/// Run the full mirroring sequence for `request`.
///
/// The token is resolved before any network call; a declined credential
/// aborts the run with no side effects. All user-visible progress, including
/// every failure, goes through `reporter`.
pub async fn run(
    cfg: &Config,
    tokens: &dyn TokenProvider,
    reporter: &dyn Reporter,
    request: &MirrorRequest,
) -> Result<MirrorOutcome, MirrorError> {
    let plan = match MirrorPlan::resolve(&request.source.repo) {
        Ok(plan) => plan,
        Err(err) => {
            reporter.error(&err.to_string());
            return Err(err);
        }
    };
    let token = match tokens.token() {
        Ok(token) => token,
        Err(err) => {
            let err = MirrorError::from(err);
            reporter.error(&err.to_string());
            return Err(err);
        }
    };
    let client = match GithubClient::new(cfg.clone(), token) {
        Ok(client) => client,
        Err(err) => {
            let err = remote("initializing the API client", err);
            reporter.error(&err.to_string());
            return Err(err);
        }
    };

    let mut run = Run {
        client: &client,
        reporter,
        source: &request.source,
        plan,
        trigger_workflow: request.trigger_workflow,
        login: String::new(),
        snapshot: None,
        branch: String::new(),
        mirrored: None,
        workflow: WorkflowOutcome::NotRequested,
    };

    for step in SEQUENCE {
        if step == Step::TriggerWorkflow && !run.trigger_workflow {
            debug!("workflow trigger not requested; done after mirroring");
            continue;
        }
        match run.execute(step).await {
            Ok(Progress::Advance) => {}
            Ok(Progress::Halt(outcome)) => return Ok(outcome),
            Err(err) if step.is_soft() => {
                warn!("soft step {:?} failed: {}", step, err);
                reporter.error(&format!("{} (continuing)", err));
            }
            Err(err) => {
                error!("step {:?} failed: {}", step, err);
                reporter.error(&err.to_string());
                return Err(err);
            }
        }
    }

    let (pr_number, pr_url) = run
        .mirrored
        .clone()
        .expect("recorded when the pull request is opened");
    reporter.log("Mirroring finished.");
    Ok(MirrorOutcome::Completed {
        pr_url,
        pr_number,
        workflow: run.workflow,
    })
}

struct Run<'a> {
    client: &'a GithubClient,
    reporter: &'a dyn Reporter,
    source: &'a PrLocator,
    plan: MirrorPlan,
    trigger_workflow: bool,
    login: String,
    snapshot: Option<PullRequestSnapshot>,
    branch: String,
    mirrored: Option<(i64, String)>,
    workflow: WorkflowOutcome,
}

impl Run<'_> {
    async fn execute(&mut self, step: Step) -> Result<Progress, MirrorError> {
        match step {
            Step::ResolveIdentity => self.resolve_identity().await,
            Step::FetchSource => self.fetch_source().await,
            Step::CheckDoneLabel => self.check_done_label(),
            Step::SyncBaseBranch => self.sync_base_branch().await,
            Step::CreateBranch => self.create_branch().await,
            Step::CommitPlaceholder => self.commit_placeholder().await,
            Step::CreatePr => self.create_pr().await,
            Step::AddLabels => self.add_labels().await,
            Step::DeletePlaceholder => self.delete_placeholder().await,
            Step::TriggerWorkflow => self.trigger_workflow().await,
        }
    }

    fn snapshot(&self) -> &PullRequestSnapshot {
        self.snapshot
            .as_ref()
            .expect("snapshot is recorded before dependent steps run")
    }

    fn source_pr_url(&self) -> String {
        self.source.canonical_url(&self.client.config().web_url)
    }

    async fn resolve_identity(&mut self) -> Result<Progress, MirrorError> {
        let user = self
            .client
            .current_user()
            .await
            .map_err(|e| remote("resolving the acting user", e))?;
        self.reporter.log(&format!("Acting as {}.", user.login));
        self.login = user.login;
        Ok(Progress::Advance)
    }

    async fn fetch_source(&mut self) -> Result<Progress, MirrorError> {
        let pr = self
            .client
            .pull_request(
                &self.source.repo.owner,
                &self.source.repo.name,
                self.source.number,
            )
            .await
            .map_err(|e| remote(format!("fetching {}", self.source), e))?;
        let snapshot = PullRequestSnapshot::from_wire(pr)?;
        self.branch = branch_name(&snapshot.head_branch, snapshot.number);
        self.reporter
            .log(&format!("Fetched {}: \"{}\".", self.source, snapshot.title));
        self.snapshot = Some(snapshot);
        Ok(Progress::Advance)
    }

    fn check_done_label(&self) -> Result<Progress, MirrorError> {
        if self.snapshot().labels.iter().any(|l| l == DONE_LABEL) {
            self.reporter.log(&format!(
                "{} already carries {}; nothing to mirror.",
                self.source, DONE_LABEL
            ));
            return Ok(Progress::Halt(MirrorOutcome::AlreadyMirrored));
        }
        Ok(Progress::Advance)
    }

    async fn sync_base_branch(&mut self) -> Result<Progress, MirrorError> {
        let base_branch = self.snapshot().base_branch.clone();
        let upstream = self
            .client
            .branch_ref(&self.plan.target_owner, &self.plan.target_repo, &base_branch)
            .await
            .map_err(|e| {
                remote(
                    format!(
                        "reading branch {} of {}/{}",
                        base_branch, self.plan.target_owner, self.plan.target_repo
                    ),
                    e,
                )
            })?;
        let sha = upstream.object.sha;
        match self
            .client
            .update_branch_ref(&self.login, &self.plan.fork_repo, &base_branch, &sha, true)
            .await
        {
            Ok(_) => {
                self.reporter.log(&format!(
                    "Synced {}/{} branch {} to {}.",
                    self.login,
                    self.plan.fork_repo,
                    base_branch,
                    short_sha(&sha)
                ));
                Ok(Progress::Advance)
            }
            Err(err) => Err(self.diagnose_sync_failure(&base_branch, err).await),
        }
    }

    /// Best-effort probes to tell apart the usual reasons the fork sync
    /// fails. The probes themselves are not allowed to fail the run; any
    /// probe error falls back to the generic diagnostic.
    async fn diagnose_sync_failure(&self, base_branch: &str, source: RemoteError) -> MirrorError {
        let fork = format!("{}/{}", self.login, self.plan.fork_repo);
        match self.client.repository(&self.login, &self.plan.fork_repo).await {
            Err(probe) if probe.is_not_found() => {
                return remote(
                    format!(
                        "syncing the fork's base branch: {} does not exist; fork {}/{} first",
                        fork, self.plan.target_owner, self.plan.target_repo
                    ),
                    source,
                );
            }
            Err(_) => return remote("syncing the fork's base branch", source),
            Ok(_) => {}
        }
        match self
            .client
            .branch_ref(&self.login, &self.plan.fork_repo, base_branch)
            .await
        {
            Err(probe) if probe.is_not_found() => remote(
                format!(
                    "syncing the fork's base branch: branch {} is missing on {}",
                    base_branch, fork
                ),
                source,
            ),
            _ => remote("syncing the fork's base branch", source),
        }
    }

    async fn create_branch(&mut self) -> Result<Progress, MirrorError> {
        let base_branch = self.snapshot().base_branch.clone();
        let base = self
            .client
            .branch_ref(&self.login, &self.plan.fork_repo, &base_branch)
            .await
            .map_err(|e| remote("reading the fork's base branch tip", e))?;
        match self
            .client
            .create_branch_ref(&self.login, &self.plan.fork_repo, &self.branch, &base.object.sha)
            .await
        {
            Ok(_) => {
                self.reporter.log(&format!(
                    "Created branch {} at {}.",
                    self.branch,
                    short_sha(&base.object.sha)
                ));
                Ok(Progress::Advance)
            }
            Err(err) => {
                // Existence probe: a ref that resolves now was there already.
                if self
                    .client
                    .branch_ref(&self.login, &self.plan.fork_repo, &self.branch)
                    .await
                    .is_ok()
                {
                    Err(MirrorError::BranchExists {
                        repo: format!("{}/{}", self.login, self.plan.fork_repo),
                        branch: self.branch.clone(),
                    })
                } else {
                    Err(remote("creating the translation branch", err))
                }
            }
        }
    }

    async fn commit_placeholder(&mut self) -> Result<Progress, MirrorError> {
        self.client
            .create_file(
                &self.login,
                &self.plan.fork_repo,
                PLACEHOLDER_PATH,
                &self.branch,
                "Add translation placeholder",
                PLACEHOLDER_CONTENT,
            )
            .await
            .map_err(|e| remote("committing the placeholder file", e))?;
        self.reporter.log("Committed the placeholder file.");
        Ok(Progress::Advance)
    }

    async fn create_pr(&mut self) -> Result<Progress, MirrorError> {
        let snapshot = self.snapshot().clone();
        let body = rewrite_description(
            snapshot.description.as_deref(),
            &snapshot.base_repo,
            &self.plan.target_repo,
            &self.source_pr_url(),
        );
        let head = format!("{}:{}", self.login, self.branch);
        let pr = self
            .client
            .create_pull_request(
                &self.plan.target_owner,
                &self.plan.target_repo,
                &snapshot.title,
                &head,
                &snapshot.base_branch,
                &body,
            )
            .await
            .map_err(|e| remote("opening the mirrored pull request", e))?;
        self.reporter.log(&format!("Opened {}.", pr.html_url));
        self.mirrored = Some((pr.number, pr.html_url));
        Ok(Progress::Advance)
    }

    async fn add_labels(&mut self) -> Result<Progress, MirrorError> {
        let labels = mirrored_labels(&self.snapshot().labels, &self.plan.translation_label);
        let (number, _) = self
            .mirrored
            .clone()
            .expect("recorded when the pull request is opened");
        self.client
            .add_labels(&self.plan.target_owner, &self.plan.target_repo, number, &labels)
            .await
            .map_err(|e| remote("labelling the mirrored pull request", e))?;
        self.reporter
            .log(&format!("Applied labels: {}.", labels.join(", ")));
        Ok(Progress::Advance)
    }

    async fn delete_placeholder(&mut self) -> Result<Progress, MirrorError> {
        let file = self
            .client
            .file_content(&self.login, &self.plan.fork_repo, PLACEHOLDER_PATH, &self.branch)
            .await
            .map_err(|e| remote("locating the placeholder file", e))?;
        self.client
            .delete_file(
                &self.login,
                &self.plan.fork_repo,
                PLACEHOLDER_PATH,
                &self.branch,
                "Remove translation placeholder",
                &file.sha,
            )
            .await
            .map_err(|e| remote("deleting the placeholder file", e))?;
        self.reporter.log("Removed the placeholder file.");
        Ok(Progress::Advance)
    }

    async fn trigger_workflow(&mut self) -> Result<Progress, MirrorError> {
        let source_pr_url = self.source_pr_url();
        let (_, target_pr_url) = self
            .mirrored
            .clone()
            .expect("recorded when the pull request is opened");
        let dispatch = workflow::Dispatch {
            owner: &self.login,
            repo: &self.plan.fork_repo,
            target_repo: &self.plan.target_repo,
            base_branch: &self.snapshot().base_branch,
            source_pr_url: &source_pr_url,
            target_pr_url: &target_pr_url,
            web_url: &self.client.config().web_url,
        };
        let outcome = workflow::trigger(self.client, self.reporter, &dispatch).await;
        self.workflow = outcome;
        Ok(Progress::Advance)
    }
}

fn short_sha(sha: &str) -> &str {
    &sha[..sha.len().min(7)]
}
