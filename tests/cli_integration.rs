use assert_cmd::Command;
use httpmock::{
    Method::{DELETE, GET, PATCH, POST, PUT},
    MockServer,
};
use predicates::str::contains;

#[test]
fn version_flag_prints_name_and_version() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("octopus-gh")?;
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(contains("octopus-gh"));
    Ok(())
}

#[test]
fn mirror_rejects_a_non_pr_url_before_touching_credentials() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("octopus-gh")?;
    cmd.args(["mirror", "not-a-url"])
        .assert()
        .failure()
        .stderr(contains("not a valid URL"));
    Ok(())
}

#[test]
fn comment_requires_a_body() -> anyhow::Result<()> {
    let mut cmd = Command::cargo_bin("octopus-gh")?;
    cmd.args(["comment", "https://github.com/pingcap/docs/pull/7"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn comment_posts_to_each_pull_request() -> anyhow::Result<()> {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/pingcap/docs/issues/7/comments")
            .json_body(serde_json::json!({"body": "PTAL"}));
        then.status(201).json_body(serde_json::json!({
            "html_url": "https://github.com/pingcap/docs/pull/7#issuecomment-1"
        }));
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/pingcap/docs/issues/8/comments")
            .json_body(serde_json::json!({"body": "PTAL"}));
        then.status(201).json_body(serde_json::json!({
            "html_url": "https://github.com/pingcap/docs/pull/8#issuecomment-2"
        }));
    });

    let mut cmd = Command::cargo_bin("octopus-gh")?;
    cmd.env("GITHUB_TOKEN", "t")
        .env("GITHUB_API_URL", server.base_url())
        .args([
            "comment",
            "--body",
            "PTAL",
            "https://github.com/pingcap/docs/pull/7",
            "https://github.com/pingcap/docs/pull/8",
        ])
        .assert()
        .success()
        .stdout(contains("Commented on pingcap/docs#7"))
        .stdout(contains("Commented on pingcap/docs#8"));
    first.assert();
    second.assert();
    Ok(())
}

#[test]
fn comment_continues_past_failures_and_exits_nonzero() -> anyhow::Result<()> {
    let server = MockServer::start();
    let failing = server.mock(|when, then| {
        when.method(POST).path("/repos/pingcap/docs/issues/7/comments");
        then.status(404)
            .json_body(serde_json::json!({"message": "Not Found"}));
    });
    let succeeding = server.mock(|when, then| {
        when.method(POST).path("/repos/pingcap/docs/issues/8/comments");
        then.status(201).json_body(serde_json::json!({
            "html_url": "https://github.com/pingcap/docs/pull/8#issuecomment-2"
        }));
    });

    let mut cmd = Command::cargo_bin("octopus-gh")?;
    cmd.env("GITHUB_TOKEN", "t")
        .env("GITHUB_API_URL", server.base_url())
        .args([
            "comment",
            "--body",
            "PTAL",
            "https://github.com/pingcap/docs/pull/7",
            "https://github.com/pingcap/docs/pull/8",
        ])
        .assert()
        .failure()
        .stdout(contains("Commented on pingcap/docs#8"))
        .stderr(contains("Could not comment on pingcap/docs#7"));
    failing.assert();
    succeeding.assert();
    Ok(())
}

#[test]
fn mirror_only_run_through_the_binary() -> anyhow::Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/user");
        then.status(200).json_body(serde_json::json!({"login": "alice"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/pingcap/docs/pulls/500");
        then.status(200).json_body(serde_json::json!({
            "number": 500,
            "title": "Update TiDB docs",
            "body": "Details here.",
            "labels": [{"name": "area/tidb"}],
            "html_url": "https://github.com/pingcap/docs/pull/500",
            "base": {"ref": "master", "repo": {"full_name": "pingcap/docs"}},
            "head": {"ref": "feature-x", "repo": {"full_name": "alice/docs"}}
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/pingcap/docs-cn/git/ref/heads/master");
        then.status(200)
            .json_body(serde_json::json!({"object": {"sha": "aaa111bbb222"}}));
    });
    server.mock(|when, then| {
        when.method(PATCH)
            .path("/repos/alice/docs-cn/git/refs/heads/master");
        then.status(200)
            .json_body(serde_json::json!({"object": {"sha": "aaa111bbb222"}}));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/alice/docs-cn/git/ref/heads/master");
        then.status(200)
            .json_body(serde_json::json!({"object": {"sha": "aaa111bbb222"}}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/repos/alice/docs-cn/git/refs");
        then.status(201)
            .json_body(serde_json::json!({"object": {"sha": "aaa111bbb222"}}));
    });
    server.mock(|when, then| {
        when.method(PUT)
            .path("/repos/alice/docs-cn/contents/translation-placeholder.md");
        then.status(201).json_body(serde_json::json!({}));
    });
    server.mock(|when, then| {
        when.method(POST).path("/repos/pingcap/docs-cn/pulls");
        then.status(201).json_body(serde_json::json!({
            "number": 12,
            "title": "Update TiDB docs",
            "body": "rewritten",
            "labels": [],
            "html_url": "https://github.com/pingcap/docs-cn/pull/12",
            "base": {"ref": "master", "repo": {"full_name": "pingcap/docs-cn"}},
            "head": {"ref": "feature-x-500", "repo": {"full_name": "alice/docs-cn"}}
        }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/repos/pingcap/docs-cn/issues/12/labels");
        then.status(200).json_body(serde_json::json!([]));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/repos/alice/docs-cn/contents/translation-placeholder.md");
        then.status(200)
            .json_body(serde_json::json!({"sha": "f00baa"}));
    });
    server.mock(|when, then| {
        when.method(DELETE)
            .path("/repos/alice/docs-cn/contents/translation-placeholder.md");
        then.status(200).json_body(serde_json::json!({}));
    });
    let dispatch = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/alice/docs-cn/actions/workflows/translate-docs-pr.yml/dispatches");
        then.status(204);
    });

    let mut cmd = Command::cargo_bin("octopus-gh")?;
    cmd.env("GITHUB_TOKEN", "t")
        .env("GITHUB_API_URL", server.base_url())
        .args([
            "mirror",
            "https://github.com/pingcap/docs/pull/500",
            "--mirror-only",
        ])
        .assert()
        .success()
        .stdout(contains("https://github.com/pingcap/docs-cn/pull/12"));
    dispatch.assert_hits(0);
    Ok(())
}
