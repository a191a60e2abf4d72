//! Description rewrite for the mirrored pull request. Pure functions,
//! deterministic for a given source description.

use crate::locator::RepoRef;
use regex::Regex;

/// Marker after which the source PR URL is inserted.
pub const PROVENANCE_MARKER: &str = "This PR is translated from:";

/// First line of the "affected versions" guidance paragraph in the source
/// repository's PR template.
const VERSION_TIP_MARKER: &str = "tips for choosing the affected version";

/// Apply the three rewrite rules in order: swap the CLA-assistant link to the
/// target repository, record provenance, and drop the affected-version tips.
pub fn rewrite_description(
    body: Option<&str>,
    source_repo: &RepoRef,
    target_repo: &str,
    source_pr_url: &str,
) -> String {
    let body = body.unwrap_or_default();
    let body = swap_cla_link(body, source_repo, target_repo);
    let body = insert_provenance(&body, source_pr_url);
    strip_version_tips(&body)
}

/// Replace `cla-assistant.io/<owner>/<source>` with the target repository
/// name. The repository name must end at the match, so `docs` never matches
/// inside `docs-cn` and re-applying the rewrite is a no-op.
pub fn swap_cla_link(body: &str, source_repo: &RepoRef, target_repo: &str) -> String {
    let pattern = format!(
        r"cla-assistant\.io/{}/{}($|[^0-9A-Za-z_-])",
        regex::escape(&source_repo.owner),
        regex::escape(&source_repo.name)
    );
    let re = Regex::new(&pattern).expect("escaped repository names form a valid pattern");
    re.replace_all(body, |caps: &regex::Captures<'_>| {
        format!(
            "cla-assistant.io/{}/{}{}",
            source_repo.owner, target_repo, &caps[1]
        )
    })
    .into_owned()
}

/// Insert the source PR URL right after [`PROVENANCE_MARKER`]; when the
/// marker is absent, prepend a provenance line instead.
pub fn insert_provenance(body: &str, source_pr_url: &str) -> String {
    if body.contains(PROVENANCE_MARKER) {
        body.replacen(
            PROVENANCE_MARKER,
            &format!("{} {}", PROVENANCE_MARKER, source_pr_url),
            1,
        )
    } else if body.is_empty() {
        format!("{} {}", PROVENANCE_MARKER, source_pr_url)
    } else {
        format!("{} {}\n\n{}", PROVENANCE_MARKER, source_pr_url, body)
    }
}

/// Remove every paragraph that opens with the affected-version tip, up to and
/// including the next blank line. All occurrences go, not just the first.
pub fn strip_version_tips(body: &str) -> String {
    let re = Regex::new(&format!(
        r"(?msi)^[ \t>*_-]*{}.*?(\n[ \t]*\n|\z)",
        regex::escape(VERSION_TIP_MARKER)
    ))
    .expect("escaped marker forms a valid pattern");
    re.replace_all(body, "").into_owned()
}
