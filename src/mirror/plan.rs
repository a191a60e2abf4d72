use super::MirrorError;
use crate::locator::RepoRef;

/// Sentinel label: the source PR has already been translated.
pub const DONE_LABEL: &str = "translation/done";

/// Labels whose name contains any of these substrings stay on the source PR
/// only; they describe review state or sizing there and would be wrong on a
/// fresh mirror.
pub const EXCLUDED_LABEL_SUBSTRINGS: &[&str] = &[
    "size",
    "translation",
    "status",
    "first-time-contributor",
    "contribution",
    "lgtm",
    "approved",
];

/// Derived configuration for one mirroring run.
///
/// The pair is fixed: `docs` mirrors into `docs-cn` and vice versa. The fork
/// carries the target's name under the acting user's account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPlan {
    pub target_owner: String,
    pub target_repo: String,
    pub fork_repo: String,
    pub translation_label: String,
}

impl MirrorPlan {
    pub fn resolve(source: &RepoRef) -> Result<Self, MirrorError> {
        let target_repo = match source.name.as_str() {
            "docs" => "docs-cn",
            "docs-cn" => "docs",
            _ => return Err(MirrorError::UnknownRepository(source.to_string())),
        };
        Ok(Self {
            target_owner: source.owner.clone(),
            target_repo: target_repo.to_string(),
            fork_repo: target_repo.to_string(),
            translation_label: format!("translation/from-{}", source.name),
        })
    }
}

/// `<headBranch>-<sourcePRNumber>`, the deterministic mirror branch name.
pub fn branch_name(head_branch: &str, number: i64) -> String {
    format!("{}-{}", head_branch, number)
}

/// Source labels minus the excluded substrings, original order kept, with the
/// translation label appended. The exclusion list swallows every
/// `translation/*` label, so the appended one appears exactly once.
pub fn mirrored_labels(source_labels: &[String], translation_label: &str) -> Vec<String> {
    let mut labels: Vec<String> = source_labels
        .iter()
        .filter(|label| {
            !EXCLUDED_LABEL_SUBSTRINGS
                .iter()
                .any(|substr| label.contains(substr))
        })
        .cloned()
        .collect();
    labels.push(translation_label.to_string());
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(owner: &str, name: &str) -> RepoRef {
        RepoRef::new(owner, name).unwrap()
    }

    #[test]
    fn resolves_both_directions() {
        let plan = MirrorPlan::resolve(&repo("pingcap", "docs")).unwrap();
        assert_eq!(plan.target_owner, "pingcap");
        assert_eq!(plan.target_repo, "docs-cn");
        assert_eq!(plan.fork_repo, "docs-cn");
        assert_eq!(plan.translation_label, "translation/from-docs");

        let plan = MirrorPlan::resolve(&repo("pingcap", "docs-cn")).unwrap();
        assert_eq!(plan.target_repo, "docs");
        assert_eq!(plan.translation_label, "translation/from-docs-cn");
    }

    #[test]
    fn rejects_unknown_repositories() {
        let err = MirrorPlan::resolve(&repo("pingcap", "tidb")).unwrap_err();
        assert!(matches!(err, MirrorError::UnknownRepository(_)));
    }

    #[test]
    fn branch_name_is_deterministic() {
        assert_eq!(branch_name("feature-x", 500), "feature-x-500");
        assert_eq!(branch_name("feature-x", 500), branch_name("feature-x", 500));
    }

    #[test]
    fn filters_labels_and_appends_translation_label() {
        let source = vec![
            "size/M".to_string(),
            "translation/doing".to_string(),
            "area/tidb".to_string(),
        ];
        assert_eq!(
            mirrored_labels(&source, "translation/from-docs"),
            vec!["area/tidb", "translation/from-docs"]
        );
    }

    #[test]
    fn keeps_relative_order_of_survivors() {
        let source = vec![
            "area/tidb".to_string(),
            "v7.5".to_string(),
            "status/LGT2".to_string(),
            "type/bugfix".to_string(),
        ];
        assert_eq!(
            mirrored_labels(&source, "translation/from-docs-cn"),
            vec!["area/tidb", "v7.5", "type/bugfix", "translation/from-docs-cn"]
        );
    }

    #[test]
    fn translation_label_appears_exactly_once() {
        let source = vec!["translation/from-docs".to_string(), "area/tidb".to_string()];
        let labels = mirrored_labels(&source, "translation/from-docs");
        assert_eq!(
            labels
                .iter()
                .filter(|l| *l == "translation/from-docs")
                .count(),
            1
        );
    }
}
