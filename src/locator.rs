use std::fmt;
use url::Url;

/// Identifies a repository by its two URL path segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: &str, name: &str) -> Result<Self, LocatorError> {
        if owner.is_empty() || name.is_empty() {
            return Err(LocatorError::EmptySegment);
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Parse an `owner/name` pair as the API returns it in `full_name`.
    pub fn parse_full_name(full_name: &str) -> Result<Self, LocatorError> {
        match full_name.split_once('/') {
            Some((owner, name)) => RepoRef::new(owner, name),
            None => Err(LocatorError::NotRepository(full_name.to_string())),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Coordinates of a pull request, parsed from its web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrLocator {
    pub repo: RepoRef,
    pub number: i64,
}

impl PrLocator {
    /// Accepts `https://github.com/<owner>/<repo>/pull/<n>` with an optional
    /// trailing tab segment (`/files`, `/commits`, ...).
    pub fn parse(input: &str) -> Result<Self, LocatorError> {
        let url = Url::parse(input)?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).collect())
            .unwrap_or_default();
        match segments.as_slice() {
            &[owner, repo, "pull", number, ..] => {
                let number = number
                    .parse::<i64>()
                    .map_err(|_| LocatorError::NotPullRequest(input.to_string()))?;
                Ok(Self {
                    repo: RepoRef::new(owner, repo)?,
                    number,
                })
            }
            _ => Err(LocatorError::NotPullRequest(input.to_string())),
        }
    }

    /// The canonical web URL, reconstructed against the configured host.
    pub fn canonical_url(&self, web_url: &str) -> String {
        format!("{}/{}/pull/{}", web_url, self.repo, self.number)
    }
}

impl fmt::Display for PrLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.repo, self.number)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LocatorError {
    #[error("not a valid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("not a pull request URL: {0}")]
    NotPullRequest(String),
    #[error("repository owner and name must be non-empty")]
    EmptySegment,
    #[error("not an owner/name repository path: {0}")]
    NotRepository(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pull_request_url() {
        let loc = PrLocator::parse("https://github.com/pingcap/docs/pull/500").unwrap();
        assert_eq!(loc.repo.owner, "pingcap");
        assert_eq!(loc.repo.name, "docs");
        assert_eq!(loc.number, 500);
    }

    #[test]
    fn tolerates_tab_suffix() {
        let loc = PrLocator::parse("https://github.com/pingcap/docs/pull/500/files").unwrap();
        assert_eq!(loc.number, 500);
    }

    #[test]
    fn rejects_non_pr_urls() {
        assert!(PrLocator::parse("https://github.com/pingcap/docs").is_err());
        assert!(PrLocator::parse("https://github.com/pingcap/docs/pull/abc").is_err());
        assert!(PrLocator::parse("not-a-url").is_err());
    }

    #[test]
    fn canonical_url_round_trip() {
        let loc = PrLocator::parse("https://github.com/pingcap/docs/pull/500/files").unwrap();
        assert_eq!(
            loc.canonical_url("https://github.com"),
            "https://github.com/pingcap/docs/pull/500"
        );
    }

    #[test]
    fn full_name_parsing() {
        let repo = RepoRef::parse_full_name("alice/docs-cn").unwrap();
        assert_eq!(repo.owner, "alice");
        assert_eq!(repo.name, "docs-cn");
        assert!(RepoRef::parse_full_name("nope").is_err());
    }
}
