use std::env;

/// Runtime configuration for the GitHub API client.
/// Values are sourced from environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub web_url: String,
    pub api_version: String,
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment.
    ///
    /// Env vars:
    /// - GITHUB_API_URL (default: https://api.github.com)
    /// - GITHUB_WEB_URL (default: https://github.com)
    /// - GITHUB_API_VERSION (default: 2022-11-28)
    /// - GITHUB_USER_AGENT (default: octopus-gh/<version>)
    ///
    /// The token is deliberately not part of the configuration; it comes
    /// from a [`crate::credentials::TokenProvider`].
    pub fn from_env() -> Self {
        let api_url = env::var("GITHUB_API_URL")
            .unwrap_or_else(|_| "https://api.github.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let web_url = env::var("GITHUB_WEB_URL")
            .unwrap_or_else(|_| "https://github.com".to_string())
            .trim_end_matches('/')
            .to_string();
        let api_version =
            env::var("GITHUB_API_VERSION").unwrap_or_else(|_| "2022-11-28".to_string());
        let default_ua = format!("octopus-gh/{}", env!("CARGO_PKG_VERSION"));
        let user_agent = env::var("GITHUB_USER_AGENT").unwrap_or(default_ua);

        Self {
            api_url,
            web_url,
            api_version,
            user_agent,
        }
    }
}
