//! Bearer-token supply. The orchestrator only sees [`TokenProvider`]; where
//! the token actually lives (environment, token file, interactive prompt) is
//! decided here.

use log::debug;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("no GitHub token was provided")]
    Declined,
    #[error("token store error: {0}")]
    Store(#[from] io::Error),
}

pub trait TokenProvider {
    fn token(&self) -> Result<String, CredentialError>;
}

/// A fixed token, typically sourced from the environment.
pub struct StaticToken(pub String);

impl TokenProvider for StaticToken {
    fn token(&self) -> Result<String, CredentialError> {
        Ok(self.0.clone())
    }
}

/// File-backed token store that prompts on first use and persists the answer
/// for later runs.
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("octopus-gh").join("token"))
    }

    pub fn read(&self) -> Option<String> {
        let contents = fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    pub fn persist(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, token)
    }
}

impl TokenProvider for TokenStore {
    fn token(&self) -> Result<String, CredentialError> {
        if let Some(token) = self.read() {
            return Ok(token);
        }
        let token = prompt_for_token()?;
        if let Err(e) = self.persist(&token) {
            // Still usable for this run; only the persistence failed.
            debug!("could not persist token to {}: {}", self.path.display(), e);
        }
        Ok(token)
    }
}

fn prompt_for_token() -> Result<String, CredentialError> {
    eprint!("Enter your GitHub token: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    let token = line.trim().to_string();
    if token.is_empty() {
        return Err(CredentialError::Declined);
    }
    Ok(token)
}

/// `GITHUB_TOKEN`/`GH_TOKEN` when set, otherwise the per-user token file.
pub fn default_provider() -> Box<dyn TokenProvider> {
    if let Ok(token) = env::var("GITHUB_TOKEN").or_else(|_| env::var("GH_TOKEN")) {
        return Box::new(StaticToken(token));
    }
    let path = TokenStore::default_path().unwrap_or_else(|| PathBuf::from(".octopus-gh-token"));
    Box::new(TokenStore::new(path))
}
