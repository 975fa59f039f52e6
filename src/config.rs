use crate::error::{Error, Result};
use std::env;

/// Runtime configuration, resolved once at startup and passed into the
/// client explicitly. The username is the identity key for every fetch;
/// the token only unlocks the GraphQL pinned-items query and raises rate
/// limits, so it stays optional.
#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub token: Option<String>,
    pub language_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_env_with(None)
    }

    /// Like `from_env`, but with an explicit username taking precedence
    /// over the environment.
    pub fn from_env_with(username_override: Option<String>) -> Result<Self> {
        let username = username_override
            .or_else(|| env::var("GITHUB_USERNAME").ok())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                Error::Config(
                    "GITHUB_USERNAME environment variable not set; set it to the profile to render"
                        .to_string(),
                )
            })?;

        let token = env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());

        let language_concurrency = env::var("CONCURRENCY_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            username,
            token,
            language_concurrency,
        })
    }

    pub fn new(username: impl Into<String>, token: Option<String>) -> Self {
        Self {
            username: username.into(),
            token,
            language_concurrency: 10,
        }
    }
}
