use std::collections::HashMap;

use serde::Serialize;

use crate::fetch::query::{settle, FetchState};
use crate::github::{EventListOptions, GitHubClient, RepoListOptions};
use crate::models::{Contributor, Event, Profile, Repository, UserStats};

/// Query object for one profile. Holds the identity key and the tri-state
/// result; `run` issues the fetch and settles the state, and changing the
/// key resets it to loading until the caller re-issues. An empty key means
/// no fetch at all: the query stays in its initial loading state.
///
/// The other per-resource queries below follow the same contract.
pub struct ProfileQuery {
    username: String,
    state: FetchState<Profile>,
}

impl ProfileQuery {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<Profile> {
        &self.state
    }

    pub async fn run(&mut self, client: &GitHubClient) -> &FetchState<Profile> {
        if self.username.is_empty() {
            return &self.state;
        }
        self.state = FetchState::Loading;
        self.state = settle("Profile fetch", client.get_user(&self.username)).await;
        &self.state
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.state = FetchState::Loading;
    }
}

pub struct ReposQuery {
    username: String,
    options: RepoListOptions,
    state: FetchState<Vec<Repository>>,
}

impl ReposQuery {
    pub fn new(username: impl Into<String>, options: RepoListOptions) -> Self {
        Self {
            username: username.into(),
            options,
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Repository>> {
        &self.state
    }

    pub async fn run(&mut self, client: &GitHubClient) -> &FetchState<Vec<Repository>> {
        if self.username.is_empty() {
            return &self.state;
        }
        self.state = FetchState::Loading;
        self.state = settle(
            "Repository fetch",
            client.get_user_repos(&self.username, &self.options),
        )
        .await;
        &self.state
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.state = FetchState::Loading;
    }
}

pub struct PinnedQuery {
    username: String,
    state: FetchState<Vec<Repository>>,
}

impl PinnedQuery {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Repository>> {
        &self.state
    }

    /// Always settles ready: the pinned fetch degrades to an empty list
    /// rather than erroring.
    pub async fn run(&mut self, client: &GitHubClient) -> &FetchState<Vec<Repository>> {
        if self.username.is_empty() {
            return &self.state;
        }
        self.state = FetchState::Loading;
        self.state = FetchState::Ready(client.get_pinned_repos(&self.username).await);
        &self.state
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.state = FetchState::Loading;
    }
}

pub struct StatsQuery {
    username: String,
    state: FetchState<UserStats>,
}

impl StatsQuery {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<UserStats> {
        &self.state
    }

    pub async fn run(&mut self, client: &GitHubClient) -> &FetchState<UserStats> {
        if self.username.is_empty() {
            return &self.state;
        }
        self.state = FetchState::Loading;
        self.state = settle("Stats aggregation", client.get_user_stats(&self.username)).await;
        &self.state
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.state = FetchState::Loading;
    }
}

pub struct ActivityQuery {
    username: String,
    options: EventListOptions,
    state: FetchState<Vec<Event>>,
}

impl ActivityQuery {
    pub fn new(username: impl Into<String>, options: EventListOptions) -> Self {
        Self {
            username: username.into(),
            options,
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<Vec<Event>> {
        &self.state
    }

    pub async fn run(&mut self, client: &GitHubClient) -> &FetchState<Vec<Event>> {
        if self.username.is_empty() {
            return &self.state;
        }
        self.state = FetchState::Loading;
        self.state = settle(
            "Activity fetch",
            client.get_user_events(&self.username, &self.options),
        )
        .await;
        &self.state
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.state = FetchState::Loading;
    }
}

/// Everything the project detail page needs. Only the repository details
/// are required; readme, languages and contributors are best-effort
/// enrichment and fall back to their placeholders.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
    pub repository: Repository,
    pub readme: String,
    pub languages: HashMap<String, u64>,
    pub contributors: Vec<Contributor>,
}

pub struct ProjectQuery {
    username: String,
    repo_name: String,
    state: FetchState<ProjectDetail>,
}

impl ProjectQuery {
    pub fn new(username: impl Into<String>, repo_name: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            repo_name: repo_name.into(),
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<ProjectDetail> {
        &self.state
    }

    /// Issues the four detail calls together. The join fails only if the
    /// details call fails; the three enrichment calls have already been
    /// coalesced to defaults by the client.
    pub async fn run(&mut self, client: &GitHubClient) -> &FetchState<ProjectDetail> {
        if self.username.is_empty() || self.repo_name.is_empty() {
            return &self.state;
        }
        self.state = FetchState::Loading;

        let (repository, readme, languages, contributors) = tokio::join!(
            client.get_repo(&self.username, &self.repo_name),
            client.get_repo_readme(&self.username, &self.repo_name),
            client.get_repo_languages(&self.username, &self.repo_name),
            client.get_repo_contributors(&self.username, &self.repo_name),
        );

        self.state = match repository {
            Ok(repository) => FetchState::Ready(ProjectDetail {
                repository,
                readme,
                languages,
                contributors,
            }),
            Err(err) => {
                tracing::warn!("Project detail fetch failed: {}", err);
                FetchState::Failed(err.to_string())
            }
        };
        &self.state
    }

    pub fn set_repo(&mut self, repo_name: impl Into<String>) {
        self.repo_name = repo_name.into();
        self.state = FetchState::Loading;
    }
}
