use serde::Serialize;

use crate::error::Error;
use crate::fetch::query::FetchState;
use crate::github::{EventListOptions, GitHubClient, RepoListOptions};
use crate::models::{Event, Profile, Repository, UserStats};

/// The combined home-page bundle: settled only once all five fetches have
/// resolved.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub profile: Profile,
    pub repositories: Vec<Repository>,
    pub pinned_repos: Vec<Repository>,
    pub stats: UserStats,
    pub activity: Vec<Event>,
}

pub struct DashboardQuery {
    username: String,
    state: FetchState<Dashboard>,
}

impl DashboardQuery {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            state: FetchState::Loading,
        }
    }

    pub fn state(&self) -> &FetchState<Dashboard> {
        &self.state
    }

    /// All-or-nothing join over the five dashboard resources: the first
    /// failure becomes the bundle's error and the remaining fetches are
    /// abandoned, their results discarded even if they would have
    /// succeeded.
    pub async fn run(&mut self, client: &GitHubClient) -> &FetchState<Dashboard> {
        if self.username.is_empty() {
            return &self.state;
        }
        self.state = FetchState::Loading;

        let username = self.username.as_str();
        let repo_options = RepoListOptions {
            per_page: 50,
            ..Default::default()
        };
        let event_options = EventListOptions {
            per_page: 20,
            ..Default::default()
        };

        let joined = tokio::try_join!(
            client.get_user(username),
            client.get_user_repos(username, &repo_options),
            async { Ok::<_, Error>(client.get_pinned_repos(username).await) },
            client.get_user_stats(username),
            client.get_user_events(username, &event_options),
        );

        self.state = match joined {
            Ok((profile, repositories, pinned_repos, stats, activity)) => {
                FetchState::Ready(Dashboard {
                    profile,
                    repositories,
                    pinned_repos,
                    stats,
                    activity,
                })
            }
            Err(err) => {
                tracing::warn!("Dashboard fetch failed: {}", err);
                FetchState::Failed(err.to_string())
            }
        };
        &self.state
    }

    pub fn set_username(&mut self, username: impl Into<String>) {
        self.username = username.into();
        self.state = FetchState::Loading;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn test_empty_username_performs_no_fetch() {
        let config = Config::new("", None);
        let client = GitHubClient::new(&config).unwrap();

        let mut query = DashboardQuery::new("");
        let state = query.run(&client).await;
        assert!(state.is_loading());
        assert!(state.value().is_none());
        assert!(state.error().is_none());
    }
}
