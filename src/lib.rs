pub mod config;
pub mod error;
pub mod fetch;
pub mod format;
pub mod github;
pub mod models;

pub use config::Config;
pub use error::{Error, Result};
pub use fetch::{
    ActivityQuery, Dashboard, DashboardQuery, FetchState, PinnedQuery, ProfileQuery, ProjectDetail,
    ProjectQuery, ReposQuery, StatsQuery,
};
pub use github::{EventListOptions, GitHubClient, RepoListOptions, README_PLACEHOLDER};
