pub mod client;
pub mod graphql;

pub use client::{EventListOptions, GitHubClient, RepoListOptions, README_PLACEHOLDER};
