use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{RepoOwner, Repository};

pub const GRAPHQL_URL: &str = "https://api.github.com/graphql";

const PINNED_ITEMS_QUERY: &str = r#"
query($login: String!) {
  user(login: $login) {
    pinnedItems(first: 6, types: REPOSITORY) {
      nodes {
        ... on Repository {
          name
          description
          url
          stargazerCount
          forkCount
          primaryLanguage {
            name
          }
          updatedAt
          isPrivate
          owner {
            login
          }
          topics(first: 10) {
            nodes {
              topic {
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: PinnedVariables<'a>,
}

#[derive(Serialize)]
struct PinnedVariables<'a> {
    login: &'a str,
}

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct PinnedData {
    user: Option<PinnedUser>,
}

#[derive(Deserialize)]
struct PinnedUser {
    #[serde(rename = "pinnedItems")]
    pinned_items: PinnedItems,
}

#[derive(Deserialize)]
struct PinnedItems {
    nodes: Vec<PinnedNode>,
}

/// Repository node as the pinned-items query returns it, before renaming
/// into the common shape.
#[derive(Debug, Deserialize)]
pub struct PinnedNode {
    pub name: String,
    pub description: Option<String>,
    pub url: String,
    #[serde(rename = "stargazerCount")]
    pub stargazer_count: u32,
    #[serde(rename = "forkCount")]
    pub fork_count: u32,
    #[serde(rename = "primaryLanguage")]
    pub primary_language: Option<PrimaryLanguage>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "isPrivate")]
    pub is_private: bool,
    pub owner: PinnedOwner,
    #[serde(default)]
    pub topics: Option<TopicConnection>,
}

#[derive(Debug, Deserialize)]
pub struct PrimaryLanguage {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PinnedOwner {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct TopicConnection {
    pub nodes: Vec<TopicNode>,
}

#[derive(Debug, Deserialize)]
pub struct TopicNode {
    pub topic: TopicName,
}

#[derive(Debug, Deserialize)]
pub struct TopicName {
    pub name: String,
}

impl From<PinnedNode> for Repository {
    fn from(node: PinnedNode) -> Self {
        Repository {
            name: node.name,
            description: node.description,
            html_url: node.url,
            homepage: None,
            language: node.primary_language.map(|l| l.name),
            stargazers_count: node.stargazer_count,
            forks_count: node.fork_count,
            watchers_count: 0,
            size: 0,
            topics: node
                .topics
                .map(|t| t.nodes.into_iter().map(|n| n.topic.name).collect())
                .unwrap_or_default(),
            owner: Some(RepoOwner {
                login: node.owner.login,
            }),
            created_at: None,
            updated_at: node.updated_at,
            private: node.is_private,
            license: None,
        }
    }
}

pub(crate) async fn fetch_pinned_repos(
    client: &Client,
    url: &str,
    token: &str,
    login: &str,
) -> Result<Vec<Repository>> {
    let body = GraphQlRequest {
        query: PINNED_ITEMS_QUERY,
        variables: PinnedVariables { login },
    };

    let response = client.post(url).bearer_auth(token).json(&body).send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::GraphQl(format!(
            "pinned items query failed: {} - {}",
            status, body
        )));
    }

    let parsed: GraphQlResponse<PinnedData> = response.json().await?;

    if let Some(errors) = parsed.errors {
        let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
        return Err(Error::GraphQl(messages.join("; ")));
    }

    let nodes = parsed
        .data
        .and_then(|d| d.user)
        .map(|u| u.pinned_items.nodes)
        .unwrap_or_default();

    Ok(nodes.into_iter().map(Repository::from).collect())
}
