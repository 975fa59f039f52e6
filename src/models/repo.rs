use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Common repository shape shared by both provenances. REST responses
/// deserialize onto it directly; pinned items from the GraphQL query are
/// converted into it, with the fields that query cannot supply left at
/// their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    #[serde(default)]
    pub watchers_count: u32,
    /// Size in kilobytes, as reported by the REST API.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub owner: Option<RepoOwner>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub license: Option<License>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(default)]
    pub spdx_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contributor {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    pub contributions: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_repository_deserializes_with_missing_optionals() {
        let json = r#"{
            "name": "foo",
            "description": null,
            "html_url": "https://github.com/octocat/foo",
            "stargazers_count": 10,
            "forks_count": 2,
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        assert_eq!(repo.name, "foo");
        assert!(repo.description.is_none());
        assert!(repo.homepage.is_none());
        assert!(repo.language.is_none());
        assert_eq!(repo.watchers_count, 0);
        assert_eq!(repo.size, 0);
        assert!(repo.topics.is_empty());
        assert!(repo.owner.is_none());
        assert!(repo.created_at.is_none());
        assert!(!repo.private);
    }

    #[test]
    fn test_serialized_shape_keeps_optional_fields_as_null() {
        let json = r#"{
            "name": "foo",
            "html_url": "https://github.com/octocat/foo",
            "stargazers_count": 0,
            "forks_count": 0,
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;

        let repo: Repository = serde_json::from_str(json).unwrap();
        let value = serde_json::to_value(&repo).unwrap();
        assert!(value.get("description").unwrap().is_null());
        assert!(value.get("homepage").unwrap().is_null());
        assert!(value.get("language").unwrap().is_null());
        assert!(value.get("owner").unwrap().is_null());
    }
}
