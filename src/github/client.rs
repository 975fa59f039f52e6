use std::collections::HashMap;
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{header, Client};
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::github::graphql;
use crate::models::{merge_language_histogram, Contributor, Event, Profile, Repository, UserStats};

/// Rendered in place of a readme that is absent or cannot be decoded.
pub const README_PLACEHOLDER: &str = "# No README available";

/// Server-side listing parameters for the repositories endpoint.
#[derive(Debug, Clone)]
pub struct RepoListOptions {
    pub sort: String,
    pub direction: String,
    pub per_page: u32,
    pub page: u32,
    pub repo_type: String,
}

impl Default for RepoListOptions {
    fn default() -> Self {
        Self {
            sort: "updated".to_string(),
            direction: "desc".to_string(),
            per_page: 30,
            page: 1,
            repo_type: "owner".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventListOptions {
    pub per_page: u32,
    pub page: u32,
}

impl Default for EventListOptions {
    fn default() -> Self {
        Self {
            per_page: 30,
            page: 1,
        }
    }
}

pub struct GitHubClient {
    client: Client,
    token: Option<String>,
    base_url: String,
    graphql_url: String,
    language_concurrency: usize,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("gitfolio/0.1"),
        );
        if let Some(token) = &config.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            token: config.token.clone(),
            base_url: "https://api.github.com".to_string(),
            graphql_url: graphql::GRAPHQL_URL.to_string(),
            language_concurrency: config.language_concurrency,
        })
    }

    pub async fn get_user(&self, username: &str) -> Result<Profile> {
        let url = format!("{}/users/{}", self.base_url, username);
        tracing::info!("Fetching profile: {}", username);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::UserNotFound(username.to_string()));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch user {}: {} - {}",
                username, status, body
            )));
        }

        Ok(response.json().await?)
    }

    pub async fn get_user_repos(
        &self,
        username: &str,
        options: &RepoListOptions,
    ) -> Result<Vec<Repository>> {
        let url = format!("{}/users/{}/repos", self.base_url, username);
        tracing::info!("Fetching repositories for: {}", username);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("sort", options.sort.as_str()),
                ("direction", options.direction.as_str()),
                ("type", options.repo_type.as_str()),
            ])
            .query(&[("per_page", options.per_page), ("page", options.page)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch repositories for {}: {} - {}",
                username, status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Pinned items come from the GraphQL endpoint, which needs a token.
    /// Without one, or when the query itself fails, this degrades to an
    /// empty list instead of an error so the surrounding view can simply
    /// render nothing.
    pub async fn get_pinned_repos(&self, username: &str) -> Vec<Repository> {
        let token = match self.token.as_deref() {
            Some(token) => token,
            None => {
                tracing::warn!("GitHub token required for pinned repositories");
                return Vec::new();
            }
        };

        tracing::info!("Fetching pinned repositories for: {}", username);
        match graphql::fetch_pinned_repos(&self.client, &self.graphql_url, token, username).await {
            Ok(repos) => repos,
            Err(err) => {
                tracing::warn!("Pinned repositories unavailable: {}", err);
                Vec::new()
            }
        }
    }

    pub async fn get_repo(&self, owner: &str, repo: &str) -> Result<Repository> {
        let url = format!("{}/repos/{}/{}", self.base_url, owner, repo);
        tracing::info!("Fetching repository: {}/{}", owner, repo);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::RepoNotFound(format!("{}/{}", owner, repo)));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch repository {}/{}: {} - {}",
                owner, repo, status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Best-effort readme fetch: decoded markdown, or the placeholder when
    /// the repository has no readme or the content fails to decode.
    pub async fn get_repo_readme(&self, owner: &str, repo: &str) -> String {
        match self.try_get_repo_readme(owner, repo).await {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Readme unavailable for {}/{}: {}", owner, repo, err);
                README_PLACEHOLDER.to_string()
            }
        }
    }

    async fn try_get_repo_readme(&self, owner: &str, repo: &str) -> Result<String> {
        let url = format!("{}/repos/{}/{}/readme", self.base_url, owner, repo);
        tracing::debug!("Fetching readme: {}/{}", owner, repo);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "Failed to fetch readme for {}/{}: {}",
                owner,
                repo,
                response.status()
            )));
        }

        let readme: ReadmeResponse = response.json().await?;
        decode_readme(&readme.content)
    }

    /// Best-effort language histogram; empty on any failure.
    pub async fn get_repo_languages(&self, owner: &str, repo: &str) -> HashMap<String, u64> {
        match self.try_get_repo_languages(owner, repo).await {
            Ok(languages) => languages,
            Err(err) => {
                tracing::warn!("Languages unavailable for {}/{}: {}", owner, repo, err);
                HashMap::new()
            }
        }
    }

    async fn try_get_repo_languages(&self, owner: &str, repo: &str) -> Result<HashMap<String, u64>> {
        let url = format!("{}/repos/{}/{}/languages", self.base_url, owner, repo);
        tracing::debug!("Fetching languages: {}/{}", owner, repo);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "Failed to fetch languages for {}/{}: {}",
                owner,
                repo,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// Best-effort contributor list; empty on any failure.
    pub async fn get_repo_contributors(&self, owner: &str, repo: &str) -> Vec<Contributor> {
        match self.try_get_repo_contributors(owner, repo).await {
            Ok(contributors) => contributors,
            Err(err) => {
                tracing::warn!("Contributors unavailable for {}/{}: {}", owner, repo, err);
                Vec::new()
            }
        }
    }

    async fn try_get_repo_contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>> {
        let url = format!("{}/repos/{}/{}/contributors", self.base_url, owner, repo);
        tracing::debug!("Fetching contributors: {}/{}", owner, repo);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::GitHubApi(format!(
                "Failed to fetch contributors for {}/{}: {}",
                owner,
                repo,
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    pub async fn get_user_events(
        &self,
        username: &str,
        options: &EventListOptions,
    ) -> Result<Vec<Event>> {
        let url = format!("{}/users/{}/events", self.base_url, username);
        tracing::info!("Fetching events for: {}", username);

        let response = self
            .client
            .get(&url)
            .query(&[("per_page", options.per_page), ("page", options.page)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::GitHubApi(format!(
                "Failed to fetch events for {}: {} - {}",
                username, status, body
            )));
        }

        Ok(response.json().await?)
    }

    /// Derived aggregate over the profile and up to 100 repositories. The
    /// initial profile/repository pair is required; the per-repository
    /// language fetches degrade to an empty contribution on failure.
    pub async fn get_user_stats(&self, username: &str) -> Result<UserStats> {
        tracing::info!("Aggregating stats for: {}", username);

        let repo_options = RepoListOptions {
            per_page: 100,
            ..Default::default()
        };
        let (profile, repos) = tokio::try_join!(
            self.get_user(username),
            self.get_user_repos(username, &repo_options)
        )?;

        let total_stars = repos.iter().map(|r| r.stargazers_count as u64).sum();
        let total_forks = repos.iter().map(|r| r.forks_count as u64).sum();
        let languages = self.fetch_language_totals(username, &repos).await;

        Ok(UserStats {
            total_repos: profile.public_repos,
            total_stars,
            total_forks,
            followers: profile.followers,
            following: profile.following,
            languages,
        })
    }

    async fn fetch_language_totals(
        &self,
        username: &str,
        repos: &[Repository],
    ) -> HashMap<String, u64> {
        let semaphore = Arc::new(Semaphore::new(self.language_concurrency));

        let pb = ProgressBar::new(repos.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} repos")
                .unwrap()
                .progress_chars("#>-"),
        );

        let mut language_futures = Vec::new();

        for repo in repos {
            let sem = semaphore.clone();
            let pb_clone = pb.clone();
            let name = repo.name.clone();

            language_futures.push(async move {
                let _permit = sem.acquire().await.ok()?;
                let languages = self.get_repo_languages(username, &name).await;
                pb_clone.inc(1);
                Some(languages)
            });
        }

        let results = join_all(language_futures).await;
        pb.finish_and_clear();

        let mut totals = HashMap::new();
        for languages in results.into_iter().flatten() {
            merge_language_histogram(&mut totals, languages);
        }
        totals
    }
}

#[derive(serde::Deserialize)]
struct ReadmeResponse {
    content: String,
}

fn decode_readme(content: &str) -> Result<String> {
    // GitHub wraps the base64 payload at 60 columns.
    let compact: String = content.split_whitespace().collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .map_err(|e| Error::ParseError(format!("invalid readme encoding: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| Error::ParseError(format!("readme is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_readme_handles_line_wrapped_base64() {
        // "# Hello\nworld" encoded and wrapped the way the API returns it
        let wrapped = "IyBIZWxs\nbwp3b3Js\nZA==\n";
        assert_eq!(decode_readme(wrapped).unwrap(), "# Hello\nworld");
    }

    #[test]
    fn test_decode_readme_rejects_garbage() {
        assert!(decode_readme("not base64 at all!!!").is_err());
    }

    #[test]
    fn test_repo_list_defaults() {
        let options = RepoListOptions::default();
        assert_eq!(options.sort, "updated");
        assert_eq!(options.direction, "desc");
        assert_eq!(options.per_page, 30);
        assert_eq!(options.page, 1);
        assert_eq!(options.repo_type, "owner");
    }

    #[tokio::test]
    async fn test_pinned_repos_without_token_is_empty() {
        let config = Config::new("octocat", None);
        let client = GitHubClient::new(&config).unwrap();
        // No credential configured: graceful degradation, no network call.
        let pinned = client.get_pinned_repos("octocat").await;
        assert!(pinned.is_empty());
    }
}
