//! Pure derivation utilities used by the rendered views: display formatting,
//! repository filtering and sorting, and the demo-URL resolution policy.

use chrono::{DateTime, Duration, Utc};

use crate::models::{Event, LanguageBreakdown, Repository};
use std::collections::HashMap;

/// Compacts a count with K/M suffixes: 1500 -> "1.5K", 2500000 -> "2.5M".
pub fn format_number(num: u64) -> String {
    if num >= 1_000_000 {
        format!("{:.1}M", num as f64 / 1_000_000.0)
    } else if num >= 1_000 {
        format!("{:.1}K", num as f64 / 1_000.0)
    } else {
        num.to_string()
    }
}

/// 1024-based size ladder with up to two decimals, trailing zeros trimmed.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let exponent = (((bytes as f64).ln() / 1024f64.ln()).floor() as usize).min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);

    let mut formatted = format!("{:.2}", value);
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.pop();
    }

    format!("{} {}", formatted, UNITS[exponent])
}

pub fn format_relative_time(date: &DateTime<Utc>) -> String {
    relative_between(date, Utc::now())
}

fn relative_between(date: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now.signed_duration_since(*date);
    if delta <= Duration::seconds(59) {
        return "just now".to_string();
    }

    let minutes = delta.num_minutes();
    let hours = delta.num_hours();
    let days = delta.num_days();

    if minutes < 60 {
        ago(minutes, "minute")
    } else if hours < 24 {
        ago(hours, "hour")
    } else if days < 30 {
        ago(days, "day")
    } else if days < 365 {
        ago(days / 30, "month")
    } else {
        ago(days / 365, "year")
    }
}

fn ago(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", count, unit)
    }
}

/// "Jan 02, 2024"
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%b %d, %Y").to_string()
}

/// Integer percentage of `value` in `total`; 0 when the total is 0.
pub fn percentage(value: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((value as f64 / total as f64) * 100.0).round() as u32
}

/// Histogram rows sorted by descending byte count, with percentages over
/// the histogram's own total.
pub fn language_breakdown(languages: &HashMap<String, u64>) -> Vec<LanguageBreakdown> {
    let total: u64 = languages.values().sum();

    let mut breakdown: Vec<LanguageBreakdown> = languages
        .iter()
        .map(|(language, &bytes)| LanguageBreakdown {
            language: language.clone(),
            bytes,
            percentage: percentage(bytes, total),
        })
        .collect();

    breakdown.sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.language.cmp(&b.language)));
    breakdown
}

/// Case-insensitive substring match on name or description, AND exact match
/// on the selected language. Empty filters are no-ops.
pub fn filter_repositories(
    repositories: &[Repository],
    search_term: &str,
    language: &str,
) -> Vec<Repository> {
    let needle = search_term.to_lowercase();

    repositories
        .iter()
        .filter(|repo| {
            let matches_search = needle.is_empty()
                || repo.name.to_lowercase().contains(&needle)
                || repo
                    .description
                    .as_ref()
                    .map(|d| d.to_lowercase().contains(&needle))
                    .unwrap_or(false);

            let matches_language =
                language.is_empty() || repo.language.as_deref() == Some(language);

            matches_search && matches_language
        })
        .cloned()
        .collect()
}

/// Stable sort keyed by one of stars/forks/updated/created (descending) or
/// name (ascending). An unknown key returns the input order unchanged.
pub fn sort_repositories(mut repositories: Vec<Repository>, sort_by: &str) -> Vec<Repository> {
    match sort_by {
        "stars" => repositories.sort_by(|a, b| b.stargazers_count.cmp(&a.stargazers_count)),
        "forks" => repositories.sort_by(|a, b| b.forks_count.cmp(&a.forks_count)),
        "updated" => repositories.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
        "created" => repositories.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        "name" => repositories.sort_by(|a, b| a.name.cmp(&b.name)),
        _ => {}
    }
    repositories
}

/// Languages in use across the list, deduplicated and sorted.
pub fn unique_languages(repositories: &[Repository]) -> Vec<String> {
    let mut languages: Vec<String> = repositories
        .iter()
        .filter_map(|repo| repo.language.clone())
        .collect();

    languages.sort();
    languages.dedup();
    languages
}

/// Demo-URL policy, in priority order: an absolute homepage URL, a
/// netlify/vercel deployment mentioned in the description, then the
/// conventional GitHub Pages address.
pub fn demo_url(repo: &Repository) -> String {
    if let Some(homepage) = &repo.homepage {
        if homepage.starts_with("http") {
            return homepage.clone();
        }
    }

    if let Some(description) = &repo.description {
        for suffix in [".netlify.app", ".vercel.app"] {
            if let Some(url) = deployed_url_in(description, suffix) {
                return url;
            }
        }
    }

    match &repo.owner {
        Some(owner) => format!("https://{}.github.io/{}", owner.login, repo.name),
        None => format!("https://github.io/{}", repo.name),
    }
}

fn deployed_url_in(description: &str, suffix: &str) -> Option<String> {
    let start = description.find("https://")?;
    let end = start + description[start..].find(suffix)? + suffix.len();
    Some(description[start..end].to_string())
}

pub fn github_url(username: &str, repo_name: &str) -> String {
    format!("https://github.com/{}/{}", username, repo_name)
}

/// "owner/repo" -> "repo"
pub fn repo_short_name(full_name: &str) -> &str {
    full_name.split('/').nth(1).unwrap_or(full_name)
}

pub fn truncate_text(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_length).collect();
    format!("{}...", truncated)
}

/// Updated within the last month.
pub fn is_recently_updated(updated_at: &DateTime<Utc>) -> bool {
    *updated_at > Utc::now() - Duration::days(30)
}

/// Display label for a raw event type; unknown types pass through.
pub fn format_event_type(event_type: &str) -> &str {
    match event_type {
        "PushEvent" => "Pushed to",
        "CreateEvent" => "Created",
        "DeleteEvent" => "Deleted",
        "ForkEvent" => "Forked",
        "WatchEvent" => "Starred",
        "IssuesEvent" => "Issue",
        "PullRequestEvent" => "Pull Request",
        "ReleaseEvent" => "Released",
        other => other,
    }
}

/// One-line human-readable description of an activity event.
pub fn event_description(event: &Event) -> String {
    let repo_name = repo_short_name(&event.repo.name);

    match event.event_type.as_str() {
        "PushEvent" => {
            let count = event
                .payload
                .commits
                .as_ref()
                .map(|commits| commits.len())
                .unwrap_or(0);
            let noun = if count == 1 { "commit" } else { "commits" };
            format!("Pushed {} {} to {}", count, noun, repo_name)
        }
        "WatchEvent" => format!("Starred {}", repo_name),
        "ForkEvent" => format!("Forked {}", repo_name),
        "CreateEvent" => {
            let ref_type = event.payload.ref_type.as_deref().unwrap_or("repository");
            format!("Created {} in {}", ref_type, repo_name)
        }
        "IssuesEvent" => {
            let action = event.payload.action.as_deref().unwrap_or("updated");
            format!("{} issue in {}", action, repo_name)
        }
        "PullRequestEvent" => {
            let action = event.payload.action.as_deref().unwrap_or("updated");
            format!("{} pull request in {}", action, repo_name)
        }
        other => format!("{} {}", format_event_type(other), repo_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CommitAuthor, EventPayload, EventRepo, PushCommit, RepoOwner};

    fn repo(name: &str, stars: u32, forks: u32, updated: &str) -> Repository {
        Repository {
            name: name.to_string(),
            description: None,
            html_url: format!("https://github.com/octocat/{}", name),
            homepage: None,
            language: None,
            stargazers_count: stars,
            forks_count: forks,
            watchers_count: 0,
            size: 0,
            topics: Vec::new(),
            owner: Some(RepoOwner {
                login: "octocat".to_string(),
            }),
            created_at: None,
            updated_at: updated.parse().unwrap(),
            private: false,
            license: None,
        }
    }

    fn push_event(repo_full_name: &str, commit_count: usize) -> Event {
        let commits = (0..commit_count)
            .map(|i| PushCommit {
                sha: format!("sha{}", i),
                message: "change".to_string(),
                author: CommitAuthor {
                    name: "Octo Cat".to_string(),
                    email: "octo@example.com".to_string(),
                },
            })
            .collect();

        Event {
            id: "1".to_string(),
            event_type: "PushEvent".to_string(),
            repo: EventRepo {
                name: repo_full_name.to_string(),
            },
            payload: EventPayload {
                commits: Some(commits),
                ..Default::default()
            },
            created_at: "2024-06-01T00:00:00Z".parse().unwrap(),
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1.0K");
        assert_eq!(format_number(1500), "1.5K");
        assert_eq!(format_number(2_500_000), "2.5M");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 Bytes");
        assert_eq!(format_bytes(42), "42 Bytes");
        assert_eq!(format_bytes(1024), "1 KB");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(1_048_576), "1 MB");
        assert_eq!(format_bytes(2_621_440), "2.5 MB");
        assert_eq!(format_bytes(1_073_741_824), "1 GB");
    }

    #[test]
    fn test_relative_time_ladder() {
        let now: DateTime<Utc> = "2024-06-01T12:00:00Z".parse().unwrap();

        let cases = [
            ("2024-06-01T11:59:30Z", "just now"),
            ("2024-06-01T11:55:00Z", "5 minutes ago"),
            ("2024-06-01T10:30:00Z", "1 hour ago"),
            ("2024-05-29T12:00:00Z", "3 days ago"),
            ("2024-03-01T12:00:00Z", "3 months ago"),
            ("2022-06-01T12:00:00Z", "2 years ago"),
        ];

        for (date, expected) in cases {
            let date: DateTime<Utc> = date.parse().unwrap();
            assert_eq!(relative_between(&date, now), expected);
        }
    }

    #[test]
    fn test_format_date() {
        let date: DateTime<Utc> = "2024-01-02T15:04:05Z".parse().unwrap();
        assert_eq!(format_date(&date), "Jan 02, 2024");
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
        assert_eq!(percentage(50, 200), 25);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
    }

    #[test]
    fn test_language_breakdown_sums_to_100_within_rounding() {
        let languages = HashMap::from([
            ("Rust".to_string(), 600u64),
            ("Shell".to_string(), 300u64),
            ("Makefile".to_string(), 100u64),
        ]);

        let breakdown = language_breakdown(&languages);
        assert_eq!(breakdown[0].language, "Rust");
        assert_eq!(breakdown[0].percentage, 60);
        assert_eq!(breakdown[1].percentage, 30);
        assert_eq!(breakdown[2].percentage, 10);

        let total: u32 = breakdown.iter().map(|b| b.percentage).sum();
        assert!((99..=101).contains(&total));
    }

    #[test]
    fn test_filter_empty_filters_are_noops() {
        let repos = vec![
            repo("foo", 1, 0, "2024-01-01T00:00:00Z"),
            repo("bar", 2, 0, "2024-01-01T00:00:00Z"),
        ];

        assert_eq!(filter_repositories(&repos, "", "").len(), repos.len());
    }

    #[test]
    fn test_filter_matches_name_or_description() {
        let mut with_desc = repo("dotfiles", 0, 0, "2024-01-01T00:00:00Z");
        with_desc.description = Some("My Vim Configuration".to_string());
        let repos = vec![
            repo("vim-plugin", 0, 0, "2024-01-01T00:00:00Z"),
            with_desc,
            repo("unrelated", 0, 0, "2024-01-01T00:00:00Z"),
        ];

        let filtered = filter_repositories(&repos, "VIM", "");
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| {
            r.name.to_lowercase().contains("vim")
                || r.description
                    .as_ref()
                    .map(|d| d.to_lowercase().contains("vim"))
                    .unwrap_or(false)
        }));
    }

    #[test]
    fn test_filter_language_is_exact_and_composes() {
        let mut rust_repo = repo("cli", 0, 0, "2024-01-01T00:00:00Z");
        rust_repo.language = Some("Rust".to_string());
        let mut js_repo = repo("cli-web", 0, 0, "2024-01-01T00:00:00Z");
        js_repo.language = Some("JavaScript".to_string());
        let repos = vec![rust_repo, js_repo];

        let filtered = filter_repositories(&repos, "cli", "Rust");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "cli");

        // "rust" != "Rust": exact match only
        assert!(filter_repositories(&repos, "", "rust").is_empty());
    }

    #[test]
    fn test_sort_by_stars_and_updated() {
        let foo = repo("foo", 10, 2, "2024-01-01T00:00:00Z");
        let bar = repo("bar", 50, 1, "2024-06-01T00:00:00Z");

        let by_stars = sort_repositories(vec![foo.clone(), bar.clone()], "stars");
        assert_eq!(by_stars[0].name, "bar");
        assert_eq!(by_stars[1].name, "foo");

        let by_updated = sort_repositories(vec![foo, bar], "updated");
        assert_eq!(by_updated[0].name, "bar");
        assert_eq!(by_updated[1].name, "foo");
    }

    #[test]
    fn test_sort_by_name_forks_created() {
        let mut old = repo("zeta", 0, 9, "2024-01-01T00:00:00Z");
        old.created_at = Some("2020-01-01T00:00:00Z".parse().unwrap());
        let mut new = repo("alpha", 0, 3, "2024-01-01T00:00:00Z");
        new.created_at = Some("2023-01-01T00:00:00Z".parse().unwrap());

        let by_name = sort_repositories(vec![old.clone(), new.clone()], "name");
        assert_eq!(by_name[0].name, "alpha");

        let by_forks = sort_repositories(vec![new.clone(), old.clone()], "forks");
        assert_eq!(by_forks[0].name, "zeta");

        let by_created = sort_repositories(vec![old, new], "created");
        assert_eq!(by_created[0].name, "alpha");
    }

    #[test]
    fn test_sort_is_stable_and_total() {
        let repos = vec![
            repo("first", 5, 0, "2024-01-01T00:00:00Z"),
            repo("second", 5, 0, "2024-01-01T00:00:00Z"),
            repo("third", 9, 0, "2024-01-01T00:00:00Z"),
        ];

        let sorted = sort_repositories(repos.clone(), "stars");
        assert_eq!(sorted.len(), repos.len());
        assert_eq!(sorted[0].name, "third");
        // Equal keys keep their original order
        assert_eq!(sorted[1].name, "first");
        assert_eq!(sorted[2].name, "second");

        // Unknown key is a passthrough
        let untouched = sort_repositories(repos.clone(), "bogus");
        let names: Vec<_> = untouched.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_demo_url_prefers_homepage() {
        let mut r = repo("foo", 0, 0, "2024-01-01T00:00:00Z");
        r.homepage = Some("https://example.com".to_string());
        r.description = Some("see https://foo.netlify.app".to_string());
        assert_eq!(demo_url(&r), "https://example.com");
    }

    #[test]
    fn test_demo_url_finds_deployment_in_description() {
        let mut r = repo("foo", 0, 0, "2024-01-01T00:00:00Z");
        r.description = Some("Demo: https://cool-site.netlify.app for now".to_string());
        assert_eq!(demo_url(&r), "https://cool-site.netlify.app");

        r.description = Some("Live at https://foo-web.vercel.app".to_string());
        assert_eq!(demo_url(&r), "https://foo-web.vercel.app");
    }

    #[test]
    fn test_demo_url_falls_back_to_github_pages() {
        let r = repo("foo", 0, 0, "2024-01-01T00:00:00Z");
        assert_eq!(demo_url(&r), "https://octocat.github.io/foo");

        let mut ownerless = repo("foo", 0, 0, "2024-01-01T00:00:00Z");
        ownerless.owner = None;
        assert_eq!(demo_url(&ownerless), "https://github.io/foo");
    }

    #[test]
    fn test_unique_languages_sorted_and_deduplicated() {
        let mut a = repo("a", 0, 0, "2024-01-01T00:00:00Z");
        a.language = Some("Rust".to_string());
        let mut b = repo("b", 0, 0, "2024-01-01T00:00:00Z");
        b.language = Some("Go".to_string());
        let mut c = repo("c", 0, 0, "2024-01-01T00:00:00Z");
        c.language = Some("Rust".to_string());
        let d = repo("d", 0, 0, "2024-01-01T00:00:00Z");

        assert_eq!(unique_languages(&[a, b, c, d]), vec!["Go", "Rust"]);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("a very long description", 6), "a very...");
    }

    #[test]
    fn test_repo_short_name() {
        assert_eq!(repo_short_name("octocat/foo"), "foo");
        assert_eq!(repo_short_name("standalone"), "standalone");
    }

    #[test]
    fn test_github_url() {
        assert_eq!(
            github_url("octocat", "foo"),
            "https://github.com/octocat/foo"
        );
    }

    #[test]
    fn test_event_descriptions() {
        assert_eq!(
            event_description(&push_event("octocat/foo", 3)),
            "Pushed 3 commits to foo"
        );
        assert_eq!(
            event_description(&push_event("octocat/foo", 1)),
            "Pushed 1 commit to foo"
        );

        let mut starred = push_event("octocat/bar", 0);
        starred.event_type = "WatchEvent".to_string();
        starred.payload = EventPayload::default();
        assert_eq!(event_description(&starred), "Starred bar");

        let mut created = push_event("octocat/baz", 0);
        created.event_type = "CreateEvent".to_string();
        created.payload = EventPayload {
            ref_type: Some("branch".to_string()),
            ..Default::default()
        };
        assert_eq!(event_description(&created), "Created branch in baz");

        let mut issue = push_event("octocat/baz", 0);
        issue.event_type = "IssuesEvent".to_string();
        issue.payload = EventPayload {
            action: Some("opened".to_string()),
            ..Default::default()
        };
        assert_eq!(event_description(&issue), "opened issue in baz");

        let mut unknown = push_event("octocat/baz", 0);
        unknown.event_type = "GollumEvent".to_string();
        unknown.payload = EventPayload::default();
        assert_eq!(event_description(&unknown), "GollumEvent baz");
    }

    #[test]
    fn test_format_event_type_labels() {
        assert_eq!(format_event_type("PushEvent"), "Pushed to");
        assert_eq!(format_event_type("WatchEvent"), "Starred");
        assert_eq!(format_event_type("ReleaseEvent"), "Released");
        assert_eq!(format_event_type("SomethingEvent"), "SomethingEvent");
    }
}
