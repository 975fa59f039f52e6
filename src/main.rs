use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gitfolio::models::{Event, Profile, Repository, UserStats};
use gitfolio::{
    format, ActivityQuery, Config, Dashboard, DashboardQuery, EventListOptions, FetchState,
    GitHubClient, PinnedQuery, ProfileQuery, ProjectDetail, ProjectQuery, RepoListOptions,
    ReposQuery, StatsQuery,
};

#[derive(Parser, Debug)]
#[command(name = "gitfolio")]
#[command(version = "0.1.0")]
#[command(about = "Render a GitHub profile, its projects and activity in the terminal")]
struct Args {
    /// GitHub username (overrides GITHUB_USERNAME)
    #[arg(short, long)]
    username: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    page: Page,
}

#[derive(Subcommand, Debug)]
enum Page {
    /// Profile overview with aggregated stats
    Profile,
    /// Repository list with pinned items, filtering and sorting
    Projects {
        /// Substring to match against name or description
        #[arg(short, long, default_value = "")]
        search: String,
        /// Only repositories whose primary language matches exactly
        #[arg(short, long, default_value = "")]
        language: String,
        /// Sort key: stars, forks, updated, created, name
        #[arg(long, default_value = "updated")]
        sort: String,
    },
    /// Detail view for one repository
    Project {
        /// Repository name
        name: String,
    },
    /// Recent public activity feed
    Activity {
        /// Only events of this raw type (e.g. PushEvent, WatchEvent)
        #[arg(short, long)]
        event_type: Option<String>,
    },
    /// All dashboard resources at once
    Dashboard,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gitfolio=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match Config::from_env_with(args.username.clone()) {
        Ok(config) => config,
        Err(err) => {
            // Not recoverable at runtime: render setup instructions instead
            // of an error panel.
            println!("{}", err);
            println!("Example: GITHUB_USERNAME=octocat gitfolio profile");
            return Ok(());
        }
    };

    let client = GitHubClient::new(&config)?;
    let username = config.username.clone();
    let as_json = args.format == "json";

    match args.page {
        Page::Profile => {
            let mut profile_query = ProfileQuery::new(&username);
            let mut stats_query = StatsQuery::new(&username);
            profile_query.run(&client).await;
            stats_query.run(&client).await;

            match (profile_query.state(), stats_query.state()) {
                (FetchState::Ready(profile), FetchState::Ready(stats)) => {
                    if as_json {
                        let bundle =
                            serde_json::json!({ "profile": profile, "stats": stats });
                        println!("{}", serde_json::to_string_pretty(&bundle)?);
                    } else {
                        print!("{}", render_profile(profile, stats));
                    }
                }
                (state, stats_state) => {
                    render_failure(state.error().or(stats_state.error()));
                }
            }
        }
        Page::Projects {
            search,
            language,
            sort,
        } => {
            let mut repos_query = ReposQuery::new(&username, RepoListOptions::default());
            let mut pinned_query = PinnedQuery::new(&username);
            repos_query.run(&client).await;
            pinned_query.run(&client).await;

            match repos_query.state() {
                FetchState::Ready(repositories) => {
                    let pinned = pinned_query
                        .state()
                        .value()
                        .cloned()
                        .unwrap_or_default();
                    let repositories = format::sort_repositories(
                        format::filter_repositories(repositories, &search, &language),
                        &sort,
                    );
                    let pinned = format::sort_repositories(
                        format::filter_repositories(&pinned, &search, &language),
                        &sort,
                    );

                    if as_json {
                        let bundle = serde_json::json!({
                            "pinned": pinned,
                            "repositories": repositories,
                        });
                        println!("{}", serde_json::to_string_pretty(&bundle)?);
                    } else {
                        print!("{}", render_projects(&pinned, &repositories));
                    }
                }
                state => render_failure(state.error()),
            }
        }
        Page::Project { name } => {
            let mut project_query = ProjectQuery::new(&username, &name);
            project_query.run(&client).await;

            match project_query.state() {
                FetchState::Ready(detail) => {
                    if as_json {
                        println!("{}", serde_json::to_string_pretty(detail)?);
                    } else {
                        print!("{}", render_project(detail));
                    }
                }
                state => render_failure(state.error()),
            }
        }
        Page::Activity { event_type } => {
            let mut activity_query =
                ActivityQuery::new(&username, EventListOptions::default());
            activity_query.run(&client).await;

            match activity_query.state() {
                FetchState::Ready(events) => {
                    let events: Vec<&Event> = events
                        .iter()
                        .filter(|e| {
                            event_type
                                .as_deref()
                                .map(|t| e.event_type == t)
                                .unwrap_or(true)
                        })
                        .take(20)
                        .collect();

                    if as_json {
                        println!("{}", serde_json::to_string_pretty(&events)?);
                    } else {
                        print!("{}", render_activity(&events));
                    }
                }
                state => render_failure(state.error()),
            }
        }
        Page::Dashboard => {
            let mut dashboard_query = DashboardQuery::new(&username);
            dashboard_query.run(&client).await;

            match dashboard_query.state() {
                FetchState::Ready(dashboard) => {
                    if as_json {
                        println!("{}", serde_json::to_string_pretty(dashboard)?);
                    } else {
                        print!("{}", render_dashboard(dashboard));
                    }
                }
                state => render_failure(state.error()),
            }
        }
    }

    Ok(())
}

fn render_failure(message: Option<&str>) {
    println!("Something went wrong: {}", message.unwrap_or("unknown error"));
    println!("Run the command again to retry.");
}

fn render_profile(profile: &Profile, stats: &UserStats) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n=== {} ===\n\n", profile.login));

    if let Some(ref name) = profile.name {
        output.push_str(&format!("Name: {}\n", name));
    }
    if let Some(ref bio) = profile.bio {
        output.push_str(&format!("Bio: {}\n", bio));
    }
    if let Some(ref company) = profile.company {
        output.push_str(&format!("Company: {}\n", company));
    }
    if let Some(ref location) = profile.location {
        output.push_str(&format!("Location: {}\n", location));
    }
    if let Some(ref blog) = profile.blog {
        if !blog.is_empty() {
            output.push_str(&format!("Blog: {}\n", blog));
        }
    }
    output.push_str(&format!("Profile: {}\n", profile.html_url));
    output.push_str(&format!(
        "Member since: {}\n",
        format::format_date(&profile.created_at)
    ));

    output.push_str("\nStats:\n");
    output.push_str(&format!(
        "  Repositories: {}\n",
        format::format_number(stats.total_repos as u64)
    ));
    output.push_str(&format!(
        "  Stars: {}\n",
        format::format_number(stats.total_stars)
    ));
    output.push_str(&format!(
        "  Forks: {}\n",
        format::format_number(stats.total_forks)
    ));
    output.push_str(&format!(
        "  Followers: {} / Following: {}\n",
        format::format_number(stats.followers as u64),
        format::format_number(stats.following as u64)
    ));
    output.push_str(&format!(
        "  Gists: {}\n",
        format::format_number(profile.public_gists as u64)
    ));

    let breakdown = format::language_breakdown(&stats.languages);
    if !breakdown.is_empty() {
        output.push_str("\nTop Languages:\n");
        for lang in breakdown.iter().take(8) {
            output.push_str(&format!(
                "  {} {}% ({})\n",
                lang.language,
                lang.percentage,
                format::format_bytes(lang.bytes)
            ));
        }
    }

    output
}

fn render_repo_line(repo: &Repository) -> String {
    let mut line = format!(
        "  {} - {} stars, {} forks",
        repo.name,
        format::format_number(repo.stargazers_count as u64),
        format::format_number(repo.forks_count as u64)
    );
    if let Some(ref language) = repo.language {
        line.push_str(&format!(" [{}]", language));
    }
    line.push_str(&format!(
        " (updated {})",
        format::format_relative_time(&repo.updated_at)
    ));
    if let Some(ref description) = repo.description {
        line.push_str(&format!("\n      {}", format::truncate_text(description, 100)));
    }
    line.push('\n');
    line
}

fn render_projects(pinned: &[Repository], repositories: &[Repository]) -> String {
    let mut output = String::new();

    if !pinned.is_empty() {
        output.push_str("\nPinned:\n");
        for repo in pinned {
            output.push_str(&render_repo_line(repo));
        }
    }

    output.push_str("\nRepositories:\n");
    if repositories.is_empty() {
        // Distinct from a failure: the fetch worked, the filter matched
        // nothing.
        output.push_str("  No repositories found\n");
    } else {
        for repo in repositories {
            output.push_str(&render_repo_line(repo));
        }
    }

    output
}

fn render_project(detail: &ProjectDetail) -> String {
    let repo = &detail.repository;
    let mut output = String::new();

    output.push_str(&format!("\n=== {} ===\n\n", repo.name));
    output.push_str(&format!(
        "{}\n",
        repo.description.as_deref().unwrap_or("No description available")
    ));

    if !repo.topics.is_empty() {
        output.push_str(&format!("Topics: {}\n", repo.topics.join(", ")));
    }

    output.push_str(&format!(
        "Stars: {}  Forks: {}  Watchers: {}  Size: {}\n",
        format::format_number(repo.stargazers_count as u64),
        format::format_number(repo.forks_count as u64),
        format::format_number(repo.watchers_count as u64),
        format::format_bytes(repo.size * 1024)
    ));

    if let Some(ref owner) = repo.owner {
        output.push_str(&format!("Owner: {}\n", owner.login));
    }
    if let Some(created_at) = repo.created_at {
        output.push_str(&format!("Created: {}\n", format::format_date(&created_at)));
    }
    output.push_str(&format!(
        "Updated: {}\n",
        format::format_relative_time(&repo.updated_at)
    ));
    if let Some(ref license) = repo.license {
        output.push_str(&format!("License: {}\n", license.name));
    }

    output.push_str(&format!("GitHub: {}\n", repo.html_url));
    let demo = format::demo_url(repo);
    let pages_fallback = match &repo.owner {
        Some(owner) => format!("https://{}.github.io/{}", owner.login, repo.name),
        None => format!("https://github.io/{}", repo.name),
    };
    if repo.homepage.is_some() || demo != pages_fallback {
        output.push_str(&format!("Demo: {}\n", demo));
    }

    let breakdown = format::language_breakdown(&detail.languages);
    if !breakdown.is_empty() {
        output.push_str("\nLanguages:\n");
        for lang in &breakdown {
            output.push_str(&format!("  {} {}%\n", lang.language, lang.percentage));
        }
    }

    if !detail.contributors.is_empty() {
        output.push_str("\nContributors:\n");
        for contributor in detail.contributors.iter().take(5) {
            output.push_str(&format!(
                "  {} ({} contributions)\n",
                contributor.login, contributor.contributions
            ));
        }
        if detail.contributors.len() > 5 {
            output.push_str(&format!(
                "  +{} more contributors\n",
                detail.contributors.len() - 5
            ));
        }
    }

    output.push_str("\nREADME:\n\n");
    output.push_str(&detail.readme);
    output.push('\n');

    output
}

fn render_activity(events: &[&Event]) -> String {
    let mut output = String::new();

    output.push_str("\nRecent Activity:\n");
    if events.is_empty() {
        output.push_str("  No recent GitHub activity to display\n");
        return output;
    }

    for event in events {
        output.push_str(&format!(
            "  {} ({})\n",
            format::event_description(event),
            format::format_relative_time(&event.created_at)
        ));
    }

    output
}

fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut output = String::new();

    output.push_str(&render_profile(&dashboard.profile, &dashboard.stats));
    output.push_str(&render_projects(
        &dashboard.pinned_repos,
        &dashboard.repositories,
    ));

    let recent: Vec<&Event> = dashboard.activity.iter().collect();
    output.push_str(&render_activity(&recent));

    output
}
