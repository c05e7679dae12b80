use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::github::types::UserRepository;
use crate::report::{AnalyticsReport, CollaborationReport, RepositoryOverview, RepositoryReport};

const BAR_WIDTH: usize = 30;
const BAR_CHAR: char = '█';

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Format a count in compact notation (1.5k, 2.3M, 847)
pub fn format_count(count: u64) -> String {
    let value = count as f64;
    let formatted = if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        count.to_string()
    };

    // Trim trailing .0 (e.g., "1.0k" -> "1k")
    formatted.replace(".0M", "M").replace(".0k", "k")
}

/// Truncate text to fit available width, accounting for Unicode
pub fn truncate_title(title: &str, max_width: usize) -> String {
    let chars: Vec<char> = title.chars().collect();
    if chars.len() <= max_width {
        title.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Horizontal bar scaled so `max` fills `width` cells
pub fn format_bar(value: f64, max: f64, width: usize) -> String {
    if !(value.is_finite() && max.is_finite()) || max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let cells = ((value / max).min(1.0) * width as f64).round() as usize;
    std::iter::repeat(BAR_CHAR).take(cells).collect()
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

fn heading(text: &str, use_colors: bool) -> String {
    if use_colors {
        text.bold().underline().to_string()
    } else {
        text.to_string()
    }
}

/// Format a user's repositories as an indexed table
/// Columns: Index, Stars, Name, Language, Description
pub fn format_repo_table(repos: &[&UserRepository], use_colors: bool) -> String {
    if repos.is_empty() {
        return "No repositories found".to_string();
    }

    let name_width = repos
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(40);
    let language_width = 12;
    let stars_width = 6;
    // index + stars + name + language + separators
    let fixed_width = 4 + stars_width + 2 + name_width + 2 + language_width + 2;
    let term_width = get_terminal_width();

    repos
        .iter()
        .enumerate()
        .map(|(idx, repo)| {
            let index_str = format!("{:>2}.", idx + 1);
            let stars = format!("{:>width$}", format_count(repo.stars), width = stars_width);
            let name = format!(
                "{:<width$}",
                truncate_title(&repo.name, name_width),
                width = name_width
            );
            let language = format!(
                "{:<width$}",
                truncate_title(repo.language.as_deref().unwrap_or("-"), language_width),
                width = language_width
            );
            let description = repo.description.as_deref().unwrap_or("");
            let description = match term_width {
                Some(width) if width > fixed_width + 10 => {
                    truncate_title(description, width - fixed_width)
                }
                Some(_) => truncate_title(description, 20),
                None => description.to_string(),
            };

            let line = if use_colors {
                format!(
                    "{} {}  {}  {}  {}",
                    index_str.dimmed(),
                    stars.yellow(),
                    name.bold(),
                    language.cyan(),
                    description
                )
            } else {
                format!("{} {}  {}  {}  {}", index_str, stars, name, language, description)
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format repositories as tab-separated values for scripting
/// Columns: full_name, stars, forks, language, url (no headers, no colors)
pub fn format_repo_tsv(repos: &[&UserRepository]) -> String {
    repos
        .iter()
        .map(|repo| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                repo.full_name,
                repo.stars,
                repo.forks,
                repo.language.as_deref().unwrap_or(""),
                repo.html_url
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_overview(
    overview: &RepositoryOverview,
    now: DateTime<Utc>,
    use_colors: bool,
) -> String {
    let summary = &overview.summary;
    let mut lines = Vec::new();

    if use_colors {
        lines.push(summary.full_name.bold().to_string());
    } else {
        lines.push(summary.full_name.clone());
    }
    if let Some(description) = summary.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(description.to_string());
    }
    lines.push(summary.html_url.clone());
    lines.push(format!("Created {} ago", format_age(now - summary.created_at)));
    lines.push(String::new());

    let cards: Vec<String> = overview
        .stat_cards()
        .iter()
        .map(|(label, value)| format!("{}: {}", label, format_count(*value)))
        .collect();
    lines.push(cards.join("   "));
    lines.push(format!(
        "Pull requests: {} open, {} closed",
        overview.pull_requests.open, overview.pull_requests.closed
    ));

    lines.push(String::new());
    lines.push(heading("Languages", use_colors));
    if overview.languages.is_empty() {
        lines.push("  No language data".to_string());
    }
    let name_width = overview
        .languages
        .iter()
        .map(|l| l.name.chars().count())
        .max()
        .unwrap_or(0);
    for language in &overview.languages {
        lines.push(format!(
            "  {:<width$}  {:>5}%  {}",
            language.name,
            language.percentage_label(),
            format_bar(language.percentage, 100.0, BAR_WIDTH),
            width = name_width
        ));
    }

    lines.push(String::new());
    lines.push(heading("Top contributors", use_colors));
    if overview.top_contributors.is_empty() {
        lines.push("  No contributors".to_string());
    }
    for (idx, contributor) in overview.top_contributors.iter().enumerate() {
        lines.push(format!(
            "  {:>2}. {}  {} contributions",
            idx + 1,
            contributor.login,
            contributor.contributions
        ));
    }

    lines.push(String::new());
    lines.push(heading("Recent commits", use_colors));
    if overview.recent_commits.is_empty() {
        lines.push("  No commits".to_string());
    }
    for commit in &overview.recent_commits {
        let age = commit
            .authored_at()
            .map(|at| format_age(now - at))
            .unwrap_or_else(|| "-".to_string());
        let sha = commit.short_sha();
        let headline = truncate_title(commit.headline(), 60);
        if use_colors {
            lines.push(format!(
                "  {}  {}  {} {}",
                sha.yellow(),
                headline,
                commit.author_name().cyan(),
                age.dimmed()
            ));
        } else {
            lines.push(format!("  {}  {}  {} {}", sha, headline, commit.author_name(), age));
        }
    }

    lines.join("\n")
}

pub fn format_analytics(analytics: &AnalyticsReport, use_colors: bool) -> String {
    let mut lines = vec![heading("Commit frequency", use_colors)];

    if analytics.commit_series.is_empty() {
        lines.push("  No commit activity yet".to_string());
    }
    let max_commits = analytics
        .commit_series
        .iter()
        .map(|p| p.value)
        .max()
        .unwrap_or(0) as f64;
    for point in &analytics.commit_series {
        lines.push(format!(
            "  {:<8} {:>5}  {}",
            point.label,
            point.value,
            format_bar(point.value as f64, max_commits, BAR_WIDTH)
        ));
    }

    lines.push(String::new());
    lines.push(heading("Issue resolution time", use_colors));
    match analytics.average_resolution_days() {
        Some(average) => lines.push(format!(
            "  {} closed issues, {:.1} days on average",
            analytics.issue_resolution.len(),
            average
        )),
        None => lines.push("  No closed issues".to_string()),
    }
    let max_days = analytics
        .issue_resolution
        .iter()
        .map(|p| p.days)
        .max()
        .unwrap_or(0) as f64;
    for point in &analytics.issue_resolution {
        lines.push(format!(
            "  {:<10} #{:<6} {:>4}d  {}",
            point.label,
            point.issue_number,
            point.days,
            format_bar(point.days as f64, max_days, BAR_WIDTH)
        ));
    }

    lines.join("\n")
}

pub fn format_collaboration(collaboration: &CollaborationReport, use_colors: bool) -> String {
    let mut lines = vec![heading("Team metrics", use_colors)];

    for (label, score) in collaboration.team.entries() {
        lines.push(format!(
            "  {:<20} {:>5.1}  {}",
            label,
            score,
            format_bar(score, 100.0, BAR_WIDTH)
        ));
    }

    let reviews = &collaboration.reviews;
    lines.push(String::new());
    lines.push(heading("Review statistics", use_colors));
    lines.push(format!(
        "  {} reviews across {} pull requests",
        reviews.total, collaboration.pull_requests_sampled
    ));
    for (label, count) in [
        ("Approved", reviews.approvals),
        ("Changes requested", reviews.changes_requested),
        ("Pending", reviews.pending),
    ] {
        lines.push(format!(
            "  {:<20} {:>5}  {}",
            label,
            count,
            format_bar(reviews.share(count), 100.0, BAR_WIDTH)
        ));
    }

    lines.push(String::new());
    lines.push(heading("Contributor leaderboard", use_colors));
    if collaboration.leaderboard.is_empty() {
        lines.push("  No contributors".to_string());
    }
    for (idx, contributor) in collaboration.leaderboard.iter().enumerate() {
        lines.push(format!(
            "  {:>2}. {:<24} {:>6}",
            idx + 1,
            contributor.login,
            contributor.contributions
        ));
    }

    lines.join("\n")
}

/// The full report as plain text, one section per dashboard tab
pub fn format_report(report: &RepositoryReport, use_colors: bool) -> String {
    [
        format_overview(&report.overview, report.generated_at, use_colors),
        format_analytics(&report.analytics, use_colors),
        format_collaboration(&report.collaboration, use_colors),
    ]
    .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{
        Account, Commit, CommitDetail, CommitSignature, Contributor, RepositorySummary,
    };
    use crate::metrics::{
        LanguageShare, PullRequestCounts, ResolutionPoint, ReviewCounts, SeriesPoint, TeamMetrics,
    };
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn repo(name: &str, stars: u64, language: Option<&str>) -> UserRepository {
        UserRepository {
            name: name.to_string(),
            full_name: format!("octocat/{}", name),
            owner: Account::default(),
            description: Some("A test repository".to_string()),
            stars,
            forks: 2,
            language: language.map(str::to_string),
            html_url: format!("https://github.com/octocat/{}", name),
        }
    }

    fn contributor(login: &str, contributions: u64) -> Contributor {
        Contributor {
            login: login.to_string(),
            avatar_url: String::new(),
            contributions,
            html_url: String::new(),
        }
    }

    fn overview() -> RepositoryOverview {
        RepositoryOverview {
            summary: RepositorySummary {
                name: "hello".to_string(),
                full_name: "octocat/hello".to_string(),
                owner: Account::default(),
                description: Some("Hello world".to_string()),
                stars: 1500,
                forks: 12,
                open_issues: 3,
                created_at: now() - Duration::weeks(3),
                html_url: "https://github.com/octocat/hello".to_string(),
            },
            pull_requests: PullRequestCounts { open: 2, closed: 5 },
            top_contributors: vec![contributor("mona", 42)],
            recent_commits: vec![Commit {
                sha: "abcdef1234567".to_string(),
                commit: CommitDetail {
                    message: "Fix the thing\n\nLong body".to_string(),
                    author: Some(CommitSignature {
                        name: "Mona".to_string(),
                        date: Some(now() - Duration::days(2)),
                    }),
                },
                author: None,
            }],
            languages: vec![
                LanguageShare { name: "Rust".to_string(), percentage: 75.0 },
                LanguageShare { name: "Shell".to_string(), percentage: 25.0 },
            ],
        }
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(847), "847");
        assert_eq!(format_count(1000), "1k");
        assert_eq!(format_count(1500), "1.5k");
        assert_eq!(format_count(1_000_000), "1M");
        assert_eq!(format_count(2_300_000), "2.3M");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(50.0, 100.0, 10), "█████");
        assert_eq!(format_bar(100.0, 100.0, 4), "████");
        assert_eq!(format_bar(500.0, 100.0, 4), "████");
        assert_eq!(format_bar(0.0, 100.0, 10), "");
        assert_eq!(format_bar(5.0, 0.0, 10), "");
        assert_eq!(format_bar(f64::NAN, 100.0, 10), "");
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(30)), "now");
        assert_eq!(format_age(Duration::minutes(30)), "30m");
        assert_eq!(format_age(Duration::hours(3)), "3h");
        assert_eq!(format_age(Duration::days(2)), "2d");
        assert_eq!(format_age(Duration::weeks(2)), "2w");
    }

    #[test]
    fn test_truncate_title() {
        assert_eq!(truncate_title("Short title", 20), "Short title");
        assert_eq!(truncate_title("Exact", 5), "Exact");
        assert_eq!(truncate_title("This is a very long title", 15), "This is a ve...");
        assert_eq!(truncate_title("Hello world", 3), "Hel");
    }

    #[test]
    fn test_format_repo_table_empty() {
        assert_eq!(format_repo_table(&[], false), "No repositories found");
    }

    #[test]
    fn test_format_repo_table() {
        let a = repo("hello-world", 2500, Some("Rust"));
        let b = repo("spoon", 7, None);
        let result = format_repo_table(&[&a, &b], false);
        let lines: Vec<&str> = result.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[0].contains("2.5k"));
        assert!(lines[0].contains("hello-world"));
        assert!(lines[0].contains("Rust"));
        assert!(lines[1].starts_with(" 2."));
        assert!(lines[1].contains("spoon"));
        assert!(lines[1].contains(" - "));
    }

    #[test]
    fn test_format_repo_tsv() {
        let a = repo("hello", 10, Some("Go"));
        let b = repo("plain", 0, None);
        assert_eq!(
            format_repo_tsv(&[&a, &b]),
            "octocat/hello\t10\t2\tGo\thttps://github.com/octocat/hello\n\
             octocat/plain\t0\t2\t\thttps://github.com/octocat/plain"
        );
        assert_eq!(format_repo_tsv(&[]), "");
    }

    #[test]
    fn test_format_overview() {
        let text = format_overview(&overview(), now(), false);
        assert!(text.starts_with("octocat/hello\nHello world\n"));
        assert!(text.contains("Created 3w ago"));
        assert!(text.contains("Stars: 1.5k   Forks: 12   Issues: 3   Pull Requests: 7"));
        assert!(text.contains("Rust    75.0%"));
        assert!(text.contains("1. mona  42 contributions"));
        assert!(text.contains("abcdef1  Fix the thing  Mona 2d"));
    }

    #[test]
    fn test_format_analytics() {
        let analytics = AnalyticsReport {
            commit_series: vec![
                SeriesPoint { label: "Week 1".to_string(), value: 4 },
                SeriesPoint { label: "Week 2".to_string(), value: 8 },
            ],
            issue_resolution: vec![ResolutionPoint {
                label: "Issue 1".to_string(),
                issue_number: 12,
                days: 3,
            }],
        };
        let text = format_analytics(&analytics, false);
        let full_bar = "█".repeat(30);
        assert!(text.contains(&format!("Week 2       8  {}", full_bar)));
        assert!(text.contains("1 closed issues, 3.0 days on average"));
        assert!(text.contains("#12"));

        let empty = format_analytics(&AnalyticsReport::default(), false);
        assert!(empty.contains("No commit activity yet"));
        assert!(empty.contains("No closed issues"));
    }

    #[test]
    fn test_format_collaboration() {
        let collaboration = CollaborationReport {
            team: TeamMetrics {
                pr_velocity: 12.5,
                review_time: 80.0,
                collaboration: 50.0,
                code_quality: 75.0,
                team_engagement: 100.0,
            },
            reviews: ReviewCounts { approvals: 2, changes_requested: 1, pending: 1, total: 4 },
            leaderboard: vec![contributor("a", 20), contributor("b", 5)],
            pull_requests_sampled: 3,
        };
        let text = format_collaboration(&collaboration, false);
        assert!(text.contains("PR Velocity           12.5"));
        assert!(text.contains("Team Engagement      100.0"));
        assert!(text.contains("4 reviews across 3 pull requests"));
        assert!(text.contains(" 1. a"));
        assert!(text.contains(" 2. b"));
    }
}
