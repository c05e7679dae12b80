use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Instant;

use repo_lens::fetch::{fetch_repository_report, fetch_user_repositories, FetchOptions};
use repo_lens::github::{create_client, is_valid_login, FetchError, GitHubClient, RepoRef};
use repo_lens::report::filter_repositories;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_NOT_FOUND: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_CONFIG: i32 = 4;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListFormat {
    Table,
    Tsv,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive dashboard (default if no subcommand)
    Tui {
        /// Open straight into a repository (owner/repo or GitHub URL)
        #[arg(long, conflicts_with = "user")]
        repo: Option<String>,
        /// Open straight into a user's repository list
        #[arg(long)]
        user: Option<String>,
    },
    /// List a user's public repositories, most starred first
    Repos {
        username: String,
        /// Only show repositories whose name contains this text
        #[arg(short, long)]
        filter: Option<String>,
        #[arg(long, value_enum, default_value_t = ListFormat::Table)]
        format: ListFormat,
    },
    /// Print the full statistics report for a repository
    Show {
        /// owner/repo or GitHub URL
        target: String,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Open a repository page in the browser
    Open {
        /// owner/repo or GitHub URL
        target: String,
    },
}

#[derive(Parser, Debug)]
#[command(name = "repo-lens")]
#[command(about = "Explore public GitHub repository statistics", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/repo-lens/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// GitHub API root, overrides the config file
    #[arg(long, global = true, env = "REPO_LENS_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<FetchError>() {
        Some(e) if e.is_not_found() => EXIT_NOT_FOUND,
        _ => EXIT_NETWORK,
    }
}

fn parse_target(target: &str) -> RepoRef {
    match RepoRef::parse(target) {
        Ok(repo) => repo,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_CONFIG);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    repo_lens::init(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Tui {
        repo: None,
        user: None,
    });

    // Load config
    let mut config = match repo_lens::config::load_config(cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    if let Err(errors) = repo_lens::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    tracing::debug!(
        api = %config.api_base_url,
        review_concurrency = config.review_concurrency,
        fetch_timeout = %config.fetch_timeout,
        "loaded config"
    );

    let timeout = config.fetch_timeout();
    let client = match create_client(&config.api_base_url, timeout) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create GitHub client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };
    let options = config.fetch_options();

    let code = match command {
        Commands::Tui { repo, user } => {
            let target = repo_lens::tui::LaunchTarget {
                repo: repo.as_deref().map(parse_target),
                user,
            };
            let theme = repo_lens::tui::resolve_theme(config.theme);
            let app = repo_lens::tui::App::new(theme.colors());
            let settings = repo_lens::tui::LoadSettings {
                client,
                options,
                timeout,
            };
            match repo_lens::tui::run_tui(app, settings, target).await {
                Ok(()) => EXIT_SUCCESS,
                Err(e) => {
                    eprintln!("TUI error: {}", e);
                    EXIT_NETWORK
                }
            }
        }
        Commands::Repos {
            username,
            filter,
            format,
        } => list_repositories(&client, &username, filter.as_deref(), format).await,
        Commands::Show { target, json } => {
            let repo = parse_target(&target);
            show_report(&client, &repo, options, json).await
        }
        Commands::Open { target } => {
            let repo = parse_target(&target);
            match repo_lens::browser::open_repository(&repo) {
                Ok(()) => {
                    println!("Opening {} in browser: {}", repo, repo.html_url());
                    EXIT_SUCCESS
                }
                Err(e) => {
                    eprintln!("Failed to open browser: {}", e);
                    EXIT_NETWORK
                }
            }
        }
    };

    std::process::exit(code);
}

async fn list_repositories(
    client: &GitHubClient,
    username: &str,
    filter: Option<&str>,
    format: ListFormat,
) -> i32 {
    if !is_valid_login(username.trim()) {
        eprintln!("Invalid GitHub username '{}'", username);
        return EXIT_CONFIG;
    }

    let start_time = Instant::now();
    let repos = match fetch_user_repositories(client, username).await {
        Ok(repos) => repos,
        Err(e) => {
            eprintln!("{}", e);
            return exit_code_for(&e);
        }
    };

    let visible = filter_repositories(&repos, filter.unwrap_or_default());
    tracing::info!(
        total = repos.len(),
        shown = visible.len(),
        elapsed = ?start_time.elapsed(),
        "listed repositories"
    );

    match format {
        ListFormat::Table => {
            let use_colors = repo_lens::output::should_use_colors();
            println!("{}", repo_lens::output::format_repo_table(&visible, use_colors));
        }
        ListFormat::Tsv => print!("{}", repo_lens::output::format_repo_tsv(&visible)),
        ListFormat::Json => match serde_json::to_string_pretty(&visible) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize repositories: {}", e);
                return EXIT_NETWORK;
            }
        },
    }
    EXIT_SUCCESS
}

async fn show_report(
    client: &GitHubClient,
    repo: &RepoRef,
    options: FetchOptions,
    json: bool,
) -> i32 {
    let start_time = Instant::now();
    let report = match fetch_repository_report(client, repo, options).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            return exit_code_for(&e);
        }
    };
    tracing::info!(repo = %repo, elapsed = ?start_time.elapsed(), "fetched report");

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                return EXIT_NETWORK;
            }
        }
    } else {
        let use_colors = repo_lens::output::should_use_colors();
        println!("{}", repo_lens::output::format_report(&report, use_colors));
    }
    EXIT_SUCCESS
}
