mod classify;
mod config;
mod github;
mod history;
mod release;
mod report;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use regex::Regex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use config::Config;
use github::{GitHub, GitHubError, RepoRef};
use release::{GenerateRequest, ReleaseError};

/// release-me: generate release notes from the pull requests merged since the
/// previous release of a GitHub repository.
#[derive(Parser, Debug)]
#[command(name = "release-me", version, about)]
struct Cli {
    #[command(flatten)]
    repo: RepoArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RepoArgs {
    /// Login of the GitHub user or organization owning the repository
    #[arg(long, global = true, alias = "github-owner")]
    owner: Option<String>,

    /// Name of the GitHub repository
    #[arg(long, global = true, alias = "github-repo")]
    repo: Option<String>,

    /// GitHub token (falls back to the config file, then GITHUB_TOKEN)
    #[arg(long, global = true)]
    github_token: Option<String>,

    /// GraphQL endpoint, for GitHub Enterprise
    #[arg(long, global = true, alias = "v4-endpoint")]
    endpoint: Option<String>,

    /// Config file path (defaults to .release-me.toml in the current directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate release notes for every pull request merged since the previous release
    Generate(GenerateArgs),

    /// Check that a pull request carries a label release notes can classify
    Validate {
        /// Pull request number, #number, or GitHub pull request URL
        #[arg(required_unless_present = "pr_number", conflicts_with = "pr_number")]
        pr: Option<String>,

        /// Pull request number
        #[arg(long = "pr-number")]
        pr_number: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Version the release notes are generated for
    #[arg(long)]
    release_version: String,

    /// Branch to walk (default: config value, then "master")
    #[arg(long, alias = "github-branch")]
    branch: Option<String>,

    /// Only include pull requests merged up to this commit (default: branch tip)
    #[arg(long, alias = "last-commit-SHA")]
    end_commit: Option<String>,

    /// Comma-separated GitHub logins whose pull requests are ignored
    #[arg(long, value_delimiter = ',')]
    ignore_authors: Vec<String>,

    /// Releases whose name matches are not used as the previous release
    #[arg(long)]
    ignore_release_regex: Option<String>,

    /// Write the release notes to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.to_string().red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ReleaseError> {
    info!("loading configuration");
    let config = match &cli.repo.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Generate(args) => generate(&cli.repo, &config, args).await,
        Command::Validate { pr, pr_number } => {
            // clap requires one of the two; an empty reference fails to parse
            let pr = pr
                .or_else(|| pr_number.map(|n| n.to_string()))
                .unwrap_or_default();
            validate(&cli.repo, &config, &pr).await
        }
    }
}

async fn generate(repo_args: &RepoArgs, config: &Config, args: GenerateArgs) -> Result<(), ReleaseError> {
    // Bad patterns are usage errors; report them before any request goes out.
    let ignore_release = args
        .ignore_release_regex
        .or_else(|| config.generate.ignore_release_regex.clone())
        .map(|pattern| Regex::new(&pattern))
        .transpose()?;

    let ignore_authors: HashSet<String> = if args.ignore_authors.is_empty() {
        config.generate.ignore_authors.iter().cloned().collect()
    } else {
        args.ignore_authors.into_iter().collect()
    };

    let request = GenerateRequest {
        repo: resolve_repo(repo_args, config)?,
        branch: args.branch.unwrap_or_else(|| config.branch().to_string()),
        end_commit: args.end_commit,
        release_version: args.release_version,
        ignore_authors,
        ignore_release,
        release_limit: config.release_limit(),
    };

    let _main_span = info_span!("generate", repo = %request.repo, branch = %request.branch).entered();
    debug!(request = ?request, "resolved generate request");

    let client = build_client(repo_args, config)?;
    let sections = release::build_sections(&client, &request).await?;

    info!(version = %request.release_version, "writing release notes");
    report::output(&sections, &request.release_version, args.output.as_deref())?;
    info!("done");
    Ok(())
}

async fn validate(repo_args: &RepoArgs, config: &Config, pr: &str) -> Result<(), ReleaseError> {
    let pr_ref = github::parse_pr_ref(pr)?;
    let repo = match pr_ref.repo {
        Some(repo) => repo,
        None => resolve_repo(repo_args, config)?,
    };

    let _main_span = info_span!("validate", repo = %repo, pr = pr_ref.number).entered();

    let client = build_client(repo_args, config)?;
    release::validate(&client, &repo, pr_ref.number).await?;

    println!(
        "{}",
        format!("pull request #{} has valid labels", pr_ref.number).green()
    );
    Ok(())
}

/// CLI flags win over the config file.
fn resolve_repo(repo_args: &RepoArgs, config: &Config) -> Result<RepoRef, ReleaseError> {
    let owner = repo_args.owner.clone().or_else(|| config.github.owner.clone());
    let name = repo_args.repo.clone().or_else(|| config.github.repo.clone());
    match (owner, name) {
        (Some(owner), Some(name)) => Ok(RepoRef { owner, name }),
        _ => Err(ReleaseError::MissingRepo),
    }
}

fn build_client(repo_args: &RepoArgs, config: &Config) -> Result<GitHub, ReleaseError> {
    let token = repo_args
        .github_token
        .clone()
        .or_else(|| config.github_token())
        .ok_or(GitHubError::MissingToken)?;
    let endpoint = repo_args.endpoint.clone().or_else(|| config.github.endpoint.clone());
    Ok(GitHub::new(token, endpoint, config.timeout())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo_args(owner: Option<&str>, repo: Option<&str>) -> RepoArgs {
        RepoArgs {
            owner: owner.map(str::to_string),
            repo: repo.map(str::to_string),
            github_token: None,
            endpoint: None,
            config: None,
        }
    }

    #[test]
    fn test_cli_parses_generate() {
        let cli = Cli::try_parse_from([
            "release-me",
            "--owner",
            "org",
            "--repo",
            "repo",
            "generate",
            "--release-version",
            "v7.2.0",
            "--ignore-authors",
            "dependabot,renovate",
            "--end-commit",
            "abc123",
        ])
        .unwrap();
        assert_eq!(cli.repo.owner.as_deref(), Some("org"));
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.release_version, "v7.2.0");
                assert_eq!(args.ignore_authors, vec!["dependabot", "renovate"]);
                assert_eq!(args.end_commit.as_deref(), Some("abc123"));
                assert!(args.branch.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_release_version() {
        assert!(Cli::try_parse_from(["release-me", "generate"]).is_err());
    }

    #[test]
    fn test_cli_parses_validate() {
        let cli = Cli::try_parse_from(["release-me", "validate", "42", "--owner", "org"]).unwrap();
        assert!(matches!(cli.command, Command::Validate { pr, .. } if pr.as_deref() == Some("42")));
        assert_eq!(cli.repo.owner.as_deref(), Some("org"));
    }

    #[test]
    fn test_cli_accepts_legacy_generate_flags() {
        let cli = Cli::try_parse_from([
            "release-me",
            "--github-owner",
            "org",
            "--github-repo",
            "repo",
            "--github-token",
            "t",
            "--v4-endpoint",
            "https://github.example.com/api/graphql",
            "generate",
            "--release-version",
            "v1",
            "--github-branch",
            "main",
            "--last-commit-SHA",
            "abc",
            "--ignore-authors",
            "dependabot",
            "--ignore-release-regex",
            "rc",
        ])
        .unwrap();
        assert_eq!(cli.repo.owner.as_deref(), Some("org"));
        assert_eq!(cli.repo.repo.as_deref(), Some("repo"));
        assert_eq!(cli.repo.github_token.as_deref(), Some("t"));
        assert_eq!(
            cli.repo.endpoint.as_deref(),
            Some("https://github.example.com/api/graphql")
        );
        match cli.command {
            Command::Generate(args) => {
                assert_eq!(args.branch.as_deref(), Some("main"));
                assert_eq!(args.end_commit.as_deref(), Some("abc"));
                assert_eq!(args.ignore_authors, vec!["dependabot"]);
                assert_eq!(args.ignore_release_regex.as_deref(), Some("rc"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_accepts_legacy_validate_flag() {
        let cli = Cli::try_parse_from([
            "release-me",
            "--github-owner",
            "org",
            "--github-repo",
            "repo",
            "validate",
            "--pr-number",
            "42",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Validate { pr: None, pr_number: Some(42) }
        ));
    }

    #[test]
    fn test_cli_validate_needs_exactly_one_reference() {
        assert!(Cli::try_parse_from(["release-me", "validate"]).is_err());
        assert!(Cli::try_parse_from(["release-me", "validate", "42", "--pr-number", "42"]).is_err());
    }

    #[test]
    fn test_resolve_repo_prefers_flags() {
        let mut config = Config::default();
        config.github.owner = Some("config-owner".to_string());
        config.github.repo = Some("config-repo".to_string());

        let repo = resolve_repo(&repo_args(Some("flag-owner"), None), &config).unwrap();
        assert_eq!(repo.owner, "flag-owner");
        assert_eq!(repo.name, "config-repo");
    }

    #[test]
    fn test_resolve_repo_missing() {
        let err = resolve_repo(&repo_args(Some("org"), None), &Config::default()).unwrap_err();
        assert!(matches!(err, ReleaseError::MissingRepo));
    }

    #[tokio::test]
    async fn test_invalid_release_regex_is_rejected_before_fetching() {
        let args = GenerateArgs {
            release_version: "v1.0.0".to_string(),
            branch: None,
            end_commit: None,
            ignore_authors: vec![],
            ignore_release_regex: Some("(".to_string()),
            output: None,
        };
        let err = generate(&repo_args(None, None), &Config::default(), args)
            .await
            .unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidRegex(_)));
    }
}
