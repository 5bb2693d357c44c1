mod config;
mod pr;
mod report;
mod review;
#[cfg(test)]
mod test_support;

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, info_span};
use tracing_subscriber::EnvFilter;

use review::Delivery;

/// PR Reviewer: CLI tool that reviews a GitHub Pull Request with a
/// generative AI model and posts the review back as a PR comment.
#[derive(Parser, Debug)]
#[command(name = "pr-reviewer", version, about)]
struct Cli {
    /// Full name of the repository (e.g., 'owner/repo-name')
    #[arg(long)]
    repo_name: String,

    /// The Pull Request number to review
    #[arg(long)]
    pr_number: u64,

    /// Path to the checked out repository code (reserved, not read)
    #[arg(long)]
    repo_path: PathBuf,

    /// Config file path (defaults to .pr-reviewer.toml in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Generative model to use instead of the configured one
    #[arg(long)]
    model: Option<String>,

    /// Print the generated comment instead of posting it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = match config::Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            report::error(&e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report::error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, mut config: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(model) = cli.model {
        config.genai.model = model;
    }

    let pr_ref = pr::parse_repo_name(&cli.repo_name, cli.pr_number)?;
    let _main_span = info_span!("pr_review", pr = %pr_ref).entered();

    report::start(&pr_ref, &cli.repo_path);

    let rule_book = config.rule_book();
    let host = pr::GitHubClient::new(&config.github, &config.http)?;
    let generator = review::gemini::GeminiClient::new(&config.genai, &config.http);
    info!(model = generator.model(), "clients ready");

    let delivery = if cli.dry_run {
        Delivery::DryRun
    } else {
        Delivery::Post
    };

    let outcome = review::run(&host, &generator, &rule_book, &pr_ref, delivery).await?;
    if let Some(e) = &outcome.generation_error {
        report::generation_failed(e);
    }
    report::outcome(&outcome);
    report::separator();
    info!("done");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_required_flags() {
        let cli = Cli::try_parse_from([
            "pr-reviewer",
            "--repo-name",
            "acme/widgets",
            "--pr-number",
            "42",
            "--repo-path",
            "/tmp/checkout",
        ])
        .unwrap();
        assert_eq!(cli.repo_name, "acme/widgets");
        assert_eq!(cli.pr_number, 42);
        assert_eq!(cli.repo_path, PathBuf::from("/tmp/checkout"));
        assert!(!cli.dry_run);
        assert!(cli.model.is_none());
    }

    #[test]
    fn test_cli_requires_all_three_flags() {
        assert!(Cli::try_parse_from(["pr-reviewer", "--repo-name", "acme/widgets", "--pr-number", "42"]).is_err());
        assert!(Cli::try_parse_from([
            "pr-reviewer",
            "--repo-name",
            "acme/widgets",
            "--pr-number",
            "forty-two",
            "--repo-path",
            ".",
        ])
        .is_err());
    }

    fn cli_for(repo_name: &str) -> Cli {
        Cli::try_parse_from([
            "pr-reviewer",
            "--repo-name",
            repo_name,
            "--pr-number",
            "42",
            "--repo-path",
            ".",
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn test_unknown_repository_aborts_run() {
        // a request would be refused and surface as a fetch error instead
        let mut config = config::Config::default();
        config.github.api_url = test_support::closed_url().await;
        config.genai.api_url = test_support::closed_url().await;

        let err = run(cli_for("acme/widgets"), config).await.unwrap_err();
        assert_eq!(err.to_string(), "No prompt defined for repository: 'widgets'");
    }

    #[tokio::test]
    async fn test_invalid_repo_name_aborts_run() {
        let err = run(cli_for("widgets"), config::Config::default()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid --repo-name format. Expected 'owner/repo-name', got 'widgets'"
        );
    }
}
