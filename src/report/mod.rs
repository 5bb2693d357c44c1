use colored::Colorize;
use std::fmt::Display;
use std::path::Path;

use crate::pr::PrRef;
use crate::review::{GenerationError, ReviewOutcome};

const SEPARATOR_WIDTH: usize = 80;

/// Announce the run.
pub fn start(pr: &PrRef, repo_path: &Path) {
    println!(
        "{}",
        format!(
            "--- Analyzing PR #{} in repository: {}/{} ---",
            pr.number, pr.owner, pr.repo
        )
        .bold()
    );
    println!("Code checked out to: {}", repo_path.display());
}

pub fn error(err: impl Display) {
    println!("{} {}", "Error:".red().bold(), err);
}

pub fn generation_failed(err: &GenerationError) {
    println!("{} {}", "Error generating AI content:".yellow().bold(), err);
}

/// Print what happened to the generated comment.
pub fn outcome(outcome: &ReviewOutcome) {
    let pr = &outcome.comment.pr;
    match &outcome.response {
        Some(response) if response.is_created() => {
            println!(
                "{}",
                format!("Comment posted successfully to {pr}").green()
            );
        }
        Some(response) => {
            println!(
                "{} {}: {} - {}",
                "Error posting comment to".red().bold(),
                pr,
                response.status,
                response.body
            );
        }
        None => {
            println!("{}", format!("Dry run: comment for {pr} not posted").cyan());
            println!();
            println!("{}", outcome.comment.body);
        }
    }
}

pub fn separator() {
    println!("{}", separator_line());
}

fn separator_line() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_line() {
        let line = separator_line();
        assert_eq!(line.len(), 80);
        assert!(line.chars().all(|c| c == '-'));
    }
}
