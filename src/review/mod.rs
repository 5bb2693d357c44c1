pub mod gemini;
pub mod prompt;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::pr::{CommentResponse, PrError, PrRef, PullRequestHost};
use prompt::{PromptError, RuleBook};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("request to the generative AI service failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("generative AI service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("generative AI service returned no text")]
    EmptyResponse,
}

/// Errors that stop a review run before anything is posted,
/// plus transport failures while posting.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("Failed to fetch PR details for {pr}: {source}")]
    Details { pr: PrRef, source: PrError },

    #[error("Failed to get diff for {pr}: {source}")]
    Diff { pr: PrRef, source: PrError },

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("Failed to post comment to {pr}: {source}")]
    Post { pr: PrRef, source: PrError },
}

/// Turns a review prompt into review text.
#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Whether the generated comment is posted or only returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Post,
    DryRun,
}

/// The text a run produced for a pull request.
#[derive(Debug, Clone)]
pub struct ReviewComment {
    pub pr: PrRef,
    pub body: String,
}

#[derive(Debug)]
pub struct ReviewOutcome {
    pub comment: ReviewComment,
    /// Set when the comment body is the fallback text.
    pub generation_error: Option<GenerationError>,
    /// `None` on a dry run.
    pub response: Option<CommentResponse>,
}

/// Review text, and the generation failure it stands in for.
#[derive(Debug)]
pub struct GeneratedReview {
    pub body: String,
    pub failure: Option<GenerationError>,
}

/// Generate review text, substituting the fallback comment when generation fails.
///
/// Never fails: the fallback is what gets posted on the pull request.
pub async fn generate_or_fallback(generator: &dyn ReviewGenerator, prompt: &str) -> GeneratedReview {
    match generator.generate(prompt).await {
        Ok(body) => GeneratedReview {
            body,
            failure: None,
        },
        Err(e) => {
            warn!(error = %e, "generation failed, using fallback comment");
            GeneratedReview {
                body: fallback_text(&e),
                failure: Some(e),
            }
        }
    }
}

pub fn fallback_text(err: &GenerationError) -> String {
    format!("Automated analysis failed: {err}")
}

/// Run one review: rule set, details, diff, prompt, generation, then delivery.
///
/// An unknown repository is rejected before any request is made. Details and
/// diff failures abort before anything is posted. An empty diff is treated as
/// a failed diff fetch.
#[instrument(skip_all, fields(owner = %pr.owner, repo = %pr.repo, pr = pr.number))]
pub async fn run(
    host: &dyn PullRequestHost,
    generator: &dyn ReviewGenerator,
    rule_book: &RuleBook,
    pr: &PrRef,
    delivery: Delivery,
) -> Result<ReviewOutcome, ReviewError> {
    let rules = rule_book.rule_set(&pr.repo)?;
    debug!(rules = %rules, "resolved rule set");

    info!("fetching pull request details");
    let details = host
        .fetch_details(pr)
        .await
        .map_err(|source| ReviewError::Details { pr: pr.clone(), source })?;

    info!("fetching pull request diff");
    let diff = host
        .fetch_diff(pr)
        .await
        .map_err(|source| ReviewError::Diff { pr: pr.clone(), source })?;
    if diff.is_empty() {
        return Err(ReviewError::Diff {
            pr: pr.clone(),
            source: PrError::EmptyDiff,
        });
    }

    let prompt = rule_book.compose(&pr.repo, &diff, &details.title, pr.number)?;
    debug!(prompt_bytes = prompt.len(), "composed review prompt");

    info!("generating review");
    let generated = generate_or_fallback(generator, &prompt).await;
    let comment = ReviewComment {
        pr: pr.clone(),
        body: generated.body,
    };

    let response = match delivery {
        Delivery::DryRun => None,
        Delivery::Post => {
            info!("posting review comment");
            let response = host
                .post_comment(pr, &comment.body)
                .await
                .map_err(|source| ReviewError::Post { pr: pr.clone(), source })?;
            Some(response)
        }
    };

    Ok(ReviewOutcome {
        comment,
        generation_error: generated.failure,
        response,
    })
}
