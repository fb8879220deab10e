use thiserror::Error;

/// Errors that abort a conversation turn and surface to the caller.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The similarity index is missing or empty, or the query could not be
    /// embedded against it. Fatal for the turn — there is no ungrounded
    /// fallback answer.
    #[error("similarity index unavailable: {0}")]
    IndexUnavailable(String),

    /// The generation model call failed. Carries the upstream detail.
    #[error("generation failed: {0}")]
    GenerationFailed(String),
}

/// A fact-extraction failure. The orchestrator absorbs this: the turn
/// continues with an empty profile update and the detail is only logged.
#[derive(Debug, Error)]
#[error("fact extraction failed: {0}")]
pub struct ExtractionError(pub String);
