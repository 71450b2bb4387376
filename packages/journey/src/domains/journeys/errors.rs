//! Pipeline error types.
//!
//! Collaborators speak `anyhow`; the pipeline wraps their failures in
//! [`StageError`] so the caller can tell which stage halted the run. Stage
//! errors never propagate out of `submit_url`: they are logged, turned into a
//! single error notification, and reported through the run outcome.

use thiserror::Error;

use super::state::Stage;
use super::template::JourneyTemplate;

/// Terminal failure of one pipeline stage. Never retried.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("extraction failed: {0}")]
    Extraction(#[source] anyhow::Error),

    #[error("no owner identity available at submission time")]
    OwnerUnavailable,

    #[error("journey creation failed: {0}")]
    Creation(#[source] anyhow::Error),

    #[error("journey initialization failed: {0}")]
    Initialization(#[source] anyhow::Error),
}

impl StageError {
    /// Stage that produced this failure.
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Extraction(_) => Stage::Extract,
            StageError::OwnerUnavailable | StageError::Creation(_) => Stage::Create,
            StageError::Initialization(_) => Stage::Initialize,
        }
    }

    /// User-facing notification text for this failure.
    pub fn user_message<'a>(&self, template: &'a JourneyTemplate) -> &'a str {
        match self.stage() {
            Stage::Extract => &template.extraction_failed,
            Stage::Create => &template.creation_failed,
            Stage::Initialize => &template.initialization_failed,
        }
    }
}

/// Errors returned to the caller of the pipeline itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A run is already in flight; the submission was ignored.
    #[error("a journey submission is already in progress")]
    Busy,

    /// The run task ended without reporting an outcome.
    #[error("pipeline run ended without an outcome")]
    RunAborted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_unavailable_counts_as_creation() {
        let template = JourneyTemplate::gitcoin();
        let err = StageError::OwnerUnavailable;

        assert_eq!(err.stage(), Stage::Create);
        assert_eq!(err.user_message(&template), "Gitcoin fetching failed");
    }

    #[test]
    fn test_messages_per_stage() {
        let template = JourneyTemplate::gitcoin();

        let extract = StageError::Extraction(anyhow::anyhow!("404"));
        let init = StageError::Initialization(anyhow::anyhow!("timeout"));

        assert_eq!(extract.user_message(&template), "Gitcoin fetching failed");
        assert_eq!(init.user_message(&template), "Gitcoin journey creation failed");
        assert!(extract.to_string().contains("404"));
    }
}
