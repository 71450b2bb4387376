//! Fixed labels and user-facing messages for a journey template.

use serde::{Deserialize, Serialize};

/// Messages and constants for one journey source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyTemplate {
    /// Description written onto every journey created from this template.
    pub description: String,
    /// Cache collection that lists the user's journeys.
    pub cache_key: String,
    pub success_message: String,
    pub extraction_failed: String,
    pub creation_failed: String,
    pub initialization_failed: String,
}

impl JourneyTemplate {
    /// Template for Gitcoin grant pages.
    pub fn gitcoin() -> Self {
        Self {
            description: "Gitcoin Project".to_string(),
            cache_key: MY_JOURNEYS_CACHE_KEY.to_string(),
            success_message: "Gitcoin journey created successfully".to_string(),
            extraction_failed: "Gitcoin fetching failed".to_string(),
            // Shipped wording: each stage reports under the previous stage's text.
            creation_failed: "Gitcoin fetching failed".to_string(),
            initialization_failed: "Gitcoin journey creation failed".to_string(),
        }
    }
}

impl Default for JourneyTemplate {
    fn default() -> Self {
        Self::gitcoin()
    }
}

/// Cache key of the "my journeys" collection.
pub const MY_JOURNEYS_CACHE_KEY: &str = "myFrames";
