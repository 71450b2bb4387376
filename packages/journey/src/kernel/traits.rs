// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no pipeline logic.
// Sequencing, state and error reporting live in domains::journeys.
//
// Naming convention: Base* for trait names (e.g., BaseExtractor, BaseNotifier)

use anyhow::Result;
use async_trait::async_trait;

use crate::domains::journeys::models::{
    CreateJourneyRequest, ExternalRecord, JourneyEntity, OwnerIdentity,
};

// =============================================================================
// Stage Collaborators
// =============================================================================

#[async_trait]
pub trait BaseExtractor: Send + Sync {
    /// Extract a structured record from an external URL.
    /// The URL is passed through unvalidated; reject by returning an error.
    async fn extract(&self, url: &str) -> Result<ExternalRecord>;
}

#[async_trait]
pub trait BaseJourneyCreator: Send + Sync {
    /// Persist a new journey and return it with its assigned id.
    async fn create(&self, request: CreateJourneyRequest) -> Result<JourneyEntity>;
}

#[async_trait]
pub trait BaseJourneyInitializer: Send + Sync {
    /// Run template-specific setup for a freshly created journey.
    async fn initialize(&self, journey_id: &str, record: &ExternalRecord) -> Result<()>;
}

// =============================================================================
// Cache Invalidation
// =============================================================================

#[async_trait]
pub trait BaseCacheInvalidator: Send + Sync {
    /// Mark a cached collection stale so its next read refetches.
    async fn mark_stale(&self, key: &str) -> Result<()>;
}

// =============================================================================
// UI Boundary
// =============================================================================

/// Toast-style notification sink.
pub trait BaseNotifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Source of the acting wallet/account, read at submission time.
pub trait BaseIdentitySource: Send + Sync {
    fn current_owner(&self) -> Option<OwnerIdentity>;
}

/// Dialog hosting the URL field.
pub trait BasePresentationSurface: Send + Sync {
    /// Close the surface. Called only when the pipeline resets its state.
    fn on_close(&self);
}
