//! Pipeline dependencies (using traits for testability)
//!
//! Central container handed to the journey pipeline. Every collaborator is a
//! trait object so tests can swap in the mocks from `test_dependencies`.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use crate::domains::journeys::models::OwnerIdentity;
use crate::kernel::{
    BaseCacheInvalidator, BaseExtractor, BaseIdentitySource, BaseJourneyCreator,
    BaseJourneyInitializer, BaseNotifier, BasePresentationSurface,
};

// =============================================================================
// Headless adapters
// =============================================================================

/// Identity source with a fixed (possibly absent) owner.
pub struct StaticIdentity(Option<OwnerIdentity>);

impl StaticIdentity {
    pub fn new(owner: Option<OwnerIdentity>) -> Self {
        Self(owner)
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl BaseIdentitySource for StaticIdentity {
    fn current_owner(&self) -> Option<OwnerIdentity> {
        self.0.clone()
    }
}

/// Presentation surface with nothing to close.
pub struct NoopSurface;

impl BasePresentationSurface for NoopSurface {
    fn on_close(&self) {
        tracing::debug!("Presentation surface closed");
    }
}

/// Presentation surface that reports the dialog closing on a terminal.
pub struct ConsoleSurface<W = io::Stderr> {
    out: Mutex<W>,
}

impl ConsoleSurface {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write> ConsoleSurface<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> BasePresentationSurface for ConsoleSurface<W> {
    fn on_close(&self) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "Journey dialog closed") {
            tracing::warn!(error = %e, "Failed to write to console");
        }
    }
}

/// Notification sink that writes to the tracing subscriber.
pub struct TracingNotifier;

impl BaseNotifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notification = "success", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(notification = "error", "{}", message);
    }
}

// =============================================================================
// PipelineDeps
// =============================================================================

/// Collaborators of the journey pipeline.
#[derive(Clone)]
pub struct PipelineDeps {
    pub extractor: Arc<dyn BaseExtractor>,
    pub creator: Arc<dyn BaseJourneyCreator>,
    pub initializer: Arc<dyn BaseJourneyInitializer>,
    /// Fire-and-forget target for "my journeys" invalidation.
    pub cache: Arc<dyn BaseCacheInvalidator>,
    pub notifier: Arc<dyn BaseNotifier>,
    pub identity: Arc<dyn BaseIdentitySource>,
    pub surface: Arc<dyn BasePresentationSurface>,
}

impl PipelineDeps {
    pub fn new(
        extractor: Arc<dyn BaseExtractor>,
        creator: Arc<dyn BaseJourneyCreator>,
        initializer: Arc<dyn BaseJourneyInitializer>,
        cache: Arc<dyn BaseCacheInvalidator>,
        notifier: Arc<dyn BaseNotifier>,
        identity: Arc<dyn BaseIdentitySource>,
        surface: Arc<dyn BasePresentationSurface>,
    ) -> Self {
        Self {
            extractor,
            creator,
            initializer,
            cache,
            notifier,
            identity,
            surface,
        }
    }
}
