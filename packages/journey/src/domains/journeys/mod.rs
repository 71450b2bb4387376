//! Journeys domain - turning an external URL into an initialized journey.

pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod state;
pub mod template;

pub use errors::{PipelineError, StageError};
pub use models::{CreateJourneyRequest, ExternalRecord, JourneyEntity, OwnerIdentity};
pub use orchestrator::{JourneyPipeline, RunHandle, RunOutcome};
pub use state::{PipelineState, Stage, StageFlags};
pub use template::{JourneyTemplate, MY_JOURNEYS_CACHE_KEY};
