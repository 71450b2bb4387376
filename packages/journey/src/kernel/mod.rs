//! Kernel module - pipeline infrastructure and dependencies.

pub mod deps;
pub mod http_client;
pub mod query_cache;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ConsoleSurface, NoopSurface, PipelineDeps, StaticIdentity, TracingNotifier};
pub use http_client::{HttpExtractor, HttpJourneyClient};
pub use query_cache::QueryCache;
pub use traits::*;
