//! Test harness for pipeline integration tests.
//!
//! Wires a `JourneyPipeline` to the recording mocks from
//! `kernel::test_dependencies` and opens the dialog, so each test starts from
//! the state a user sees after clicking "new journey".

use journey_core::domains::journeys::{JourneyPipeline, PipelineState};
use journey_core::kernel::test_dependencies::TestDependencies;
use std::time::Duration;
use test_context::AsyncTestContext;

/// Upper bound for anything a test waits on.
const WAIT_LIMIT: Duration = Duration::from_secs(2);

/// Test harness holding the pipeline and handles to its mocks.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(PipelineHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &mut PipelineHarness) {
///     let handle = ctx.pipeline.submit_url("https://example.com").unwrap();
///     // ... test code
/// }
/// ```
pub struct PipelineHarness {
    pub mocks: TestDependencies,
    pub pipeline: JourneyPipeline,
}

impl AsyncTestContext for PipelineHarness {
    async fn setup() -> Self {
        Self::with_mocks(TestDependencies::new())
    }

    async fn teardown(self) {
        // Mocks and pipeline are dropped with the harness
    }
}

impl PipelineHarness {
    /// Build a harness around custom mocks.
    pub fn with_mocks(mocks: TestDependencies) -> Self {
        // Uses try_init() to avoid panicking if already initialized.
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let pipeline = JourneyPipeline::new(mocks.deps());
        pipeline.open();

        Self { mocks, pipeline }
    }

    /// Wait until the pipeline state satisfies `predicate`.
    pub async fn wait_for_state<F>(&self, predicate: F) -> PipelineState
    where
        F: FnMut(&PipelineState) -> bool,
    {
        let mut rx = self.pipeline.subscribe();
        let state = tokio::time::timeout(WAIT_LIMIT, rx.wait_for(predicate))
            .await
            .expect("timed out waiting for pipeline state")
            .expect("pipeline state channel closed");
        state.clone()
    }

    /// Wait until `condition` holds, yielding to detached tasks in between.
    pub async fn eventually<F>(&self, condition: F)
    where
        F: Fn() -> bool,
    {
        eventually(condition).await
    }

    /// Give detached tasks a chance to run before asserting they did nothing.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Wait until `condition` holds, yielding to detached tasks in between.
pub async fn eventually<F>(condition: F)
where
    F: Fn() -> bool,
{
    tokio::time::timeout(WAIT_LIMIT, async {
        while !condition() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}
