// TestDependencies - mock implementations for testing
//
// Provides recording mocks that can be injected into JourneyPipeline for tests.
// Every stage mock can be gated on a `Notify` to hold its call in flight.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{watch, Notify};

use super::{
    BaseCacheInvalidator, BaseExtractor, BaseIdentitySource, BaseJourneyCreator,
    BaseJourneyInitializer, BaseNotifier, BasePresentationSurface, PipelineDeps,
};
use crate::domains::journeys::models::{
    CreateJourneyRequest, ExternalRecord, JourneyEntity, OwnerIdentity,
};
use crate::domains::journeys::state::PipelineState;

async fn pass_gate(gate: &Option<Arc<Notify>>) {
    if let Some(gate) = gate {
        gate.notified().await;
    }
}

// =============================================================================
// Mock Extractor
// =============================================================================

pub struct MockExtractor {
    responses: Mutex<Vec<Result<ExternalRecord, String>>>,
    calls: Mutex<Vec<String>>,
    gate: Option<Arc<Notify>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Queue a record to be returned
    pub fn with_record(self, record: ExternalRecord) -> Self {
        self.responses.lock().unwrap().push(Ok(record));
        self
    }

    /// Queue a rejection
    pub fn with_failure(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    /// Hold each call until the gate is notified
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Get all URLs that were extracted
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseExtractor for MockExtractor {
    async fn extract(&self, url: &str) -> Result<ExternalRecord> {
        self.calls.lock().unwrap().push(url.to_string());
        pass_gate(&self.gate).await;

        let next = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses.remove(0))
            }
        };

        match next {
            Some(Ok(record)) => Ok(record),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(ExternalRecord::new("Mock Page", "mock.png")),
        }
    }
}

// =============================================================================
// Mock Journey Creator
// =============================================================================

pub struct MockJourneyCreator {
    responses: Mutex<Vec<Result<JourneyEntity, String>>>,
    calls: Mutex<Vec<CreateJourneyRequest>>,
    gate: Option<Arc<Notify>>,
}

impl MockJourneyCreator {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn with_journey(self, journey: JourneyEntity) -> Self {
        self.responses.lock().unwrap().push(Ok(journey));
        self
    }

    pub fn with_failure(self, message: &str) -> Self {
        self.responses.lock().unwrap().push(Err(message.to_string()));
        self
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Get all creation requests that were received
    pub fn calls(&self) -> Vec<CreateJourneyRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockJourneyCreator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseJourneyCreator for MockJourneyCreator {
    async fn create(&self, request: CreateJourneyRequest) -> Result<JourneyEntity> {
        self.calls.lock().unwrap().push(request);
        pass_gate(&self.gate).await;

        let next = {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses.remove(0))
            }
        };

        match next {
            Some(Ok(journey)) => Ok(journey),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Ok(JourneyEntity::new("mock-journey")),
        }
    }
}

// =============================================================================
// Mock Journey Initializer
// =============================================================================

pub struct MockJourneyInitializer {
    failure: Mutex<Option<String>>,
    calls: Mutex<Vec<(String, ExternalRecord)>>,
    gate: Option<Arc<Notify>>,
}

impl MockJourneyInitializer {
    pub fn new() -> Self {
        Self {
            failure: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Reject every call with `message`
    pub fn with_failure(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Get all (journey id, record) pairs that were initialized
    pub fn calls(&self) -> Vec<(String, ExternalRecord)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for MockJourneyInitializer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseJourneyInitializer for MockJourneyInitializer {
    async fn initialize(&self, journey_id: &str, record: &ExternalRecord) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((journey_id.to_string(), record.clone()));
        pass_gate(&self.gate).await;

        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(anyhow!(message)),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Mock Cache Invalidator
// =============================================================================

pub struct MockCacheInvalidator {
    calls: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockCacheInvalidator {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every invalidation return an error
    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    /// Get all keys that were marked stale
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockCacheInvalidator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseCacheInvalidator for MockCacheInvalidator {
    async fn mark_stale(&self, key: &str) -> Result<()> {
        self.calls.lock().unwrap().push(key.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("cache unavailable"));
        }
        Ok(())
    }
}

// =============================================================================
// Recording Notifier / Surface / Identity
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    successes: Mutex<Vec<String>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.successes.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl BaseNotifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.successes.lock().unwrap().push(message.to_string());
    }

    fn error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// Surface that counts closes and, once observing a pipeline, records the
/// state it could read at each close
#[derive(Default)]
pub struct RecordingSurface {
    closes: AtomicUsize,
    observed: Mutex<Option<watch::Receiver<PipelineState>>>,
    states_at_close: Mutex<Vec<PipelineState>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Read pipeline state from inside every later `on_close`
    pub fn observe(&self, state: watch::Receiver<PipelineState>) {
        *self.observed.lock().unwrap() = Some(state);
    }

    pub fn states_at_close(&self) -> Vec<PipelineState> {
        self.states_at_close.lock().unwrap().clone()
    }
}

impl BasePresentationSurface for RecordingSurface {
    fn on_close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if let Some(state) = self.observed.lock().unwrap().as_ref() {
            let seen = state.borrow().clone();
            self.states_at_close.lock().unwrap().push(seen);
        }
    }
}

/// Identity source whose owner can change between submissions
#[derive(Default)]
pub struct MockIdentity {
    owner: Mutex<Option<OwnerIdentity>>,
}

impl MockIdentity {
    pub fn new(owner: Option<&str>) -> Self {
        Self {
            owner: Mutex::new(owner.map(OwnerIdentity::new)),
        }
    }

    pub fn set(&self, owner: Option<&str>) {
        *self.owner.lock().unwrap() = owner.map(OwnerIdentity::new);
    }
}

impl BaseIdentitySource for MockIdentity {
    fn current_owner(&self) -> Option<OwnerIdentity> {
        self.owner.lock().unwrap().clone()
    }
}

// =============================================================================
// TestDependencies
// =============================================================================

/// Wallet address used by default in tests
pub const TEST_OWNER: &str = "0x00000000000000000000000000000000000000aa";

/// Bundle of mocks with handles kept for assertions.
pub struct TestDependencies {
    pub extractor: Arc<MockExtractor>,
    pub creator: Arc<MockJourneyCreator>,
    pub initializer: Arc<MockJourneyInitializer>,
    pub cache: Arc<MockCacheInvalidator>,
    pub notifier: Arc<RecordingNotifier>,
    pub identity: Arc<MockIdentity>,
    pub surface: Arc<RecordingSurface>,
}

impl TestDependencies {
    pub fn new() -> Self {
        Self {
            extractor: Arc::new(MockExtractor::new()),
            creator: Arc::new(MockJourneyCreator::new()),
            initializer: Arc::new(MockJourneyInitializer::new()),
            cache: Arc::new(MockCacheInvalidator::new()),
            notifier: Arc::new(RecordingNotifier::new()),
            identity: Arc::new(MockIdentity::new(Some(TEST_OWNER))),
            surface: Arc::new(RecordingSurface::new()),
        }
    }

    pub fn mock_extractor(mut self, extractor: MockExtractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }

    pub fn mock_creator(mut self, creator: MockJourneyCreator) -> Self {
        self.creator = Arc::new(creator);
        self
    }

    pub fn mock_initializer(mut self, initializer: MockJourneyInitializer) -> Self {
        self.initializer = Arc::new(initializer);
        self
    }

    pub fn mock_cache(mut self, cache: MockCacheInvalidator) -> Self {
        self.cache = Arc::new(cache);
        self
    }

    pub fn without_owner(self) -> Self {
        self.identity.set(None);
        self
    }

    /// Build PipelineDeps sharing these mocks
    pub fn deps(&self) -> PipelineDeps {
        PipelineDeps::new(
            self.extractor.clone(),
            self.creator.clone(),
            self.initializer.clone(),
            self.cache.clone(),
            self.notifier.clone(),
            self.identity.clone(),
            self.surface.clone(),
        )
    }
}

impl Default for TestDependencies {
    fn default() -> Self {
        Self::new()
    }
}
