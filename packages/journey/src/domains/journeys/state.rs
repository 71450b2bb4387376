//! Observable state of a journey submission dialog.

use serde::Serialize;
use std::fmt;

/// One of the three sequential pipeline steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Extract,
    Create,
    Initialize,
}

impl Stage {
    /// The stage that follows this one, if any.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Extract => Some(Stage::Create),
            Stage::Create => Some(Stage::Initialize),
            Stage::Initialize => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Extract => write!(f, "extract"),
            Stage::Create => write!(f, "create"),
            Stage::Initialize => write!(f, "initialize"),
        }
    }
}

/// Per-stage in-flight flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageFlags {
    pub extract: bool,
    pub create: bool,
    pub initialize: bool,
}

impl StageFlags {
    pub fn get(&self, stage: Stage) -> bool {
        match stage {
            Stage::Extract => self.extract,
            Stage::Create => self.create,
            Stage::Initialize => self.initialize,
        }
    }

    pub fn set(&mut self, stage: Stage, in_flight: bool) {
        match stage {
            Stage::Extract => self.extract = in_flight,
            Stage::Create => self.create = in_flight,
            Stage::Initialize => self.initialize = in_flight,
        }
    }

    /// Combined busy signal.
    pub fn is_pending(&self) -> bool {
        self.extract || self.create || self.initialize
    }
}

/// Snapshot of the dialog: URL field, visibility and stage flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineState {
    pub url: String,
    pub is_open: bool,
    pub in_flight: StageFlags,
}

impl PipelineState {
    /// State of a freshly opened dialog.
    pub fn opened() -> Self {
        Self {
            url: String::new(),
            is_open: true,
            in_flight: StageFlags::default(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_pending()
    }

    /// Clear the URL and close the dialog.
    pub(crate) fn reset(&mut self) {
        self.url.clear();
        self.is_open = false;
    }
}
