use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which of the four workflow states is active, without the attached data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Idle,
    Capturing,
    Processing,
    Result,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkflowPhase::Idle => "idle",
            WorkflowPhase::Capturing => "capturing",
            WorkflowPhase::Processing => "processing",
            WorkflowPhase::Result => "showing a result",
        };
        write!(f, "{s}")
    }
}

/// Identifies one recognition cycle, from acquisition to reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(pub Uuid);

impl CycleId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
