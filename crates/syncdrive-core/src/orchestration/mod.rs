pub mod task_manager;

pub use task_manager::{DEFAULT_START_PACING, SyncTaskManager};

use std::sync::Arc;

use crate::models::{CoreError, SyncTask, TaskRuntime};

pub type OrchestrationResult<T> = Result<T, CoreError>;

/// The sync engine that runs an individual task once the orchestrator hands
/// it over. Calls block until the task has finished starting or stopping.
///
/// Engines may update the task they are given (for example its last sync
/// time); the updated definition is what gets persisted.
pub trait SyncEngine: Send + Sync {
    fn start(&self, task: &mut SyncTask, runtime: Arc<TaskRuntime>) -> OrchestrationResult<()>;

    fn stop(&self, task: &mut SyncTask) -> OrchestrationResult<()>;
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum LifecyclePhase {
    Start,
    Stop,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TaskOutcomeState {
    Succeeded,
    Failed(CoreError),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskOutcome {
    pub task_id: String,
    pub label: String,
    pub state: TaskOutcomeState,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        self.state == TaskOutcomeState::Succeeded
    }
}

/// Per-task results of one start or stop pass, in document order, plus the
/// error from writing the document back if that failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchReport {
    pub phase: LifecyclePhase,
    pub outcomes: Vec<TaskOutcome>,
    pub persist_error: Option<CoreError>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_success())
    }

    pub fn persist_error(&self) -> Option<&CoreError> {
        self.persist_error.as_ref()
    }

    pub fn is_persisted(&self) -> bool {
        self.persist_error.is_none()
    }
}
