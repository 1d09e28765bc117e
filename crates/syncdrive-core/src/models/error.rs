#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum CoreErrorKind {
    ConfigMissing,
    ConfigParse,
    NoTasksConfigured,
    TaskStartFailed,
    TaskStopFailed,
    PersistFailed,
    StorageFailure,
    Internal,
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct CoreError {
    pub task: Option<String>,
    pub kind: CoreErrorKind,
    pub message: String,
}

impl CoreError {
    /// Re-tags an error as belonging to `task_id`, keeping the task the error
    /// already names if it has one.
    pub fn attributed(self, task_id: &str, kind: CoreErrorKind) -> Self {
        Self {
            task: self.task.or_else(|| Some(task_id.to_string())),
            kind,
            message: self.message,
        }
    }
}
