use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::models::{
    CoreError, CoreErrorKind, DriveClient, PanUser, SyncDriveConfig, SyncTask, TaskRuntime,
    TransferSettings,
};
use crate::orchestration::{
    BatchReport, LifecyclePhase, OrchestrationResult, SyncEngine, TaskOutcome, TaskOutcomeState,
};
use crate::persistence::{ConfigStore, JsonConfigStore};

/// Pause between two consecutive task starts, so engines do not all hit the
/// drive API at the same moment.
pub const DEFAULT_START_PACING: Duration = Duration::from_millis(200);

/// Drives every configured sync task through start and stop, one task at a
/// time in document order.
///
/// A failing task never aborts the batch. Whatever happened to the tasks, the
/// in-memory document (including freshly assigned ids) is written back to the
/// store at the end of each pass.
pub struct SyncTaskManager {
    store: Arc<dyn ConfigStore>,
    engine: Arc<dyn SyncEngine>,
    runtime: Arc<TaskRuntime>,
    start_pacing: Duration,
    config: SyncDriveConfig,
}

impl SyncTaskManager {
    /// Manager backed by the JSON config file in `config_dir`. The same
    /// directory is handed to tasks as their shared state directory.
    pub fn open(
        config_dir: impl Into<PathBuf>,
        user: PanUser,
        drive_id: impl Into<String>,
        client: Arc<dyn DriveClient>,
        transfer: TransferSettings,
        engine: Arc<dyn SyncEngine>,
    ) -> Self {
        let config_dir = config_dir.into();
        let runtime = TaskRuntime {
            user,
            drive_id: drive_id.into(),
            state_dir: config_dir.clone(),
            client,
            transfer,
        };

        Self::with_store(
            Arc::new(JsonConfigStore::new(config_dir)),
            engine,
            Arc::new(runtime),
        )
    }

    pub fn with_store(
        store: Arc<dyn ConfigStore>,
        engine: Arc<dyn SyncEngine>,
        runtime: Arc<TaskRuntime>,
    ) -> Self {
        Self {
            store,
            engine,
            runtime,
            start_pacing: DEFAULT_START_PACING,
            config: SyncDriveConfig::default(),
        }
    }

    pub fn with_start_pacing(mut self, pacing: Duration) -> Self {
        self.start_pacing = pacing;
        self
    }

    pub fn config(&self) -> &SyncDriveConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Arc<TaskRuntime> {
        &self.runtime
    }

    /// Loads the document, then starts every task in order.
    ///
    /// The start pacing delay runs before each task after the first, whether
    /// or not the previous task started, and never after the last one.
    ///
    /// Fails only when the document cannot be loaded or lists no tasks; in
    /// both cases nothing is started and nothing is written.
    pub async fn start(&mut self) -> OrchestrationResult<BatchReport> {
        // a failed load leaves an empty document behind for a later stop
        self.config = SyncDriveConfig::default();
        self.config = load_config(self.store.clone()).await?;

        if self.config.is_empty() {
            return Err(CoreError {
                task: None,
                kind: CoreErrorKind::NoTasksConfigured,
                message: "no sync task configured".to_string(),
            });
        }

        let task_count = self.config.sync_task_list.len();
        let mut outcomes = Vec::with_capacity(task_count);
        for index in 0..task_count {
            if index > 0 && !self.start_pacing.is_zero() {
                tokio::time::sleep(self.start_pacing).await;
            }

            let task = &mut self.config.sync_task_list[index];
            if !task.has_id() {
                task.id = Uuid::new_v4().to_string();
                tracing::debug!(task_id = %task.id, name = %task.name, "assigned id to sync task");
            }
            task.drive_id.clone_from(&self.runtime.drive_id);

            let engine = self.engine.clone();
            let runtime = self.runtime.clone();
            let outcome = run_engine_call(task, LifecyclePhase::Start, move |task| {
                engine.start(task, runtime)
            })
            .await;
            outcomes.push(outcome);
        }

        let persist_error = self.persist(LifecyclePhase::Start).await;
        Ok(BatchReport {
            phase: LifecyclePhase::Start,
            outcomes,
            persist_error,
        })
    }

    /// Stops every task of the document currently held in memory.
    ///
    /// The document is not reloaded: without a prior `start` the manager holds
    /// an empty document, and that empty document is what gets written.
    pub async fn stop(&mut self) -> BatchReport {
        let mut outcomes = Vec::with_capacity(self.config.sync_task_list.len());
        for task in self.config.sync_task_list.iter_mut() {
            let engine = self.engine.clone();
            let outcome =
                run_engine_call(task, LifecyclePhase::Stop, move |task| engine.stop(task)).await;
            outcomes.push(outcome);
        }

        let persist_error = self.persist(LifecyclePhase::Stop).await;
        BatchReport {
            phase: LifecyclePhase::Stop,
            outcomes,
            persist_error,
        }
    }

    async fn persist(&self, phase: LifecyclePhase) -> Option<CoreError> {
        let store = self.store.clone();
        let snapshot = self.config.clone();
        let saved = match tokio::task::spawn_blocking(move || store.save(&snapshot)).await {
            Ok(result) => result,
            Err(join_error) => Err(CoreError {
                task: None,
                kind: CoreErrorKind::Internal,
                message: format!("config persistence join failure: {join_error}"),
            }),
        };

        let error = saved.err()?;
        let error = CoreError {
            task: None,
            kind: CoreErrorKind::PersistFailed,
            message: error.message,
        };
        tracing::error!(
            phase = ?phase,
            kind = ?error.kind,
            message = %error.message,
            "failed to persist sync drive config"
        );
        Some(error)
    }
}

async fn load_config(store: Arc<dyn ConfigStore>) -> OrchestrationResult<SyncDriveConfig> {
    tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|join_error| CoreError {
            task: None,
            kind: CoreErrorKind::Internal,
            message: format!("config load join failure: {join_error}"),
        })?
}

/// Runs one engine call on the blocking pool against a copy of `task`, then
/// writes the copy back. A panicking engine leaves `task` as it was.
async fn run_engine_call<F>(task: &mut SyncTask, phase: LifecyclePhase, call: F) -> TaskOutcome
where
    F: FnOnce(&mut SyncTask) -> OrchestrationResult<()> + Send + 'static,
{
    let mut working = task.clone();
    let joined = tokio::task::spawn_blocking(move || {
        let result = call(&mut working);
        (working, result)
    })
    .await;

    let result = match joined {
        Ok((updated, result)) => {
            *task = updated;
            result
        }
        Err(join_error) => Err(CoreError {
            task: None,
            kind: CoreErrorKind::Internal,
            message: format!("sync engine call did not complete: {join_error}"),
        }),
    };

    let label = task.name_label();
    let state = match result {
        Ok(()) => {
            tracing::info!(
                task_id = %task.id,
                label = %label,
                phase = ?phase,
                "sync task transition succeeded"
            );
            TaskOutcomeState::Succeeded
        }
        Err(error) => {
            let error = error.attributed(&task.id, failure_kind(phase));
            tracing::error!(
                task_id = %task.id,
                label = %label,
                phase = ?phase,
                kind = ?error.kind,
                message = %error.message,
                "sync task transition failed"
            );
            TaskOutcomeState::Failed(error)
        }
    };

    TaskOutcome {
        task_id: task.id.clone(),
        label,
        state,
    }
}

fn failure_kind(phase: LifecyclePhase) -> CoreErrorKind {
    match phase {
        LifecyclePhase::Start => CoreErrorKind::TaskStartFailed,
        LifecyclePhase::Stop => CoreErrorKind::TaskStopFailed,
    }
}
