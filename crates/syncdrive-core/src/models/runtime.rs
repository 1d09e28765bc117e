use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

/// Handle to the cloud drive client shared by every task of a batch.
///
/// The orchestration layer only passes the handle along; engines recover the
/// concrete client through `as_any`.
pub trait DriveClient: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PanUser {
    pub user_id: String,
    pub nickname: String,
}

/// Transfer tuning applied to every task. Block sizes of zero leave the
/// choice to the engine and rates of zero mean unlimited.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TransferSettings {
    pub upload_parallel: usize,
    pub download_parallel: usize,
    pub upload_block_size: u64,
    pub download_block_size: u64,
    pub use_internal_url: bool,
    pub max_upload_rate: u64,
    pub max_download_rate: u64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            upload_parallel: 1,
            download_parallel: 1,
            upload_block_size: 0,
            download_block_size: 0,
            use_internal_url: false,
            max_upload_rate: 0,
            max_download_rate: 0,
        }
    }
}

/// Runtime parameters injected into each task when it starts. One instance
/// is shared by reference across the whole batch.
pub struct TaskRuntime {
    pub user: PanUser,
    pub drive_id: String,
    pub state_dir: PathBuf,
    pub client: Arc<dyn DriveClient>,
    pub transfer: TransferSettings,
}

impl Debug for TaskRuntime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRuntime")
            .field("user", &self.user)
            .field("drive_id", &self.drive_id)
            .field("state_dir", &self.state_dir)
            .field("transfer", &self.transfer)
            .finish_non_exhaustive()
    }
}
