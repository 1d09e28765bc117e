pub mod json_store;

pub use json_store::{CONFIG_FILE_NAME, JsonConfigStore};

use crate::models::{CoreError, SyncDriveConfig};

pub type PersistenceResult<T> = Result<T, CoreError>;

pub trait ConfigStore: Send + Sync {
    fn load(&self) -> PersistenceResult<SyncDriveConfig>;

    fn save(&self, config: &SyncDriveConfig) -> PersistenceResult<()>;
}
