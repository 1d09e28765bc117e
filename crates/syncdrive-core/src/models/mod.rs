pub mod config;
pub mod error;
pub mod layout;
pub mod runtime;
pub mod task;

pub use config::{CONFIG_VERSION, SyncDriveConfig};
pub use error::{CoreError, CoreErrorKind};
pub use layout::KeyLayout;
pub use runtime::{DriveClient, PanUser, TaskRuntime, TransferSettings};
pub use task::SyncTask;
