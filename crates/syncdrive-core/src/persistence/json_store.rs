use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::models::{CoreError, CoreErrorKind, SyncDriveConfig};
use crate::persistence::{ConfigStore, PersistenceResult};

pub const CONFIG_FILE_NAME: &str = "sync_drive_config.json";

#[cfg(unix)]
const CONFIG_FILE_MODE: u32 = 0o755;

/// File-backed config store. The document lives at a fixed name inside a
/// caller-supplied directory, which must already exist.
pub struct JsonConfigStore {
    config_dir: PathBuf,
}

impl JsonConfigStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> PersistenceResult<SyncDriveConfig> {
        let path = self.config_file_path();
        let data = match fs::read(&path) {
            Ok(data) => data,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                return Err(store_error(
                    CoreErrorKind::ConfigMissing,
                    format!("sync drive config file does not exist: {}", path.display()),
                ));
            }
            Err(error) => {
                return Err(store_error(
                    CoreErrorKind::StorageFailure,
                    format!("failed to read '{}': {error}", path.display()),
                ));
            }
        };

        if data.is_empty() {
            tracing::debug!(path = %path.display(), "sync drive config file is empty");
            return Ok(SyncDriveConfig::default());
        }

        let config = decode(&data)?;
        tracing::debug!(
            path = %path.display(),
            tasks = config.sync_task_list.len(),
            "loaded sync drive config"
        );
        Ok(config)
    }

    fn save(&self, config: &SyncDriveConfig) -> PersistenceResult<()> {
        let path = self.config_file_path();
        let bytes = encode(config)?;

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(CONFIG_FILE_MODE);
        }

        options
            .open(&path)
            .and_then(|mut file| file.write_all(&bytes))
            .map_err(|error| {
                store_error(
                    CoreErrorKind::PersistFailed,
                    format!("failed to write '{}': {error}", path.display()),
                )
            })
    }
}

fn decode(data: &[u8]) -> PersistenceResult<SyncDriveConfig> {
    let config: SyncDriveConfig = serde_json::from_slice(data).map_err(|error| {
        store_error(
            CoreErrorKind::ConfigParse,
            format!("invalid sync drive config: {error}"),
        )
    })?;

    if !config.is_supported_version() {
        return Err(store_error(
            CoreErrorKind::ConfigParse,
            format!("unsupported config version '{}'", config.config_version),
        ));
    }

    Ok(config)
}

fn encode(config: &SyncDriveConfig) -> PersistenceResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b" "));
    config.serialize(&mut serializer).map_err(|error| {
        store_error(
            CoreErrorKind::PersistFailed,
            format!("failed to encode sync drive config: {error}"),
        )
    })?;
    Ok(bytes)
}

fn store_error(kind: CoreErrorKind, message: String) -> CoreError {
    CoreError {
        task: None,
        kind,
        message,
    }
}
