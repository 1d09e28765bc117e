use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::layout::{KeyLayout, string_or_default};

const TASK_FIELDS: [&str; 7] = [
    "name",
    "id",
    "driveId",
    "localFolderPath",
    "panFolderPath",
    "mode",
    "lastSyncTime",
];

/// One local folder to remote folder pairing as persisted in the sync drive
/// config file. Keys the core does not know about are carried in `extra`.
///
/// A task read from disk remembers the order and presence of its keys in
/// `layout` and is written back the same way. A known key that was absent is
/// only added once it holds a non-empty value.
#[derive(Clone, Debug, Default)]
pub struct SyncTask {
    pub name: String,
    pub id: String,
    pub drive_id: String,
    pub local_folder_path: String,
    pub pan_folder_path: String,
    pub mode: String,
    pub last_sync_time: String,
    pub extra: Map<String, Value>,
    pub layout: KeyLayout,
}

impl SyncTask {
    pub fn name_label(&self) -> String {
        format!("{}({})", self.name, self.id)
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    fn field(&self, key: &str) -> Option<&String> {
        match key {
            "name" => Some(&self.name),
            "id" => Some(&self.id),
            "driveId" => Some(&self.drive_id),
            "localFolderPath" => Some(&self.local_folder_path),
            "panFolderPath" => Some(&self.pan_folder_path),
            "mode" => Some(&self.mode),
            "lastSyncTime" => Some(&self.last_sync_time),
            _ => None,
        }
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        match key {
            "name" => Some(&mut self.name),
            "id" => Some(&mut self.id),
            "driveId" => Some(&mut self.drive_id),
            "localFolderPath" => Some(&mut self.local_folder_path),
            "panFolderPath" => Some(&mut self.pan_folder_path),
            "mode" => Some(&mut self.mode),
            "lastSyncTime" => Some(&mut self.last_sync_time),
            _ => None,
        }
    }
}

// `layout` is formatting, not content.
impl PartialEq for SyncTask {
    fn eq(&self, other: &Self) -> bool {
        TASK_FIELDS
            .iter()
            .all(|key| self.field(key) == other.field(key))
            && self.extra == other.extra
    }
}

impl Serialize for SyncTask {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        for key in self.layout.keys() {
            if let Some(value) = self.field(key) {
                map.serialize_entry(key, value)?;
            } else if let Some(value) = self.extra.get(key) {
                map.serialize_entry(key, value)?;
            }
        }

        for key in TASK_FIELDS {
            if self.layout.contains(key) {
                continue;
            }
            let value = self.field(key).map(String::as_str).unwrap_or_default();
            if !self.layout.is_recorded() || !value.is_empty() {
                map.serialize_entry(key, value)?;
            }
        }

        for (key, value) in &self.extra {
            if !self.layout.contains(key) {
                map.serialize_entry(key, value)?;
            }
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for SyncTask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let mut task = SyncTask {
            layout: KeyLayout::read(object.keys()),
            ..SyncTask::default()
        };

        for (key, value) in object {
            match task.field_mut(&key) {
                Some(slot) => {
                    *slot = string_or_default(&key, value)
                        .map_err(<D::Error as DeError>::custom)?
                        .unwrap_or_default();
                }
                None => {
                    task.extra.insert(key, value);
                }
            }
        }

        Ok(task)
    }
}
