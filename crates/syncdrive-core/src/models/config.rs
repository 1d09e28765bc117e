use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::SyncTask;
use crate::models::layout::{KeyLayout, string_or_default};

pub const CONFIG_VERSION: &str = "1.0";

const CONFIG_VERSION_KEY: &str = "configVer";
const TASK_LIST_KEY: &str = "syncTaskList";

/// The persisted sync drive document: a schema version tag and the ordered
/// list of task definitions. Both keys are always written; other top-level
/// keys keep the position they were read at.
#[derive(Clone, Debug)]
pub struct SyncDriveConfig {
    pub config_version: String,
    pub sync_task_list: Vec<SyncTask>,
    pub extra: Map<String, Value>,
    pub layout: KeyLayout,
}

impl Default for SyncDriveConfig {
    fn default() -> Self {
        Self {
            config_version: CONFIG_VERSION.to_string(),
            sync_task_list: Vec::new(),
            extra: Map::new(),
            layout: KeyLayout::default(),
        }
    }
}

impl SyncDriveConfig {
    pub fn is_supported_version(&self) -> bool {
        self.config_version == CONFIG_VERSION
    }

    pub fn is_empty(&self) -> bool {
        self.sync_task_list.is_empty()
    }
}

impl PartialEq for SyncDriveConfig {
    fn eq(&self, other: &Self) -> bool {
        self.config_version == other.config_version
            && self.sync_task_list == other.sync_task_list
            && self.extra == other.extra
    }
}

impl Serialize for SyncDriveConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;

        for key in self.layout.keys() {
            match key.as_str() {
                CONFIG_VERSION_KEY => map.serialize_entry(key, &self.config_version)?,
                TASK_LIST_KEY => map.serialize_entry(key, &self.sync_task_list)?,
                _ => {
                    if let Some(value) = self.extra.get(key) {
                        map.serialize_entry(key, value)?;
                    }
                }
            }
        }

        if !self.layout.contains(CONFIG_VERSION_KEY) {
            map.serialize_entry(CONFIG_VERSION_KEY, &self.config_version)?;
        }
        if !self.layout.contains(TASK_LIST_KEY) {
            map.serialize_entry(TASK_LIST_KEY, &self.sync_task_list)?;
        }
        for (key, value) in &self.extra {
            if !self.layout.contains(key) {
                map.serialize_entry(key, value)?;
            }
        }

        map.end()
    }
}

impl<'de> Deserialize<'de> for SyncDriveConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let object = Map::<String, Value>::deserialize(deserializer)?;
        let mut config = SyncDriveConfig {
            layout: KeyLayout::read(object.keys()),
            ..SyncDriveConfig::default()
        };

        for (key, value) in object {
            match key.as_str() {
                CONFIG_VERSION_KEY => {
                    let version =
                        string_or_default(&key, value).map_err(<D::Error as DeError>::custom)?;
                    if let Some(version) = version {
                        config.config_version = version;
                    }
                }
                TASK_LIST_KEY => {
                    config.sync_task_list = match value {
                        Value::Null => Vec::new(),
                        list => serde_json::from_value(list).map_err(|error| {
                            <D::Error as DeError>::custom(format!(
                                "invalid '{TASK_LIST_KEY}': {error}"
                            ))
                        })?,
                    };
                }
                _ => {
                    config.extra.insert(key, value);
                }
            }
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{CONFIG_VERSION, SyncDriveConfig};

    #[test]
    fn null_task_list_reads_as_empty() {
        let config: SyncDriveConfig =
            serde_json::from_str(r#"{"configVer":"1.0","syncTaskList":null}"#).unwrap();
        assert!(config.is_empty());
    }

    #[test]
    fn null_or_missing_version_falls_back_to_current() {
        let config: SyncDriveConfig = serde_json::from_str(r#"{"configVer":null}"#).unwrap();
        assert_eq!(config.config_version, CONFIG_VERSION);

        let config: SyncDriveConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SyncDriveConfig::default());
    }

    #[test]
    fn task_list_of_wrong_type_is_rejected() {
        let source = r#"{"syncTaskList":{"name":"x"}}"#;
        let error = serde_json::from_str::<SyncDriveConfig>(source).unwrap_err();
        assert!(error.to_string().contains("syncTaskList"));
    }

    #[test]
    fn top_level_keys_keep_their_position() {
        let config: SyncDriveConfig = serde_json::from_str(
            r#"{"owner":"me","syncTaskList":[],"configVer":"1.0","note":1}"#,
        )
        .unwrap();
        let value = serde_json::to_value(&config).unwrap();
        let keys = value
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect::<Vec<_>>();

        assert_eq!(keys, vec!["owner", "syncTaskList", "configVer", "note"]);
        assert!(config.is_supported_version());
    }

    #[test]
    fn missing_schema_keys_are_written() {
        let config: SyncDriveConfig = serde_json::from_str(r#"{"owner":"me"}"#).unwrap();
        let value = serde_json::to_value(&config).unwrap();
        let keys = value
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect::<Vec<_>>();

        assert_eq!(keys, vec!["owner", "configVer", "syncTaskList"]);
    }
}
