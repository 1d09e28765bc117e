use std::fs;

use serde_json::Value;
use syncdrive_core::models::{CoreErrorKind, SyncDriveConfig, SyncTask};
use syncdrive_core::persistence::{CONFIG_FILE_NAME, ConfigStore, JsonConfigStore};

const SAMPLE_CONFIG: &str = r#"{
 "comment": "kept in place",
 "configVer": "1.0",
 "syncTaskList": [
  {
   "name": "game backup",
   "excludeNames": [
    "*.tmp"
   ],
   "id": "5b2d7c10-e927-4e72-8f9d-5abb3bb04814",
   "driveId": "19519111",
   "localFolderPath": "D:\\smb\\datadisk\\game",
   "panFolderPath": "/sync_drive/game",
   "mode": "sync",
   "lastSyncTime": ""
  },
  {
   "name": "photos",
   "id": "",
   "driveId": "19519111",
   "localFolderPath": "/home/me/photos",
   "panFolderPath": "/sync_drive/photos",
   "mode": "upload",
   "lastSyncTime": "2023-01-14 10:31:02"
  }
 ]
}"#;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> JsonConfigStore {
    fs::write(dir.path().join(CONFIG_FILE_NAME), contents).unwrap();
    JsonConfigStore::new(dir.path())
}

#[test]
fn config_file_lives_at_fixed_name_inside_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonConfigStore::new(dir.path());

    assert_eq!(store.config_dir(), dir.path());
    assert_eq!(
        store.config_file_path(),
        dir.path().join("sync_drive_config.json")
    );
}

#[test]
fn load_missing_file_reports_config_missing() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonConfigStore::new(dir.path());

    let error = store.load().unwrap_err();
    assert_eq!(error.kind, CoreErrorKind::ConfigMissing);
    assert!(error.message.contains(CONFIG_FILE_NAME));
    assert!(!store.config_file_path().exists());
}

#[test]
fn load_zero_byte_file_yields_default_document() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_config(&dir, "");

    let config = store.load().unwrap();
    assert_eq!(config, SyncDriveConfig::default());
}

#[test]
fn load_malformed_file_reports_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_config(&dir, "{\"configVer\": \"1.0\", \"syncTaskList\": [");

    let error = store.load().unwrap_err();
    assert_eq!(error.kind, CoreErrorKind::ConfigParse);
}

#[test]
fn load_whitespace_only_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_config(&dir, "  \n");

    let error = store.load().unwrap_err();
    assert_eq!(error.kind, CoreErrorKind::ConfigParse);
}

#[test]
fn load_reads_tasks_in_document_order() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_config(&dir, SAMPLE_CONFIG);

    let config = store.load().unwrap();
    let names = config
        .sync_task_list
        .iter()
        .map(|task| task.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["game backup", "photos"]);

    let game = &config.sync_task_list[0];
    assert_eq!(game.local_folder_path, "D:\\smb\\datadisk\\game");
    assert_eq!(game.last_sync_time, "");
    assert!(game.extra.contains_key("excludeNames"));
    assert_eq!(config.sync_task_list[1].mode, "upload");
}

#[test]
fn save_of_loaded_document_reproduces_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_config(&dir, SAMPLE_CONFIG);

    let config = store.load().unwrap();
    store.save(&config).unwrap();

    let saved = fs::read_to_string(store.config_file_path()).unwrap();
    assert_eq!(saved, SAMPLE_CONFIG);
}

#[test]
fn save_keeps_key_order_and_does_not_add_absent_keys() {
    let dir = tempfile::tempdir().unwrap();
    let source = r#"{"extraTop":1,"syncTaskList":[{"color":"red","name":"a","id":"x"}],"configVer":"1.0"}"#;
    let store = write_config(&dir, source);

    let config = store.load().unwrap();
    store.save(&config).unwrap();

    let saved: Value =
        serde_json::from_str(&fs::read_to_string(store.config_file_path()).unwrap()).unwrap();
    let top_keys = saved.as_object().unwrap().keys().cloned().collect::<Vec<_>>();
    assert_eq!(top_keys, vec!["extraTop", "syncTaskList", "configVer"]);

    let task = saved["syncTaskList"][0].as_object().unwrap();
    let task_keys = task.keys().cloned().collect::<Vec<_>>();
    assert_eq!(task_keys, vec!["color", "name", "id"]);
    assert_eq!(task["color"], "red");
}

#[test]
fn load_reads_null_strings_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_config(
        &dir,
        r#"{"configVer":"1.0","syncTaskList":[{"name":"a","id":null,"lastSyncTime":null}]}"#,
    );

    let config = store.load().unwrap();
    let task = &config.sync_task_list[0];
    assert_eq!(task.name, "a");
    assert!(!task.has_id());
    assert_eq!(task.last_sync_time, "");
}

#[test]
fn load_rejects_non_string_task_field() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_config(&dir, r#"{"configVer":"1.0","syncTaskList":[{"id":7}]}"#);

    let error = store.load().unwrap_err();
    assert_eq!(error.kind, CoreErrorKind::ConfigParse);
    assert!(error.message.contains("'id'"));
}

#[test]
fn save_fully_replaces_previous_content() {
    let dir = tempfile::tempdir().unwrap();
    let store = write_config(&dir, SAMPLE_CONFIG);

    store.save(&SyncDriveConfig::default()).unwrap();

    let saved = fs::read_to_string(store.config_file_path()).unwrap();
    assert_eq!(saved, "{\n \"configVer\": \"1.0\",\n \"syncTaskList\": []\n}");
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn save_does_not_create_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-there");
    let store = JsonConfigStore::new(&missing);

    let config = SyncDriveConfig {
        sync_task_list: vec![SyncTask {
            name: "docs".to_string(),
            ..SyncTask::default()
        }],
        ..SyncDriveConfig::default()
    };
    let error = store.save(&config).unwrap_err();

    assert_eq!(error.kind, CoreErrorKind::PersistFailed);
    assert!(!missing.exists());
}

#[cfg(unix)]
#[test]
fn save_creates_file_with_owner_execute_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let store = JsonConfigStore::new(dir.path());
    store.save(&SyncDriveConfig::default()).unwrap();

    let mode = fs::metadata(store.config_file_path())
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o700, 0o700);
}
