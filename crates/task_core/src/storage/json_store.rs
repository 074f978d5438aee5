use crate::error::AppError;
use crate::model::Task;
use serde_json::error::Category;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const STORE_FILE_NAME: &str = "tasks.json";
pub const STORE_ENV_VAR: &str = "TASKTRACK_STORE_PATH";

/// Resolves the store file: explicit path, then `TASKTRACK_STORE_PATH`, then
/// the configured path, then `tasks.json` in the working directory.
pub fn store_path(explicit: Option<&Path>, configured: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }

    configured
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(STORE_FILE_NAME))
}

/// Loads the full collection.
///
/// A missing file is an empty collection. Content that is not JSON at all, or
/// JSON that is not an array, is reset to `[]` on disk and read as empty. A
/// well-formed array whose records cannot be decoded is left untouched and
/// reported as `InvalidData`.
pub fn load_tasks(path: &Path) -> Result<Vec<Task>, AppError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "store missing, starting empty");
            return Ok(Vec::new());
        }
        Err(err) => return Err(AppError::io(format!("{}: {}", path.display(), err))),
    };

    let value = match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(value) => value,
        Err(err) if matches!(err.classify(), Category::Syntax | Category::Eof) => {
            return reset_corrupt(path, &err.to_string());
        }
        Err(err) => return Err(AppError::io(format!("{}: {}", path.display(), err))),
    };
    if !value.is_array() {
        return reset_corrupt(path, "top-level value is not an array");
    }

    let tasks = serde_json::from_value::<Vec<Task>>(value)
        .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err)))?;
    debug!(path = %path.display(), count = tasks.len(), "loaded tasks");
    Ok(tasks)
}

fn reset_corrupt(path: &Path, reason: &str) -> Result<Vec<Task>, AppError> {
    warn!(
        path = %path.display(),
        error = reason,
        "store contains invalid JSON, creating new tasks list"
    );
    save_tasks(path, &[])?;
    Ok(Vec::new())
}

/// Replaces the store with `tasks`.
///
/// Content is written to a sibling temp file and renamed into place, so the
/// target holds either the previous or the new collection.
pub fn save_tasks(path: &Path, tasks: &[Task]) -> Result<(), AppError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)
        .map_err(|err| AppError::io(format!("{}: {}", parent.display(), err)))?;

    let content =
        serde_json::to_string_pretty(tasks).map_err(|err| AppError::invalid_data(err.to_string()))?;

    let mut staged = tempfile::NamedTempFile::new_in(parent)
        .map_err(|err| AppError::io(format!("{}: {}", parent.display(), err)))?;
    staged
        .write_all(content.as_bytes())
        .and_then(|_| staged.as_file().sync_all())
        .map_err(|err| AppError::io(err.to_string()))?;
    staged
        .persist(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err.error)))?;

    debug!(path = %path.display(), count = tasks.len(), "saved tasks");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{load_tasks, save_tasks, store_path};
    use crate::model::{Priority, Task};
    use std::fs;

    fn task(id: u64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: "desc".to_string(),
            priority: Some(Priority::Medium),
            category: "Work".to_string(),
            due_date: "2025-01-10".to_string(),
            completed: false,
            created_at: "2025-01-01 09:00:00".to_string(),
        }
    }

    #[test]
    fn explicit_store_path_wins() {
        let explicit = std::path::Path::new("/tmp/explicit.json");
        let configured = std::path::Path::new("/tmp/configured.json");
        assert_eq!(store_path(Some(explicit), Some(configured)), explicit);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let mut done = task(2, "second");
        done.completed = true;
        done.priority = None;
        let tasks = vec![task(1, "first"), done];

        save_tasks(&path, &tasks).unwrap();
        let loaded = load_tasks(&path).unwrap();

        assert_eq!(loaded, tasks);
    }

    #[test]
    fn missing_file_loads_empty_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let loaded = load_tasks(&path).unwrap();

        assert!(loaded.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_file_is_reset_to_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "###").unwrap();

        let loaded = load_tasks(&path).unwrap();
        let on_disk: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert!(loaded.is_empty());
        assert_eq!(on_disk, serde_json::json!([]));
    }

    #[test]
    fn wrong_shape_counts_as_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"{"tasks": []}"#).unwrap();

        let loaded = load_tasks(&path).unwrap();

        assert!(loaded.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");
    }

    #[test]
    fn sparse_records_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(
            &path,
            r#"[{"id": 4, "title": "bare", "created_at": "2025-01-01 00:00:00"}]"#,
        )
        .unwrap();

        let loaded = load_tasks(&path).unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, 4);
        assert_eq!(loaded[0].priority, None);
        assert_eq!(loaded[0].due_date, "");
        assert!(!loaded[0].completed);
    }

    #[test]
    fn records_without_title_or_timestamp_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let raw = r#"[{"id":1,"title":"x"},{"id":2}]"#;
        fs::write(&path, raw).unwrap();

        let loaded = load_tasks(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].title, "x");
        assert_eq!(loaded[0].created_at, "");
        assert_eq!(loaded[1].title, "");
        assert_eq!(fs::read_to_string(&path).unwrap(), raw);
    }

    #[test]
    fn priority_spelling_is_lenient() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(
            &path,
            r#"[{"id":1,"title":"a","priority":"high"},
                {"id":2,"title":"b","priority":"Urgent"},
                {"id":3,"title":"c","priority":null}]"#,
        )
        .unwrap();

        let loaded = load_tasks(&path).unwrap();

        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded[0].priority, Some(Priority::High));
        assert_eq!(loaded[1].priority, None);
        assert_eq!(loaded[2].priority, None);
    }

    #[test]
    fn undecodable_record_is_reported_and_file_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let raw = r#"[{"id":1,"title":"keep"},{"id":"two","title":"bad"}]"#;
        fs::write(&path, raw).unwrap();

        let err = load_tasks(&path).unwrap_err();

        assert_eq!(err.code(), "invalid_data");
        assert_eq!(fs::read_to_string(&path).unwrap(), raw);
    }

    #[test]
    fn save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.json");

        save_tasks(&path, &[task(1, "a"), task(2, "b")]).unwrap();
        save_tasks(&path, &[task(3, "c")]).unwrap();
        let loaded = load_tasks(&path).unwrap();

        assert_eq!(loaded, vec![task(3, "c")]);
    }

    #[test]
    fn records_use_plain_string_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");

        save_tasks(&path, &[task(1, "a")]).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(raw[0]["priority"], "Medium");
        assert_eq!(raw[0]["due_date"], "2025-01-10");
        assert_eq!(raw[0]["created_at"], "2025-01-01 09:00:00");
        assert_eq!(raw[0].as_object().unwrap().len(), 8);
    }
}
