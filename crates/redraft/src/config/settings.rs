//! Model selection persisted in the shared settings file.
//!
//! The settings file is a flat JSON object shared with other composer
//! tooling; only the `model` key belongs to this crate. Saving therefore
//! merges into whatever is stored instead of rewriting the file from a
//! typed struct, so unrelated keys survive round trips.

use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Model used until the user picks another one.
pub const DEFAULT_MODEL: &str = "gpt-4o";

const MODEL_KEY: &str = "model";

/// Errors that can occur while persisting the model selection.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read or written
    #[error("settings io error: {0}")]
    Io(#[from] io::Error),

    /// Merged settings could not be re-encoded
    #[error("settings serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Read the persisted model selection, falling back to [`DEFAULT_MODEL`].
///
/// A missing file is the normal first-run state; read and parse problems
/// degrade to the default as well.
pub fn load_selected_model(path: &Path) -> String {
    let Some(settings) = read_settings(path) else {
        return DEFAULT_MODEL.to_string();
    };
    settings
        .get(MODEL_KEY)
        .and_then(Value::as_str)
        .filter(|model| !model.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Persist the model selection, keeping every other settings key intact.
///
/// Read-merge-write on the whole file. The file has a single writer in
/// normal operation (the UI context), so no cross-process locking is
/// attempted.
pub fn save_selected_model(path: &Path, model: &str) -> Result<(), SettingsError> {
    let mut settings = read_settings(path).unwrap_or_default();
    settings.insert(MODEL_KEY.to_string(), Value::String(model.to_string()));

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = serde_json::to_string_pretty(&Value::Object(settings))?;
    std::fs::write(path, encoded)?;
    debug!(path = %path.display(), model = %model, "Saved model selection");
    Ok(())
}

fn read_settings(path: &Path) -> Option<Map<String, Value>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %e, "Failed to read settings file");
            }
            return None;
        }
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            warn!(path = %path.display(), "Settings file root is not an object, discarding");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Settings file is not valid JSON, discarding");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let model = load_selected_model(&tmp.path().join("settings.json"));
        assert_eq!(model, DEFAULT_MODEL);
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");

        save_selected_model(&path, "gpt-4o-mini").unwrap();

        assert_eq!(load_selected_model(&path), "gpt-4o-mini");
    }

    #[test]
    fn save_preserves_unrelated_keys() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{"model": "gpt-4o", "signature": "Cheers,\nBob", "spellcheck": true}"#,
        )
        .unwrap();

        save_selected_model(&path, "gpt-4o-mini").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["model"], "gpt-4o-mini");
        assert_eq!(parsed["signature"], "Cheers,\nBob");
        assert_eq!(parsed["spellcheck"], true);
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("dir").join("settings.json");

        save_selected_model(&path, "gpt-4o").unwrap();

        assert_eq!(load_selected_model(&path), "gpt-4o");
    }

    #[test]
    fn corrupt_file_degrades_to_default_and_recovers_on_save() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, "{broken").unwrap();

        assert_eq!(load_selected_model(&path), DEFAULT_MODEL);

        save_selected_model(&path, "gpt-4o-mini").unwrap();
        assert_eq!(load_selected_model(&path), "gpt-4o-mini");
    }

    #[test]
    fn non_string_model_value_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.json");
        std::fs::write(&path, r#"{"model": 17}"#).unwrap();

        assert_eq!(load_selected_model(&path), DEFAULT_MODEL);
    }
}
