//! Prompt definitions loaded from the user's prompt file.
//!
//! The file is a JSON array of `{"id", "text", "name"?}` objects. Loading
//! never fails the caller: a missing or unparseable file yields an empty
//! set, and malformed entries are skipped one by one. An empty set leaves
//! the transform actions disabled.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

/// A named instruction sent to the model together with the user's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Unique, non-empty identifier.
    pub id: String,
    /// Human-readable menu label. Falls back to the id.
    pub display_name: String,
    /// Instruction text sent to the model.
    pub prompt_text: String,
}

#[derive(Deserialize)]
struct PromptEntry {
    id: Option<String>,
    text: Option<String>,
    name: Option<String>,
}

/// Load prompt definitions from `path`.
///
/// Entries without a non-empty `id` and `text`, entries reusing an id, and
/// entries that are not objects are skipped with a warning. Order is
/// preserved for the survivors.
pub fn load_prompts(path: &Path) -> Vec<Prompt> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "No prompt file, starting with an empty set");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read prompt file");
            return Vec::new();
        }
    };

    let entries = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(entries)) => entries,
        Ok(_) => {
            warn!(path = %path.display(), "Prompt file root is not an array");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Prompt file is not valid JSON");
            return Vec::new();
        }
    };

    let mut seen: HashSet<String> = HashSet::new();
    let mut prompts = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        let entry: PromptEntry = match serde_json::from_value(entry) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %path.display(), index, error = %e, "Skipping malformed prompt entry");
                continue;
            }
        };
        let Some(id) = entry.id.filter(|id| !id.is_empty()) else {
            warn!(path = %path.display(), index, "Skipping prompt entry without an id");
            continue;
        };
        let Some(text) = entry.text.filter(|text| !text.is_empty()) else {
            warn!(path = %path.display(), index, id = %id, "Skipping prompt entry without text");
            continue;
        };
        if !seen.insert(id.clone()) {
            warn!(path = %path.display(), index, id = %id, "Skipping prompt entry with duplicate id");
            continue;
        }
        let display_name = entry
            .name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| id.clone());
        prompts.push(Prompt {
            id,
            display_name,
            prompt_text: text,
        });
    }

    debug!(path = %path.display(), count = prompts.len(), "Loaded prompts");
    prompts
}
