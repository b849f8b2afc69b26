//! Configuration loading: prompts, credentials, selection state.
//!
//! All loading is fail-soft. A half-configured or unconfigured setup
//! disables the matching features instead of failing composer startup.

mod prompts;
mod secrets;
mod settings;

pub use prompts::{Prompt, load_prompts};
pub use secrets::{CREDENTIALS_HOST, load_api_key};
pub use settings::{DEFAULT_MODEL, SettingsError, load_selected_model, save_selected_model};

use std::path::PathBuf;

/// Well-known file locations for one user.
///
/// Injected everywhere instead of resolved ad hoc, so tests can point the
/// whole stack at a temp directory.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// JSON array of prompt definitions.
    pub prompts: PathBuf,
    /// Flat JSON settings object, shared with other composer tooling.
    pub settings: PathBuf,
    /// netrc-style secrets file holding the provider api key.
    pub authinfo: PathBuf,
}

impl ConfigPaths {
    /// Per-user defaults: `$XDG_CONFIG_HOME/redraft/` for prompts and
    /// settings, `~/.authinfo` for credentials.
    pub fn per_user() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("redraft");
        let authinfo = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".authinfo");
        Self {
            prompts: config_dir.join("prompts.json"),
            settings: config_dir.join("settings.json"),
            authinfo,
        }
    }

    /// All three files inside one directory, for tests and demos.
    pub fn under(dir: &std::path::Path) -> Self {
        Self {
            prompts: dir.join("prompts.json"),
            settings: dir.join("settings.json"),
            authinfo: dir.join("authinfo"),
        }
    }
}
