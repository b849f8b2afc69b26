//! In-memory registry of prompts, models, credentials, and selection.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{
    ConfigPaths, Prompt, load_api_key, load_prompts, load_selected_model, save_selected_model,
};
use crate::llm::{ModelDescriptor, TransformBackend};

/// Everything the extension knows about prompts, models, and credentials.
///
/// Lives on the UI context for the whole extension lifetime. Workers never
/// see it; they get an immutable prompt snapshot plus copied strings.
pub struct Registry {
    paths: ConfigPaths,
    prompts: Arc<[Prompt]>,
    models: Vec<ModelDescriptor>,
    api_key: Option<String>,
    selected_model: String,
}

impl Registry {
    /// Load prompts, credentials, and the persisted selection.
    ///
    /// Never fails: a missing piece leaves the matching feature disabled.
    pub fn load(paths: ConfigPaths) -> Self {
        let prompts: Arc<[Prompt]> = load_prompts(&paths.prompts).into();
        let api_key = load_api_key(&paths.authinfo);
        let selected_model = load_selected_model(&paths.settings);

        if prompts.is_empty() {
            info!("No prompts configured, transform actions stay disabled");
        }
        if api_key.is_none() {
            info!("No api key found, remote features stay disabled");
        }

        Self {
            paths,
            prompts,
            models: Vec::new(),
            api_key,
            selected_model,
        }
    }

    /// One-shot model discovery through `backend`.
    ///
    /// Blocking; run it before the UI context starts. Failures of any kind
    /// keep the model list empty so the composer still opens.
    pub fn discover_models(&mut self, backend: &dyn TransformBackend) {
        let Some(api_key) = self.api_key.clone() else {
            debug!("Skipping model discovery without an api key");
            return;
        };
        match backend.list_models(&api_key) {
            Ok(models) => {
                debug!(count = models.len(), "Discovered models");
                self.models = models;
            }
            Err(e) => {
                warn!(error = %e, "Model discovery failed, keeping an empty model list");
            }
        }
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    /// Shared prompt snapshot for a worker-bound request.
    pub fn prompt_snapshot(&self) -> Arc<[Prompt]> {
        Arc::clone(&self.prompts)
    }

    pub fn find_prompt(&self, id: &str) -> Option<&Prompt> {
        self.prompts.iter().find(|prompt| prompt.id == id)
    }

    pub fn models(&self) -> &[ModelDescriptor] {
        &self.models
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn selected_model(&self) -> &str {
        &self.selected_model
    }

    /// Switch the selected model and persist the choice immediately.
    ///
    /// The in-memory selection changes even when the write fails; it then
    /// simply lasts until the composer closes.
    pub fn set_selected_model(&mut self, model: &str) {
        self.selected_model = model.to_string();
        if let Err(e) = save_selected_model(&self.paths.settings, model) {
            warn!(error = %e, model = %model, "Failed to persist model selection");
        }
    }
}
