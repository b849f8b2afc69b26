//! Extension entry point for an embedding composer.
//!
//! Owns the registry and the transform backend for the process. Bootstraps
//! once before the UI loop starts, then builds one [`ActionSet`] per
//! composer window on demand.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::info;

use crate::actions::{ActionSet, OrchestrationContext};
use crate::config::ConfigPaths;
use crate::host::ComposerHost;
use crate::llm::TransformBackend;
use crate::registry::Registry;

pub struct ComposerExtension {
    registry: Rc<RefCell<Registry>>,
    backend: Arc<dyn TransformBackend>,
}

impl ComposerExtension {
    /// Load configuration and discover the model list, then hand back the
    /// ready extension.
    ///
    /// Discovery talks to the network synchronously; call this before
    /// entering the UI loop, not from it.
    pub fn bootstrap(paths: ConfigPaths, backend: Arc<dyn TransformBackend>) -> Self {
        let mut registry = Registry::load(paths);
        registry.discover_models(backend.as_ref());
        info!(
            prompts = registry.prompts().len(),
            models = registry.models().len(),
            remote_ready = registry.api_key().is_some(),
            "Composer extension ready"
        );
        Self {
            registry: Rc::new(RefCell::new(registry)),
            backend,
        }
    }

    /// Whether transforms can reach the remote service.
    pub fn remote_ready(&self) -> bool {
        self.registry.borrow().api_key().is_some()
    }

    pub fn registry(&self) -> Rc<RefCell<Registry>> {
        Rc::clone(&self.registry)
    }

    /// Build the action surface for one composer window.
    pub fn build_actions(&self, host: Rc<dyn ComposerHost>) -> ActionSet {
        ActionSet::build(OrchestrationContext {
            registry: Rc::clone(&self.registry),
            backend: Arc::clone(&self.backend),
            host,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{AlertKind, ContentKind, HostError};
    use crate::llm::{ClientError, ModelDescriptor};
    use crate::orchestrator::OrchestrationRequest;
    use async_trait::async_trait;
    use std::fs;
    use tempfile::TempDir;

    struct NullHost;

    #[async_trait(?Send)]
    impl ComposerHost for NullHost {
        async fn content(&self, _kind: ContentKind) -> Result<String, HostError> {
            Ok(String::new())
        }

        fn insert_content(&self, _text: &str, _kind: ContentKind) {}

        fn submit_alert(&self, _kind: AlertKind, _message: &str) {}

        fn show_wait_indicator(&self, _model: &str) {}

        fn dismiss_wait_indicator(&self) {}

        fn is_alive(&self) -> bool {
            true
        }
    }

    struct StaticBackend {
        models: Vec<ModelDescriptor>,
    }

    impl TransformBackend for StaticBackend {
        fn transform(&self, _request: &OrchestrationRequest) -> Result<Option<String>, ClientError> {
            Ok(None)
        }

        fn list_models(&self, _api_key: &str) -> Result<Vec<ModelDescriptor>, ClientError> {
            Ok(self.models.clone())
        }
    }

    #[test]
    fn bootstrap_with_nothing_configured_is_inert() {
        let dir = TempDir::new().unwrap();
        let backend = Arc::new(StaticBackend {
            models: vec![ModelDescriptor {
                id: "gpt-4o".to_string(),
            }],
        });

        let extension = ComposerExtension::bootstrap(ConfigPaths::under(dir.path()), backend);

        assert!(!extension.remote_ready());
        assert!(extension.registry().borrow().models().is_empty());
        let set = extension.build_actions(Rc::new(NullHost));
        assert_eq!(set.actions().len(), 2);
    }

    #[test]
    fn bootstrap_discovers_models_when_configured() {
        let dir = TempDir::new().unwrap();
        let paths = ConfigPaths::under(dir.path());
        fs::write(
            &paths.prompts,
            r#"[{"id": "formal", "name": "Make formal", "text": "Rewrite formally."}]"#,
        )
        .unwrap();
        fs::write(
            &paths.authinfo,
            "machine api.openai.com login apikey password sk-test\n",
        )
        .unwrap();
        let backend = Arc::new(StaticBackend {
            models: vec![
                ModelDescriptor {
                    id: "gpt-4o".to_string(),
                },
                ModelDescriptor {
                    id: "gpt-4o-mini".to_string(),
                },
            ],
        });

        let extension = ComposerExtension::bootstrap(paths, backend);

        assert!(extension.remote_ready());
        assert_eq!(extension.registry().borrow().models().len(), 2);
        let set = extension.build_actions(Rc::new(NullHost));
        assert_eq!(set.actions().len(), 5);
    }
}
