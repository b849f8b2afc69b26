//! Composer action surface.
//!
//! Builds the flat list of UI actions one composer window exposes: one per
//! configured prompt, one per discovered model, plus the menu container and
//! the dropdown trigger. Activation routes on the [`ActionKind`] tag stored
//! at build time; ids are opaque handles for the host toolkit and are never
//! parsed back.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::host::ComposerHost;
use crate::llm::TransformBackend;
use crate::orchestrator::Invocation;
use crate::registry::Registry;

/// Icon name for the transform entry points.
pub const TRANSFORM_ICON: &str = "tools-check-spelling";

/// Prefix marking the currently selected model in its label.
pub const SELECTED_MARKER: &str = "\u{2713} ";

// ============================================================================
// Action model
// ============================================================================

/// What an action does when activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    /// Run a transform with this prompt.
    Prompt { prompt_id: String },
    /// Select this model for future transforms.
    Model { model_id: String },
    /// Structural UI element with no behavior of its own.
    Structural(StructuralRole),
}

/// The two structural elements of the action surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralRole {
    /// Menu container holding the prompt and model entries.
    Menu,
    /// Toolbar dropdown that lists the prompt actions.
    Trigger,
}

/// One entry of the composer action surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub id: String,
    pub label: String,
    pub tooltip: String,
    pub icon: Option<String>,
    pub kind: ActionKind,
}

/// What an activation resolved to.
pub enum Activation {
    /// A ready-to-run transform invocation. Run it on the UI context.
    Transform(Invocation),
    /// The model selection changed and was persisted.
    ModelSelected,
    /// The dropdown trigger: present these prompt actions to pick from.
    PromptPicker(Vec<Action>),
    /// The menu container itself; nothing to do.
    MenuContainer,
}

// ============================================================================
// Context and action set
// ============================================================================

/// Shared state the action surface closes over.
///
/// Passed explicitly to every [`ActionSet`]; actions never reach for
/// globals. The registry is shared with the embedding extension, the host
/// belongs to one composer window.
#[derive(Clone)]
pub struct OrchestrationContext {
    pub registry: Rc<RefCell<Registry>>,
    pub backend: Arc<dyn TransformBackend>,
    pub host: Rc<dyn ComposerHost>,
}

/// The action surface of one composer window.
///
/// Built once per window from the registry state at that moment; rebuild
/// after a model selection change to move the marker.
pub struct ActionSet {
    context: OrchestrationContext,
    actions: Vec<Action>,
}

impl ActionSet {
    /// Build the full surface: prompts, then models, then the two
    /// structural entries.
    pub fn build(context: OrchestrationContext) -> Self {
        let mut actions = Vec::new();
        {
            let registry = context.registry.borrow();

            for prompt in registry.prompts() {
                actions.push(Action {
                    id: format!("redraft-prompt-{}", prompt.id),
                    label: prompt.display_name.clone(),
                    tooltip: format!("Rewrite the message text: {}", prompt.display_name),
                    icon: Some(TRANSFORM_ICON.to_string()),
                    kind: ActionKind::Prompt {
                        prompt_id: prompt.id.clone(),
                    },
                });
            }

            for model in registry.models() {
                let label = if model.id == registry.selected_model() {
                    format!("{}{}", SELECTED_MARKER, model.id)
                } else {
                    model.id.clone()
                };
                // A blank descriptor id gives nothing to derive from; leave
                // the fields empty so the backfill pass mints placeholders.
                let (id, tooltip) = if model.id.is_empty() {
                    (String::new(), String::new())
                } else {
                    (
                        format!("redraft-model-{}", model.id),
                        format!("Use {} for rewriting", model.id),
                    )
                };
                actions.push(Action {
                    id,
                    label,
                    tooltip,
                    icon: None,
                    kind: ActionKind::Model {
                        model_id: model.id.clone(),
                    },
                });
            }
        }

        actions.push(Action {
            id: "redraft-menu".to_string(),
            label: "AI Rewrite".to_string(),
            tooltip: "AI rewriting actions".to_string(),
            icon: None,
            kind: ActionKind::Structural(StructuralRole::Menu),
        });
        actions.push(Action {
            id: "redraft-dropdown".to_string(),
            label: "Rewrite".to_string(),
            tooltip: "Rewrite the message text with an AI prompt".to_string(),
            icon: Some(TRANSFORM_ICON.to_string()),
            kind: ActionKind::Structural(StructuralRole::Trigger),
        });

        backfill_missing_fields(&mut actions);
        debug!(count = actions.len(), "Composer action surface built");

        Self { context, actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The prompt entries only, in configuration order.
    pub fn prompt_actions(&self) -> Vec<Action> {
        self.actions
            .iter()
            .filter(|action| matches!(action.kind, ActionKind::Prompt { .. }))
            .cloned()
            .collect()
    }

    /// Resolve an activation coming in from the host toolkit.
    ///
    /// Routing uses only the kind tag stored at build time. Unknown ids are
    /// logged and ignored.
    pub fn activate(&self, action_id: &str) -> Option<Activation> {
        let Some(action) = self.actions.iter().find(|action| action.id == action_id) else {
            warn!(action_id, "Activation for unknown action id, ignoring");
            return None;
        };

        match &action.kind {
            ActionKind::Prompt { prompt_id } => {
                let registry = self.context.registry.borrow();
                let invocation = Invocation::new(
                    prompt_id.clone(),
                    registry.selected_model(),
                    registry.api_key().map(str::to_string),
                    registry.prompt_snapshot(),
                    Arc::clone(&self.context.backend),
                    Rc::clone(&self.context.host),
                );
                Some(Activation::Transform(invocation))
            }
            ActionKind::Model { model_id } => {
                self.context.registry.borrow_mut().set_selected_model(model_id);
                Some(Activation::ModelSelected)
            }
            ActionKind::Structural(StructuralRole::Trigger) => {
                Some(Activation::PromptPicker(self.prompt_actions()))
            }
            ActionKind::Structural(StructuralRole::Menu) => Some(Activation::MenuContainer),
        }
    }
}

/// Replace empty ids, labels, and tooltips so the host toolkit never sees a
/// blank field. Each replacement is logged.
fn backfill_missing_fields(actions: &mut [Action]) {
    for (index, action) in actions.iter_mut().enumerate() {
        if action.id.is_empty() {
            action.id = format!("redraft-action-{index}");
            warn!(index, kind = ?action.kind, "Action without an id, generated one");
        }
        if action.label.is_empty() {
            action.label = "(no label)".to_string();
            warn!(id = %action.id, "Action without a label, using a placeholder");
        }
        if action.tooltip.is_empty() {
            action.tooltip = action.label.clone();
            warn!(id = %action.id, "Action without a tooltip, reusing the label");
        }
    }
}
