use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::{ActionKind, InventoryAction};
use crate::directory::SubclassOracle;

/// An action as recorded in the catalogue, tagged with the module that registered it.
#[derive(Debug, Clone)]
pub struct RegisteredAction {
    pub module_id: String,
    pub action: Arc<InventoryAction>,
}

impl RegisteredAction {
    pub fn kind(&self) -> ActionKind {
        self.action.kind
    }

    pub fn applies_to(&self) -> Option<&str> {
        self.action.applies_to.as_deref()
    }
}

/// Flattened view of a [`RegisteredAction`] for responses.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ActionSummary {
    pub module_id: String,
    pub id: String,
    pub label: String,
    pub applies_to: Option<String>,
    pub kind: ActionKind,
}

impl From<&RegisteredAction> for ActionSummary {
    fn from(registered: &RegisteredAction) -> Self {
        Self {
            module_id: registered.module_id.clone(),
            id: registered.action.id.clone(),
            label: registered.action.label.clone(),
            applies_to: registered.action.applies_to.clone(),
            kind: registered.action.kind,
        }
    }
}

/// Collects registrations during startup. Consumed by [`ActionRegistryBuilder::freeze`].
#[derive(Debug, Default)]
pub struct ActionRegistryBuilder {
    registry: ActionRegistry,
}

impl ActionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the catalogue.
    ///
    /// Registrations are not deduplicated: the same action registered twice is
    /// listed twice. Menu renderers decide what to do with repeated ids.
    pub fn register(&mut self, module_id: &str, action: Arc<InventoryAction>) -> &mut Self {
        let registered = RegisteredAction {
            module_id: module_id.to_string(),
            action,
        };
        let bucket = registered.applies_to().unwrap_or_default().to_string();

        self.registry.all.push(registered.clone());
        self.registry
            .by_module
            .entry(registered.module_id.clone())
            .or_default()
            .push(registered.clone());
        self.registry.by_kind[registered.kind().index()]
            .entry(bucket)
            .or_default()
            .push(registered);
        self
    }

    /// Register every action of a module in order.
    pub fn register_all<I>(&mut self, module_id: &str, actions: I) -> &mut Self
    where
        I: IntoIterator<Item = InventoryAction>,
    {
        for action in actions {
            self.register(module_id, Arc::new(action));
        }
        self
    }

    /// Finish startup registration. The returned catalogue is read-only.
    pub fn freeze(self) -> Arc<ActionRegistry> {
        tracing::info!(
            "Action registry frozen with {} action(s) from {} module(s)",
            self.registry.all.len(),
            self.registry.by_module.len()
        );
        Arc::new(self.registry)
    }
}

/// Read-only catalogue of pluggable actions, queried by object class.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    /// Registration order is menu order.
    all: Vec<RegisteredAction>,
    /// Per kind: applicable class (`""` for any class) to actions.
    by_kind: [HashMap<String, Vec<RegisteredAction>>; 3],
    by_module: HashMap<String, Vec<RegisteredAction>>,
}

impl ActionRegistry {
    pub fn all_actions(&self) -> &[RegisteredAction] {
        &self.all
    }

    /// Actions of `kind` registered for exactly `class_name`. Pass `""` for
    /// actions that apply to any class.
    pub fn get_actions_applicable_to(&self, kind: ActionKind, class_name: &str) -> &[RegisteredAction] {
        self.by_kind[kind.index()]
            .get(class_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Actions of `kind` registered for `class_name` or any of its superclasses.
    ///
    /// Actions without an applicable class never match here. A failed subclass
    /// check drops only the action being checked.
    pub fn get_actions_applicable_to_recursive<O: SubclassOracle>(
        &self,
        kind: ActionKind,
        class_name: &str,
        oracle: &O,
    ) -> Vec<RegisteredAction> {
        self.all
            .iter()
            .filter(|registered| registered.kind() == kind)
            .filter(|registered| {
                let Some(applies_to) = registered.applies_to() else {
                    return false;
                };
                match oracle.is_subclass_of(class_name, applies_to) {
                    Ok(matches) => matches,
                    Err(e) => {
                        tracing::debug!(
                            "Skipping action {} for {}: {}",
                            registered.action.id,
                            class_name,
                            e
                        );
                        false
                    }
                }
            })
            .cloned()
            .collect()
    }

    pub fn get_actions_for_module(&self, module_id: &str) -> &[RegisteredAction] {
        self.by_module
            .get(module_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Ids of modules that registered at least one action, sorted.
    pub fn modules(&self) -> Vec<&str> {
        let mut modules: Vec<&str> = self.by_module.keys().map(String::as_str).collect();
        modules.sort_unstable();
        modules
    }
}
