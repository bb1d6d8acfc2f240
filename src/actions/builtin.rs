//! Actions shipped with the application, registered before any add-on module.

use super::{ActionKind, ActionRegistryBuilder, InventoryAction};

pub const NAVIGATION_MODULE: &str = "navigation";
pub const PROJECTS_MODULE: &str = "projects";
pub const CONTRACTS_MODULE: &str = "contracts";
pub const PHYSICAL_CONNECTIONS_MODULE: &str = "physical-connections";

fn navigation_actions() -> Vec<InventoryAction> {
    vec![
        InventoryAction::new("create-business-object", "New object", ActionKind::Misc),
        InventoryAction::new("copy-business-object", "Copy to...", ActionKind::Misc),
        InventoryAction::new("move-business-object", "Move to...", ActionKind::Misc),
        InventoryAction::new("show-more-information", "More information", ActionKind::Misc),
        InventoryAction::new(
            "manage-special-relationships",
            "Manage special relationships",
            ActionKind::RelationshipManagement,
        ),
        InventoryAction::new("delete-business-object", "Delete", ActionKind::Delete),
    ]
}

fn projects_actions() -> Vec<InventoryAction> {
    vec![
        InventoryAction::new(
            "relate-to-project",
            "Relate to project",
            ActionKind::RelationshipManagement,
        )
        .applies_to("InventoryObject"),
        InventoryAction::new("delete-project", "Delete project", ActionKind::Delete)
            .applies_to("GenericProject"),
    ]
}

fn contracts_actions() -> Vec<InventoryAction> {
    vec![InventoryAction::new(
        "relate-to-contract",
        "Relate to contract",
        ActionKind::RelationshipManagement,
    )
    .applies_to("GenericCommunicationsElement")]
}

fn physical_connections_actions() -> Vec<InventoryAction> {
    vec![
        InventoryAction::new("manage-ports", "Manage ports", ActionKind::Misc)
            .applies_to("GenericNetworkElement"),
        InventoryAction::new("edit-connection-endpoints", "Edit endpoints", ActionKind::Misc)
            .applies_to("GenericPhysicalConnection"),
        InventoryAction::new("delete-physical-connection", "Delete connection", ActionKind::Delete)
            .applies_to("GenericPhysicalConnection"),
    ]
}

/// Register the catalogue of every built-in module.
pub fn register_core_actions(builder: &mut ActionRegistryBuilder) {
    builder
        .register_all(NAVIGATION_MODULE, navigation_actions())
        .register_all(PROJECTS_MODULE, projects_actions())
        .register_all(CONTRACTS_MODULE, contracts_actions())
        .register_all(PHYSICAL_CONNECTIONS_MODULE, physical_connections_actions());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_modules_are_registered() {
        let mut builder = ActionRegistryBuilder::new();
        register_core_actions(&mut builder);
        let registry = builder.freeze();

        assert_eq!(
            registry.modules(),
            vec![
                CONTRACTS_MODULE,
                NAVIGATION_MODULE,
                PHYSICAL_CONNECTIONS_MODULE,
                PROJECTS_MODULE
            ]
        );
        assert_eq!(registry.get_actions_for_module(NAVIGATION_MODULE).len(), 6);
    }

    #[test]
    fn test_generic_delete_applies_to_any_class() {
        let mut builder = ActionRegistryBuilder::new();
        register_core_actions(&mut builder);
        let registry = builder.freeze();

        let deletes = registry.get_actions_applicable_to(ActionKind::Delete, "");
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].action.id, "delete-business-object");
        assert_eq!(deletes[0].module_id, NAVIGATION_MODULE);
    }
}
