use std::sync::Arc;

use inventory_navigator::actions::{builtin, ActionKind, ActionRegistryBuilder, InventoryAction};
use inventory_navigator::db::Database;
use inventory_navigator::models::*;
use inventory_navigator::tree::*;

fn setup() -> Database {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    for (name, parent, is_abstract) in [
        ("InventoryObject", None, true),
        ("GenericLocation", Some("InventoryObject"), true),
        ("Building", Some("GenericLocation"), false),
        ("Room", Some("GenericLocation"), false),
        ("GenericNetworkElement", Some("InventoryObject"), true),
        ("Router", Some("GenericNetworkElement"), false),
        ("Service", Some("InventoryObject"), false),
    ] {
        db.create_class(CreateClassInput {
            name: name.to_string(),
            parent_name: parent.map(str::to_string),
            display_name: None,
            is_abstract,
        })
        .expect("Failed to create class");
    }
    db
}

fn create(db: &Database, class_name: &str, name: &str, parent: Option<&BusinessObject>) -> BusinessObject {
    db.create_object(CreateObjectInput {
        class_name: class_name.to_string(),
        name: name.to_string(),
        parent_class: parent.map(|p| p.class_name.clone()),
        parent_id: parent.map(|p| p.id.clone()),
    })
    .expect("Failed to create object")
}

mod provider_over_database {
    use super::*;

    #[test]
    fn building_children_come_back_in_backend_order() {
        let db = setup();
        let building = create(&db, "Building", "R", None);
        let c1 = create(&db, "Room", "C1", Some(&building));
        let c2 = create(&db, "Room", "C2", Some(&building));

        let provider = HierarchicalTreeProvider::new(
            &db,
            InventoryObjectRef::from(&building),
            ContainmentRelation::Regular,
        );

        let root = provider.fetch_children(None);
        assert_eq!(root, vec![TreeNode::new(InventoryObjectRef::from(&building))]);

        let children = provider.fetch_children(Some(&root[0]));
        assert_eq!(
            children,
            vec![
                TreeNode::new(InventoryObjectRef::from(&c1)),
                TreeNode::new(InventoryObjectRef::from(&c2)),
            ]
        );
        assert_eq!(provider.child_count(Some(&root[0])), 2);
        assert_eq!(provider.child_count(None), 1);
    }

    #[test]
    fn deleted_node_degrades_to_leaf_with_notification() {
        let db = setup();
        let building = create(&db, "Building", "HQ", None);
        let room = create(&db, "Room", "Lab", Some(&building));
        let stale = TreeNode::new(InventoryObjectRef::from(&room));
        db.delete_object("Room", &room.id).expect("Failed to delete");

        let notifier = CollectingNotifier::new();
        let provider = HierarchicalTreeProvider::with_notifier(
            &db,
            InventoryObjectRef::from(&building),
            ContainmentRelation::Regular,
            &notifier,
        );

        assert!(provider.fetch_children(Some(&stale)).is_empty());
        assert!(provider.has_children(&stale));

        let notifications = notifier.take();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].object, Some(stale.object.clone()));
    }

    #[test]
    fn placeholder_root_is_empty_and_counts_zero() {
        let db = setup();
        let provider = HierarchicalTreeProvider::new(
            &db,
            InventoryObjectRef::placeholder("Navigation"),
            ContainmentRelation::Regular,
        );

        let root = provider.fetch_children(None);
        assert!(root[0].is_placeholder());
        assert!(provider.fetch_children(Some(&root[0])).is_empty());
        assert_eq!(provider.child_count(Some(&root[0])), 0);
    }

    #[test]
    fn special_relation_follows_relationships() {
        let db = setup();
        let router = create(&db, "Router", "edge-1", None);
        let service = create(&db, "Service", "Internet", None);
        create(&db, "Room", "unused", None);
        db.create_special_relationship(
            "Router",
            &router.id,
            CreateRelationshipInput {
                name: "uses".to_string(),
                target_class: "Service".to_string(),
                target_id: service.id.clone(),
            },
        )
        .expect("Failed to relate");

        let provider = HierarchicalTreeProvider::new(
            &db,
            InventoryObjectRef::from(&router),
            ContainmentRelation::Special,
        );
        let root = provider.fetch_children(None);

        assert_eq!(
            provider.fetch_children(Some(&root[0])),
            vec![TreeNode::new(InventoryObjectRef::from(&service))]
        );
        assert_eq!(provider.child_count(Some(&root[0])), 1);
    }
}

mod expanded_tree {
    use super::*;

    #[test]
    fn renders_a_two_level_tree() {
        let db = setup();
        let building = create(&db, "Building", "HQ", None);
        let lab = create(&db, "Room", "Lab", Some(&building));
        create(&db, "Router", "core-1", Some(&lab));
        create(&db, "Room", "Office", Some(&building));

        let provider = HierarchicalTreeProvider::new(
            &db,
            InventoryObjectRef::from(&building),
            ContainmentRelation::Regular,
        );
        let snapshot = ExpandedTree::new(provider).snapshot(2);

        assert_eq!(
            render_tree(&snapshot),
            "HQ [Building]\n├── Lab [Room]\n│   └── core-1 [Router]\n└── Office [Room]\n"
        );
    }

    #[test]
    fn cached_levels_survive_until_invalidated() {
        let db = setup();
        let building = create(&db, "Building", "HQ", None);
        create(&db, "Room", "Lab", Some(&building));

        let provider = HierarchicalTreeProvider::new(
            &db,
            InventoryObjectRef::from(&building),
            ContainmentRelation::Regular,
        );
        let mut tree = ExpandedTree::new(provider);
        let root = tree.root();
        assert_eq!(tree.expand(&root).len(), 1);

        create(&db, "Room", "Office", Some(&building));
        assert_eq!(tree.expand(&root).len(), 1);

        tree.invalidate();
        assert_eq!(tree.expand(&root).len(), 2);
    }

    #[test]
    fn page_limit_caps_each_level() {
        let db = setup();
        let building = create(&db, "Building", "HQ", None);
        for name in ["a", "b", "c"] {
            create(&db, "Room", name, Some(&building));
        }

        let provider = HierarchicalTreeProvider::new(
            &db,
            InventoryObjectRef::from(&building),
            ContainmentRelation::Regular,
        )
        .with_limit(2);

        let snapshot = ExpandedTree::new(provider).snapshot(1);
        assert_eq!(snapshot.children.len(), 2);
    }

    #[test]
    fn special_cycles_end_at_the_repeated_object() {
        let db = setup();
        let a = create(&db, "Service", "A", None);
        let b = create(&db, "Service", "B", None);
        for (source, target) in [(&a, &b), (&b, &a)] {
            db.create_special_relationship(
                "Service",
                &source.id,
                CreateRelationshipInput {
                    name: "depends-on".to_string(),
                    target_class: "Service".to_string(),
                    target_id: target.id.clone(),
                },
            )
            .expect("Failed to relate");
        }

        let provider = HierarchicalTreeProvider::new(
            &db,
            InventoryObjectRef::from(&a),
            ContainmentRelation::Special,
        );
        let snapshot = ExpandedTree::new(provider).snapshot(16);

        assert_eq!(
            render_tree(&snapshot),
            "A [Service]\n└── B [Service]\n    └── A [Service]\n"
        );
    }
}

mod actions_over_database {
    use super::*;

    #[test]
    fn recursive_lookup_uses_the_class_hierarchy() {
        let db = setup();
        let mut builder = ActionRegistryBuilder::new();
        builtin::register_core_actions(&mut builder);
        builder.register(
            "monitoring",
            Arc::new(
                InventoryAction::new("ping", "Ping", ActionKind::Misc).applies_to("Router"),
            ),
        );
        let registry = builder.freeze();

        let found = registry.get_actions_applicable_to_recursive(ActionKind::Misc, "Router", &db);
        let ids: Vec<_> = found.iter().map(|a| a.action.id.as_str()).collect();
        assert_eq!(ids, vec!["manage-ports", "ping"]);

        // Unscoped navigation actions stay out of class-aware lookups
        assert!(registry
            .get_actions_applicable_to_recursive(ActionKind::Delete, "Room", &db)
            .is_empty());
        assert_eq!(registry.get_actions_applicable_to(ActionKind::Delete, "").len(), 1);
    }

    #[test]
    fn actions_for_unknown_classes_are_skipped() {
        let db = setup();
        let mut builder = ActionRegistryBuilder::new();
        builtin::register_core_actions(&mut builder);
        let registry = builder.freeze();

        // GenericProject, GenericCommunicationsElement, ... are not in this database
        let found = registry.get_actions_applicable_to_recursive(
            ActionKind::RelationshipManagement,
            "Router",
            &db,
        );
        let ids: Vec<_> = found.iter().map(|a| a.action.id.as_str()).collect();
        assert_eq!(ids, vec!["relate-to-project"]);
    }
}
