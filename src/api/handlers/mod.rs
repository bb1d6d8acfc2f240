use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::actions::{ActionKind, ActionSummary};
use crate::directory::{BusinessObjectDirectory, DirectoryError, SubclassOracle};
use crate::models::*;
use crate::tree::{
    CollectingNotifier, ContainmentRelation, ExpandedTree, HierarchicalTreeProvider, Notification,
    TreeNode, TreeSnapshot,
};

/// Deepest tree a single request may expand.
const MAX_TREE_DEPTH: usize = 16;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a directory error to a response.
///
/// Lookup failures are the client's problem and are returned as-is. Storage
/// errors are logged server-side and reported with a generic message so
/// internal details do not leak.
fn directory_error(e: DirectoryError) -> (StatusCode, String) {
    let status = match &e {
        DirectoryError::ObjectNotFound { .. } | DirectoryError::MetadataNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        DirectoryError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        DirectoryError::Storage(_) => {
            tracing::error!("Internal error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };

    tracing::warn!("Request failed: {}", e);
    (status, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Classes
// ============================================================

pub async fn list_classes(State(state): State<AppState>) -> ApiResult<Json<Vec<InventoryClass>>> {
    state.db.get_all_classes().map(Json).map_err(directory_error)
}

pub async fn create_class(
    State(state): State<AppState>,
    Json(input): Json<CreateClassInput>,
) -> ApiResult<(StatusCode, Json<InventoryClass>)> {
    state
        .db
        .create_class(input)
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(directory_error)
}

pub async fn get_class(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<InventoryClass>> {
    state
        .db
        .get_class(&name)
        .map_err(directory_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Class not found".to_string()))
}

pub async fn list_subclasses(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Vec<InventoryClass>>> {
    state
        .db
        .get_subclasses(&name)
        .map(Json)
        .map_err(directory_error)
}

pub async fn is_subclass_of(
    State(state): State<AppState>,
    Path((name, ancestor)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    let result = state
        .db
        .is_subclass_of(&name, &ancestor)
        .map_err(directory_error)?;
    Ok(Json(serde_json::json!({ "result": result })))
}

// ============================================================
// Objects
// ============================================================

/// Query parameters for listing children.
#[derive(Debug, Deserialize)]
pub struct ChildrenQuery {
    /// Maximum number of children. Omitted or zero returns all.
    pub limit: Option<i64>,
}

/// Query parameters for counting children.
#[derive(Debug, Deserialize)]
pub struct CountQuery {
    /// Only count children of this class or its subclasses.
    pub filter: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

pub async fn create_object(
    State(state): State<AppState>,
    Json(input): Json<CreateObjectInput>,
) -> ApiResult<(StatusCode, Json<BusinessObject>)> {
    state
        .db
        .create_object(input)
        .map(|o| (StatusCode::CREATED, Json(o)))
        .map_err(directory_error)
}

pub async fn get_object(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
) -> ApiResult<Json<BusinessObject>> {
    state
        .db
        .get_object(&class_name, &id)
        .map(Json)
        .map_err(directory_error)
}

pub async fn delete_object(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state
        .db
        .delete_object(&class_name, &id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(directory_error)
}

pub async fn list_children(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
    Query(query): Query<ChildrenQuery>,
) -> ApiResult<Json<Vec<InventoryObjectRef>>> {
    state
        .db
        .get_object_children(&class_name, &id, query.limit.unwrap_or(0))
        .map(Json)
        .map_err(directory_error)
}

pub async fn count_children(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
    Query(query): Query<CountQuery>,
) -> ApiResult<Json<CountResponse>> {
    state
        .db
        .get_object_children_count(&class_name, &id, query.filter.as_deref())
        .map(|count| Json(CountResponse { count }))
        .map_err(directory_error)
}

pub async fn list_special_children(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<InventoryObjectRef>>> {
    state
        .db
        .get_object_special_children(&class_name, &id)
        .map(Json)
        .map_err(directory_error)
}

pub async fn list_parents(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<InventoryObjectRef>>> {
    state
        .db
        .get_parents(&class_name, &id)
        .map(Json)
        .map_err(directory_error)
}

pub async fn create_special_relationship(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
    Json(input): Json<CreateRelationshipInput>,
) -> ApiResult<(StatusCode, Json<SpecialRelationship>)> {
    state
        .db
        .create_special_relationship(&class_name, &id, input)
        .map(|r| (StatusCode::CREATED, Json(r)))
        .map_err(directory_error)
}

// ============================================================
// Navigation trees
// ============================================================

/// Query parameters for tree requests.
#[derive(Debug, Deserialize)]
pub struct TreeQuery {
    /// Containment edge to follow. Defaults to `regular`.
    pub relation: Option<ContainmentRelation>,
    /// Levels to expand below the root. Defaults to 1.
    pub depth: Option<usize>,
}

/// A tree plus whatever went wrong while loading it.
///
/// Failed branches show up as leaves; `notifications` says which ones.
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeResponse {
    pub tree: TreeSnapshot,
    pub notifications: Vec<Notification>,
}

/// One child row as a tree widget sees it.
#[derive(Debug, Serialize, Deserialize)]
pub struct TreeNodeInfo {
    #[serde(flatten)]
    pub object: InventoryObjectRef,
    pub child_count: usize,
    pub has_children: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TreeLevelResponse {
    pub nodes: Vec<TreeNodeInfo>,
    pub notifications: Vec<Notification>,
}

pub async fn get_tree(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
    Query(query): Query<TreeQuery>,
) -> ApiResult<Json<TreeResponse>> {
    let root = state
        .db
        .get_object(&class_name, &id)
        .map_err(directory_error)?;
    let depth = query.depth.unwrap_or(1).min(MAX_TREE_DEPTH);

    let notifier = CollectingNotifier::new();
    let provider = HierarchicalTreeProvider::with_notifier(
        &state.db,
        InventoryObjectRef::from(&root),
        query.relation.unwrap_or_default(),
        &notifier,
    )
    .with_limit(state.page_limit);

    let tree = ExpandedTree::new(provider).snapshot(depth);

    Ok(Json(TreeResponse {
        tree,
        notifications: notifier.take(),
    }))
}

pub async fn get_tree_level(
    State(state): State<AppState>,
    Path((class_name, id)): Path<(String, String)>,
    Query(query): Query<TreeQuery>,
) -> ApiResult<Json<TreeLevelResponse>> {
    let root = state
        .db
        .get_object(&class_name, &id)
        .map_err(directory_error)?;

    let notifier = CollectingNotifier::new();
    let provider = HierarchicalTreeProvider::with_notifier(
        &state.db,
        InventoryObjectRef::from(&root),
        query.relation.unwrap_or_default(),
        &notifier,
    )
    .with_limit(state.page_limit);

    let nodes = provider
        .fetch_children(Some(&TreeNode::new(provider.root().clone())))
        .into_iter()
        .map(|node| TreeNodeInfo {
            child_count: provider.child_count(Some(&node)),
            has_children: provider.has_children(&node),
            object: node.object,
        })
        .collect();

    Ok(Json(TreeLevelResponse {
        nodes,
        notifications: notifier.take(),
    }))
}

// ============================================================
// Actions
// ============================================================

/// Query parameters for action lookups.
#[derive(Debug, Deserialize)]
pub struct ActionsQuery {
    /// Class of the selected object. Omitted means actions for any class.
    pub class: Option<String>,
    /// Restrict to one kind. Omitted returns every kind, misc first.
    pub kind: Option<ActionKind>,
    /// Also match actions declared for superclasses.
    #[serde(default)]
    pub recursive: bool,
}

pub async fn list_actions(
    State(state): State<AppState>,
    Query(query): Query<ActionsQuery>,
) -> ApiResult<Json<Vec<ActionSummary>>> {
    let class_name = query.class.unwrap_or_default();
    let kinds = match query.kind {
        Some(kind) => vec![kind],
        None => ActionKind::ALL.to_vec(),
    };

    let mut actions = Vec::new();
    for kind in kinds {
        if query.recursive {
            actions.extend(
                state
                    .registry
                    .get_actions_applicable_to_recursive(kind, &class_name, &state.db)
                    .iter()
                    .map(ActionSummary::from),
            );
        } else {
            actions.extend(
                state
                    .registry
                    .get_actions_applicable_to(kind, &class_name)
                    .iter()
                    .map(ActionSummary::from),
            );
        }
    }

    Ok(Json(actions))
}

pub async fn list_modules(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(
        state
            .registry
            .modules()
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

pub async fn list_module_actions(
    State(state): State<AppState>,
    Path(module_id): Path<String>,
) -> ApiResult<Json<Vec<ActionSummary>>> {
    let actions = state.registry.get_actions_for_module(&module_id);
    if actions.is_empty() {
        return Err((StatusCode::NOT_FOUND, "Module not found".to_string()));
    }
    Ok(Json(actions.iter().map(ActionSummary::from).collect()))
}

// ============================================================
// Pools
// ============================================================

/// Body for placing an object in a pool.
#[derive(Debug, Serialize, Deserialize)]
pub struct PoolItemInput {
    pub class_name: String,
    pub id: String,
}

pub async fn list_pools(State(state): State<AppState>) -> ApiResult<Json<Vec<Pool>>> {
    state.db.get_pools().map(Json).map_err(directory_error)
}

pub async fn create_pool(
    State(state): State<AppState>,
    Json(input): Json<CreatePoolInput>,
) -> ApiResult<(StatusCode, Json<Pool>)> {
    state
        .db
        .create_pool(input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(directory_error)
}

pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Pool>> {
    state.db.get_pool(&id).map(Json).map_err(directory_error)
}

pub async fn list_pool_items(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<InventoryObjectRef>>> {
    state.db.get_pool_items(&id).map(Json).map_err(directory_error)
}

pub async fn add_pool_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PoolItemInput>,
) -> ApiResult<StatusCode> {
    state
        .db
        .add_object_to_pool(&id, &input.class_name, &input.id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(directory_error)
}
