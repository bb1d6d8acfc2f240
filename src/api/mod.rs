mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::actions::ActionRegistry;
use crate::db::Database;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub registry: Arc<ActionRegistry>,
    /// Children fetched per tree expansion. Zero fetches all.
    pub page_limit: i64,
}

impl AppState {
    pub fn new(db: Database, registry: Arc<ActionRegistry>) -> Self {
        Self {
            db,
            registry,
            page_limit: 0,
        }
    }

    pub fn with_page_limit(mut self, page_limit: i64) -> Self {
        self.page_limit = page_limit;
        self
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Class metadata
        .route("/classes", get(handlers::list_classes).post(handlers::create_class))
        .route("/classes/{name}", get(handlers::get_class))
        .route("/classes/{name}/subclasses", get(handlers::list_subclasses))
        .route(
            "/classes/{name}/is-subclass-of/{ancestor}",
            get(handlers::is_subclass_of),
        )
        // Business objects
        .route("/objects", post(handlers::create_object))
        .route(
            "/objects/{class}/{id}",
            get(handlers::get_object).delete(handlers::delete_object),
        )
        .route("/objects/{class}/{id}/children", get(handlers::list_children))
        .route(
            "/objects/{class}/{id}/children/count",
            get(handlers::count_children),
        )
        .route(
            "/objects/{class}/{id}/special-children",
            get(handlers::list_special_children),
        )
        .route("/objects/{class}/{id}/parents", get(handlers::list_parents))
        .route(
            "/objects/{class}/{id}/special-relationships",
            post(handlers::create_special_relationship),
        )
        // Navigation trees
        .route("/tree/{class}/{id}", get(handlers::get_tree))
        .route("/tree/{class}/{id}/nodes", get(handlers::get_tree_level))
        // Actions
        .route("/actions", get(handlers::list_actions))
        .route("/modules", get(handlers::list_modules))
        .route("/modules/{id}/actions", get(handlers::list_module_actions))
        // Pools
        .route("/pools", get(handlers::list_pools).post(handlers::create_pool))
        .route("/pools/{id}", get(handlers::get_pool))
        .route(
            "/pools/{id}/items",
            get(handlers::list_pool_items).post(handlers::add_pool_item),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
