/*
 * Responsibility
 * - URL layout under /api
 * - decide which routes sit behind the auth gate (route_layer)
 */
use axum::{
    Router,
    routing::{get, patch},
};

use crate::api::handlers::items::{create_item, delete_items, list_items, update_items};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new().route(
        "/items",
        get(list_items).post(create_item).delete(delete_items),
    );

    // PATCH is added after the auth layer: it is a no-op and stays public.
    middleware::auth::access::apply(protected, state).route("/items", patch(update_items))
}
