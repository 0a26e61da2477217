/*
 * Responsibility
 * - /api/items handlers (list / create / bulk delete / no-op update)
 * - the organization comes from the CurrentOrganization extractor, never from the client
 * - failures are logged here and surfaced as AppError (generic 500)
 */
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::{
    api::{
        dto::items::{CreateItemRequest, DeleteItemsRequest, ItemResponse},
        extractors::{CurrentOrganization, ValidatedJson},
    },
    error::AppError,
    state::AppState,
};

pub async fn list_items(
    State(state): State<AppState>,
    CurrentOrganization(organization): CurrentOrganization,
) -> Result<Json<Vec<ItemResponse>>, AppError> {
    tracing::debug!(organization_id = %organization.id, "GET /api/items");

    let rows = state.items.list_by_organization(&organization.id).await?;

    tracing::debug!(
        organization_id = %organization.id,
        count = rows.len(),
        "got items"
    );

    Ok(Json(rows.into_iter().map(ItemResponse::from).collect()))
}

pub async fn create_item(
    State(state): State<AppState>,
    CurrentOrganization(organization): CurrentOrganization,
    ValidatedJson(req): ValidatedJson<CreateItemRequest>,
) -> Result<Json<Value>, AppError> {
    tracing::debug!(
        organization_id = %organization.id,
        name = %req.name,
        sku = %req.sku,
        "POST /api/items"
    );

    let item = req.into_new_item(&organization.id);

    let Some(created) = state.items.create(&item).await? else {
        tracing::error!(
            organization_id = %organization.id,
            item_id = %item.id,
            "failed to create item"
        );
        return Err(AppError::CreateFailed);
    };

    tracing::info!(
        organization_id = %organization.id,
        item_id = %created.id,
        item_type = created.item_type.as_str(),
        unit = created.unit.as_str(),
        purchase_info = item.purchase_info.is_some(),
        sales_info = item.sales_info.is_some(),
        "created item"
    );

    Ok(Json(json!({})))
}

pub async fn delete_items(
    State(state): State<AppState>,
    CurrentOrganization(organization): CurrentOrganization,
    ValidatedJson(req): ValidatedJson<DeleteItemsRequest>,
) -> Result<Json<u64>, AppError> {
    tracing::debug!(
        organization_id = %organization.id,
        item_ids = ?req.ids,
        "DELETE /api/items"
    );

    let count = state
        .items
        .delete_many(&organization.id, &req.ids)
        .await?;

    tracing::info!(
        organization_id = %organization.id,
        count_deleted = count,
        item_ids = ?req.ids,
        "deleted items"
    );

    Ok(Json(count))
}

/// Item updates are not supported; the route exists and does nothing.
pub async fn update_items() -> StatusCode {
    StatusCode::NO_CONTENT
}
