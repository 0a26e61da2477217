/*
 * Responsibility
 * - Item request/response DTOs (camelCase on the wire)
 * - validate() for format checks, into_new_item() to build the record to persist
 */
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api::extractors::Validate;
use crate::repos::item_repo::{DEFAULT_CURRENCY, ItemRow, ItemType, ItemUnit, NewItem, NewPriceInfo};
use crate::services::ids::{self, IdPrefix};

const MAX_NAME_LEN: usize = 255;
const MAX_SKU_LEN: usize = 64;
const MAX_DESCRIPTION_LEN: usize = 1024;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub sku: String,
    pub unit: ItemUnit,
    #[serde(default)]
    pub returnable: bool,
    #[serde(default)]
    pub purchase_info: Option<PurchaseInfoInput>,
    #[serde(default)]
    pub sales_info: Option<SalesInfoInput>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseInfoInput {
    #[serde(default)]
    pub is_purchase_info_selected: bool,
    pub description: Option<String>,
    pub cost: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesInfoInput {
    #[serde(default)]
    pub is_sale_info_selected: bool,
    pub description: Option<String>,
    pub selling_price: Option<Decimal>,
}

fn validate_price_block(
    selected: bool,
    description: Option<&str>,
    price: Option<Decimal>,
    missing: &'static str,
    negative: &'static str,
) -> Result<(), &'static str> {
    // An unselected block is ignored entirely
    if !selected {
        return Ok(());
    }
    match price {
        None => return Err(missing),
        Some(p) if p.is_sign_negative() => return Err(negative),
        Some(_) => {}
    }
    if let Some(d) = description
        && d.chars().count() > MAX_DESCRIPTION_LEN
    {
        return Err("description must be <= 1024 chars");
    }
    Ok(())
}

impl Validate for CreateItemRequest {
    fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err("name must be <= 255 chars");
        }
        if self.sku.chars().count() > MAX_SKU_LEN {
            return Err("sku must be <= 64 chars");
        }

        if let Some(p) = &self.purchase_info {
            validate_price_block(
                p.is_purchase_info_selected,
                p.description.as_deref(),
                p.cost,
                "purchaseInfo.cost is required when purchase info is selected",
                "purchaseInfo.cost must not be negative",
            )?;
        }
        if let Some(s) = &self.sales_info {
            validate_price_block(
                s.is_sale_info_selected,
                s.description.as_deref(),
                s.selling_price,
                "salesInfo.sellingPrice is required when sales info is selected",
                "salesInfo.sellingPrice must not be negative",
            )?;
        }

        Ok(())
    }
}

impl CreateItemRequest {
    /// Build the record to insert. Call after `validate()`.
    ///
    /// Sub-records are only attached when their selection flag is set.
    pub fn into_new_item(self, organization_id: &str) -> NewItem {
        let purchase_info = self
            .purchase_info
            .filter(|p| p.is_purchase_info_selected)
            .and_then(|p| {
                p.cost.map(|price| NewPriceInfo {
                    id: ids::generate(IdPrefix::PurchaseInfo),
                    description: p.description,
                    price,
                    currency: DEFAULT_CURRENCY,
                })
            });

        let sales_info = self
            .sales_info
            .filter(|s| s.is_sale_info_selected)
            .and_then(|s| {
                s.selling_price.map(|price| NewPriceInfo {
                    id: ids::generate(IdPrefix::SalesInfo),
                    description: s.description,
                    price,
                    currency: DEFAULT_CURRENCY,
                })
            });

        NewItem {
            id: ids::generate(IdPrefix::Item),
            name: self.name.trim().to_string(),
            item_type: self.item_type,
            unit: self.unit,
            sku: self.sku,
            returnable: self.returnable,
            organization_id: organization_id.to_string(),
            purchase_info,
            sales_info,
        }
    }
}

/// DELETE body: a bare JSON array of item ids.
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct DeleteItemsRequest {
    pub ids: Vec<String>,
}

impl Validate for DeleteItemsRequest {
    fn validate(&self) -> Result<(), &'static str> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub unit: ItemUnit,
    pub sku: String,
    pub returnable: bool,
    pub organization_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<ItemRow> for ItemResponse {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            item_type: row.item_type,
            unit: row.unit,
            sku: row.sku,
            returnable: row.returnable,
            organization_id: row.organization_id,
            created_at: row.created_at,
        }
    }
}
