/*
 * Responsibility
 * - items / purchase_infos / sales_infos via SQLx
 * - every query is scoped by organization id
 * - DB errors are returned as RepoError so handlers can map them to AppError
 */
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use crate::repos::error::RepoResult;

/// Currency stored on every purchase/sales record.
pub const DEFAULT_CURRENCY: &str = "PKR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ItemType {
    Goods,
    Service,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Goods => "GOODS",
            Self::Service => "SERVICE",
        }
    }
}

impl FromStr for ItemType {
    type Err = UnknownVariant;

    // Clients send lowercase names; stored values are uppercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GOODS" => Ok(Self::Goods),
            "SERVICE" => Ok(Self::Service),
            _ => Err(UnknownVariant::new("item type", s)),
        }
    }
}

impl TryFrom<String> for ItemType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_unit", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", try_from = "String")]
pub enum ItemUnit {
    Pcs,
    Box,
    Dozen,
    Kg,
    G,
    L,
    Ml,
    M,
    Cm,
}

impl ItemUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcs => "PCS",
            Self::Box => "BOX",
            Self::Dozen => "DOZEN",
            Self::Kg => "KG",
            Self::G => "G",
            Self::L => "L",
            Self::Ml => "ML",
            Self::M => "M",
            Self::Cm => "CM",
        }
    }
}

impl FromStr for ItemUnit {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PCS" => Ok(Self::Pcs),
            "BOX" => Ok(Self::Box),
            "DOZEN" => Ok(Self::Dozen),
            "KG" => Ok(Self::Kg),
            "G" => Ok(Self::G),
            "L" => Ok(Self::L),
            "ML" => Ok(Self::Ml),
            "M" => Ok(Self::M),
            "CM" => Ok(Self::Cm),
            _ => Err(UnknownVariant::new("unit", s)),
        }
    }
}

impl TryFrom<String> for ItemUnit {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

#[derive(Debug, Clone, FromRow)]
pub struct ItemRow {
    pub id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub item_type: ItemType,
    pub unit: ItemUnit,
    pub sku: String,
    pub returnable: bool,
    pub organization_id: String,
    pub created_at: DateTime<Utc>,
}

/// Purchase or sales sub-record attached to a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPriceInfo {
    pub id: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub id: String,
    pub name: String,
    pub item_type: ItemType,
    pub unit: ItemUnit,
    pub sku: String,
    pub returnable: bool,
    pub organization_id: String,
    pub purchase_info: Option<NewPriceInfo>,
    pub sales_info: Option<NewPriceInfo>,
}

/// Persistence gateway for items.
///
/// Implementations must be cheap to share (`Arc<dyn ItemStore>` in `AppState`).
#[async_trait]
pub trait ItemStore: Send + Sync {
    // All items owned by the organization, oldest first.
    async fn list_by_organization(&self, organization_id: &str) -> RepoResult<Vec<ItemRow>>;

    // Insert the item and its selected sub-records atomically.
    //
    // Returns:
    // - Ok(Some(row)) => created
    // - Ok(None)      => nothing was created (id already taken)
    async fn create(&self, item: &NewItem) -> RepoResult<Option<ItemRow>>;

    // Delete the given ids within the organization. Returns the deleted count.
    async fn delete_many(&self, organization_id: &str, ids: &[String]) -> RepoResult<u64>;
}

#[derive(Clone, Debug)]
pub struct PgItemRepo {
    pool: PgPool,
}

impl PgItemRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_price_info(
        tx: &mut Transaction<'_, Postgres>,
        table: PriceInfoTable,
        item_id: &str,
        info: &NewPriceInfo,
    ) -> RepoResult<()> {
        let sql = match table {
            PriceInfoTable::Purchase => {
                r#"
                INSERT INTO purchase_infos (id, item_id, description, price, currency)
                VALUES ($1, $2, $3, $4, $5)
                "#
            }
            PriceInfoTable::Sales => {
                r#"
                INSERT INTO sales_infos (id, item_id, description, price, currency)
                VALUES ($1, $2, $3, $4, $5)
                "#
            }
        };

        sqlx::query(sql)
            .bind(&info.id)
            .bind(item_id)
            .bind(info.description.as_deref())
            .bind(info.price)
            .bind(info.currency)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }
}

#[derive(Clone, Copy)]
enum PriceInfoTable {
    Purchase,
    Sales,
}

#[async_trait]
impl ItemStore for PgItemRepo {
    async fn list_by_organization(&self, organization_id: &str) -> RepoResult<Vec<ItemRow>> {
        let rows = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT id, name, type, unit, sku, returnable, organization_id, created_at
            FROM items
            WHERE organization_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create(&self, item: &NewItem) -> RepoResult<Option<ItemRow>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (id, name, type, unit, sku, returnable, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            RETURNING id, name, type, unit, sku, returnable, organization_id, created_at
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(item.item_type)
        .bind(item.unit)
        .bind(&item.sku)
        .bind(item.returnable)
        .bind(&item.organization_id)
        .fetch_optional(&mut *tx)
        .await?;

        // Dropping the transaction rolls it back.
        let Some(row) = row else {
            return Ok(None);
        };

        if let Some(info) = &item.purchase_info {
            Self::insert_price_info(&mut tx, PriceInfoTable::Purchase, &row.id, info).await?;
        }
        if let Some(info) = &item.sales_info {
            Self::insert_price_info(&mut tx, PriceInfoTable::Sales, &row.id, info).await?;
        }

        tx.commit().await?;

        Ok(Some(row))
    }

    async fn delete_many(&self, organization_id: &str, ids: &[String]) -> RepoResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        // purchase_infos / sales_infos go with the item (ON DELETE CASCADE)
        let result = sqlx::query(
            r#"
            DELETE FROM items
            WHERE organization_id = $1
                AND id = ANY($2)
            "#,
        )
        .bind(organization_id)
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
