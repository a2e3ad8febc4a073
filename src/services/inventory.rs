use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::inventory::{self, Column, Entity as Inventory};
use crate::entities::product::Entity as Product;
use crate::entities::InventoryModel;
use crate::errors::ServiceError;

/// Absolute stock levels for one product at one location.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StockLevel {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub location: String,
    #[validate(range(min = 0))]
    pub quantity_available: i32,
    #[validate(range(min = 0))]
    pub quantity_reserved: i32,
    #[validate(range(min = 0))]
    pub quantity_incoming: i32,
    #[validate(range(min = 0))]
    pub reorder_point: i32,
}

/// Per-location stock records.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Writes the stock levels for `(product, location)`, replacing any previous record.
    #[instrument(skip(self, level), fields(product_id = %level.product_id, location = %level.location))]
    pub async fn record_stock(&self, level: StockLevel) -> Result<InventoryModel, ServiceError> {
        level.validate()?;
        let db = &*self.db_pool;

        Product::find_by_id(level.product_id)
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", level.product_id))
            })?;

        let record = inventory::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(level.product_id),
            location: Set(level.location.clone()),
            quantity_available: Set(level.quantity_available),
            quantity_reserved: Set(level.quantity_reserved),
            quantity_incoming: Set(level.quantity_incoming),
            reorder_point: Set(level.reorder_point),
            last_updated: Set(Utc::now()),
        };

        Inventory::insert(record)
            .on_conflict(
                OnConflict::columns([Column::ProductId, Column::Location])
                    .update_columns([
                        Column::QuantityAvailable,
                        Column::QuantityReserved,
                        Column::QuantityIncoming,
                        Column::ReorderPoint,
                        Column::LastUpdated,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await
            .map_err(|e| {
                error!("Failed to record stock: {}", e);
                ServiceError::DatabaseError(e)
            })?;

        let stored = Inventory::find()
            .filter(Column::ProductId.eq(level.product_id))
            .filter(Column::Location.eq(level.location.as_str()))
            .one(db)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::InternalError("Stock record missing after upsert".into()))?;

        info!(available = stored.quantity_available, "Stock recorded");
        Ok(stored)
    }

    /// Records at or below their reorder point.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<InventoryModel>, ServiceError> {
        Inventory::find()
            .filter(
                Expr::col(Column::QuantityAvailable).lte(Expr::col(Column::ReorderPoint)),
            )
            .order_by_asc(Column::QuantityAvailable)
            .order_by_asc(Column::Location)
            .all(&*self.db_pool)
            .await
            .map_err(|e| {
                error!("Failed to query low stock: {}", e);
                ServiceError::DatabaseError(e)
            })
    }

    /// Available units summed over every location.
    #[instrument(skip(self))]
    pub async fn total_available(&self, product_id: Uuid) -> Result<i64, ServiceError> {
        let records = self.stock_for_product(product_id).await?;
        Ok(records
            .iter()
            .map(|r| i64::from(r.quantity_available))
            .sum())
    }

    pub async fn stock_for_product(&self, product_id: Uuid) -> Result<Vec<InventoryModel>, ServiceError> {
        Inventory::find()
            .filter(Column::ProductId.eq(product_id))
            .order_by_asc(Column::Location)
            .all(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)
    }
}
