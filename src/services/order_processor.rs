use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::entities::purchase_order::{
    self, ActiveModel as PurchaseOrderActiveModel, Entity as PurchaseOrder,
};
use crate::entities::purchase_order_item::{
    self, ActiveModel as PurchaseOrderItemActiveModel, Entity as PurchaseOrderItem,
};
use crate::entities::{PurchaseOrderItemModel, PurchaseOrderModel, PurchaseOrderStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::repositories::{VariantInventoryReader, VariantRepository};

/// One row of a purchase-order feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRow {
    pub po_number: String,
    pub customer_name: Option<String>,
    pub style: String,
    #[serde(deserialize_with = "deserialize_price")]
    pub price: Decimal,
    pub color: Option<String>,
    pub size: Option<String>,
    pub collection_name: Option<String>,
    pub quantity: i32,
}

/// Accepts `12.50`, ` 12.50 ` and `$12.50`.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    Decimal::from_str(&cleaned)
        .map_err(|e| serde::de::Error::custom(format!("invalid price '{}': {}", raw, e)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestedOrder {
    pub id: Uuid,
    pub po_number: String,
    pub customer: Option<String>,
    pub total_skus: i32,
    pub total_units: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestionSummary {
    pub message: String,
    pub orders: Vec<IngestedOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StockStatus {
    InStock,
    Short,
}

impl StockStatus {
    /// Returns `(shortfall, status)`; shortfall is floored at zero.
    pub fn assess(requested: i64, available: i64) -> (i64, StockStatus) {
        let shortfall = (requested - available).max(0);
        let status = if available >= requested {
            StockStatus::InStock
        } else {
            StockStatus::Short
        };
        (shortfall, status)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityLine {
    pub item_id: Uuid,
    pub style_name: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub requested: i64,
    pub available: i64,
    pub shortfall: i64,
    pub status: StockStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityReport {
    pub po_id: Uuid,
    pub po_number: String,
    pub lines: Vec<AvailabilityLine>,
    pub total_items: usize,
    pub items_in_stock: usize,
    pub items_short: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseOrderDetail {
    pub order: PurchaseOrderModel,
    pub items: Vec<PurchaseOrderItemModel>,
}

/// Rows sharing a PO number, in first-seen order.
fn group_rows(rows: Vec<OrderRow>) -> Vec<(String, Vec<OrderRow>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<OrderRow>)> = Vec::new();
    for row in rows {
        match index.get(&row.po_number) {
            Some(&i) => groups[i].1.push(row),
            None => {
                index.insert(row.po_number.clone(), groups.len());
                groups.push((row.po_number.clone(), vec![row]));
            }
        }
    }
    groups
}

/// Purchase-order ingestion, inventory reconciliation and PO lifecycle.
#[derive(Clone)]
pub struct OrderProcessor {
    db: Arc<DatabaseConnection>,
    variants: Arc<dyn VariantInventoryReader>,
    platform: String,
    event_sender: Option<EventSender>,
}

impl OrderProcessor {
    pub fn new(db: Arc<DatabaseConnection>, platform: impl Into<String>) -> Self {
        Self {
            variants: Arc::new(VariantRepository::new(db.clone())),
            db,
            platform: platform.into(),
            event_sender: None,
        }
    }

    pub fn with_variant_reader(mut self, variants: Arc<dyn VariantInventoryReader>) -> Self {
        self.variants = variants;
        self
    }

    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Persists every order in `rows` in one transaction. Any failure rolls
    /// back the whole batch.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn process_orders(&self, rows: Vec<OrderRow>) -> Result<IngestionSummary, ServiceError> {
        let groups = group_rows(rows);

        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let orders = match self.persist_groups(&txn, &groups).await {
            Ok(orders) => orders,
            Err(e) => {
                error!("Purchase order ingestion failed, rolling back: {}", e);
                counter!("arch4.orders.ingest_failed", 1);
                if let Err(rollback_err) = txn.rollback().await {
                    error!("Rollback failed: {}", rollback_err);
                }
                return Err(e);
            }
        };

        txn.commit().await.map_err(|e| {
            error!("Failed to commit purchase order batch: {}", e);
            counter!("arch4.orders.ingest_failed", 1);
            ServiceError::DatabaseError(e)
        })?;

        counter!("arch4.orders.ingested", orders.len() as u64);
        info!(orders = orders.len(), "purchase orders ingested");

        if let Some(sender) = &self.event_sender {
            for order in &orders {
                let event = Event::PurchaseOrderReceived {
                    po_id: order.id,
                    po_number: order.po_number.clone(),
                    total_units: order.total_units,
                };
                if let Err(e) = sender.send(event).await {
                    warn!("Failed to publish PurchaseOrderReceived event: {}", e);
                }
            }
        }

        Ok(IngestionSummary {
            message: format!("Processed {} purchase orders", orders.len()),
            orders,
        })
    }

    async fn persist_groups(
        &self,
        txn: &DatabaseTransaction,
        groups: &[(String, Vec<OrderRow>)],
    ) -> Result<Vec<IngestedOrder>, ServiceError> {
        let mut orders = Vec::with_capacity(groups.len());

        for (po_number, rows) in groups {
            if po_number.trim().is_empty() {
                return Err(ServiceError::InvalidInput(
                    "Row without a po_number".to_string(),
                ));
            }
            // group_rows never yields an empty group
            let Some(first) = rows.first() else { continue };

            for row in rows.iter().skip(1) {
                if row.customer_name != first.customer_name
                    || row.collection_name != first.collection_name
                {
                    warn!(
                        po_number = %po_number,
                        "rows disagree on customer or collection; keeping the first row's values"
                    );
                    break;
                }
            }

            let total_skus = i32::try_from(rows.len())
                .map_err(|_| ServiceError::InvalidInput(format!("{} has too many lines", po_number)))?;
            let total_units = rows
                .iter()
                .try_fold(0i32, |acc, r| acc.checked_add(r.quantity))
                .ok_or_else(|| {
                    ServiceError::InvalidInput(format!("{} unit total overflows", po_number))
                })?;

            let now = Utc::now();
            let order = PurchaseOrderActiveModel {
                id: Set(Uuid::new_v4()),
                po_number: Set(po_number.clone()),
                customer_name: Set(first.customer_name.clone()),
                platform: Set(Some(self.platform.clone())),
                collection_name: Set(first.collection_name.clone()),
                total_skus: Set(total_skus),
                total_units: Set(total_units),
                status: Set(PurchaseOrderStatus::Received),
                order_date: Set(now),
                required_date: Set(None),
                created_at: Set(now),
            }
            .insert(txn)
            .await
            .map_err(|e| {
                error!("Failed to insert purchase order {}: {}", po_number, e);
                ServiceError::DatabaseError(e)
            })?;

            for (line, row) in rows.iter().enumerate() {
                let total_price = row
                    .price
                    .checked_mul(Decimal::from(row.quantity))
                    .ok_or_else(|| {
                        ServiceError::InvalidInput(format!(
                            "{} line {} total overflows",
                            po_number,
                            line + 1
                        ))
                    })?;
                PurchaseOrderItemActiveModel {
                    id: Set(Uuid::new_v4()),
                    po_id: Set(order.id),
                    line_number: Set(line as i32 + 1),
                    style_name: Set(row.style.trim().to_string()),
                    color: Set(row.color.clone()),
                    size: Set(row.size.clone()),
                    quantity: Set(row.quantity),
                    unit_price: Set(row.price),
                    total_price: Set(total_price),
                    created_at: Set(now),
                }
                .insert(txn)
                .await
                .map_err(|e| {
                    error!("Failed to insert line {} of {}: {}", line + 1, po_number, e);
                    ServiceError::DatabaseError(e)
                })?;
            }

            orders.push(IngestedOrder {
                id: order.id,
                po_number: order.po_number,
                customer: order.customer_name,
                total_skus,
                total_units,
            });
        }

        Ok(orders)
    }

    /// Parses a CSV feed with a header row and ingests it.
    #[instrument(skip(self, reader))]
    pub async fn process_csv<R: Read + Send>(&self, reader: R) -> Result<IngestionSummary, ServiceError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let rows = csv_reader
            .deserialize::<OrderRow>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!("Failed to parse purchase order feed: {}", e);
                counter!("arch4.orders.ingest_failed", 1);
                ServiceError::from(e)
            })?;

        self.process_orders(rows).await
    }

    /// Reads a CSV file from disk and ingests it.
    pub async fn process_csv_file(&self, path: impl AsRef<Path>) -> Result<IngestionSummary, ServiceError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            ServiceError::InvalidInput(format!("Cannot open {}: {}", path.display(), e))
        })?;
        self.process_csv(file).await
    }

    /// Checks each line of a purchase order against stock across all locations.
    #[instrument(skip(self), fields(po_id = %po_id))]
    pub async fn sync_with_inventory(&self, po_id: Uuid) -> Result<AvailabilityReport, ServiceError> {
        let detail = self.get_purchase_order(po_id).await?;

        let mut lines = Vec::with_capacity(detail.items.len());
        for item in &detail.items {
            let matches = self
                .variants
                .find_variants(&item.style_name, item.color.as_deref(), item.size.as_deref())
                .await?;

            // Variants of the same product share its stock; count it once
            let mut seen = HashSet::new();
            let available: i64 = matches
                .iter()
                .filter(|m| m.variant.product_id.map_or(false, |id| seen.insert(id)))
                .flat_map(|m| m.inventory.iter())
                .map(|record| i64::from(record.quantity_available))
                .sum();

            let requested = i64::from(item.quantity);
            let (shortfall, status) = StockStatus::assess(requested, available);
            lines.push(AvailabilityLine {
                item_id: item.id,
                style_name: item.style_name.clone(),
                color: item.color.clone(),
                size: item.size.clone(),
                requested,
                available,
                shortfall,
                status,
            });
        }

        let items_short = lines
            .iter()
            .filter(|l| l.status == StockStatus::Short)
            .count();
        counter!("arch4.inventory.short_lines", items_short as u64);

        if items_short > 0 {
            if let Some(sender) = &self.event_sender {
                let event = Event::StockShortfallDetected {
                    po_id,
                    po_number: detail.order.po_number.clone(),
                    items_short,
                };
                if let Err(e) = sender.send(event).await {
                    warn!("Failed to publish StockShortfallDetected event: {}", e);
                }
            }
        }

        info!(
            po_number = %detail.order.po_number,
            items = lines.len(),
            items_short,
            "inventory sync complete"
        );

        Ok(AvailabilityReport {
            po_id,
            po_number: detail.order.po_number,
            total_items: lines.len(),
            items_in_stock: lines.len() - items_short,
            items_short,
            lines,
        })
    }

    /// Purchase orders, newest first, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_purchase_orders(
        &self,
        status: Option<PurchaseOrderStatus>,
    ) -> Result<Vec<PurchaseOrderModel>, ServiceError> {
        let mut query = PurchaseOrder::find();
        if let Some(status) = status {
            query = query.filter(purchase_order::Column::Status.eq(status));
        }
        query
            .order_by_desc(purchase_order::Column::CreatedAt)
            .order_by_desc(purchase_order::Column::PoNumber)
            .all(&*self.db)
            .await
            .map_err(|e| {
                error!("Failed to list purchase orders: {}", e);
                ServiceError::DatabaseError(e)
            })
    }

    /// A purchase order with its lines in feed order.
    #[instrument(skip(self), fields(po_id = %po_id))]
    pub async fn get_purchase_order(&self, po_id: Uuid) -> Result<PurchaseOrderDetail, ServiceError> {
        let db = &*self.db;
        let order = PurchaseOrder::find_by_id(po_id)
            .one(db)
            .await
            .map_err(|e| {
                error!("Failed to fetch purchase order {}: {}", po_id, e);
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", po_id)))?;

        let items = PurchaseOrderItem::find()
            .filter(purchase_order_item::Column::PoId.eq(po_id))
            .order_by_asc(purchase_order_item::Column::LineNumber)
            .all(db)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(PurchaseOrderDetail { order, items })
    }

    /// Moves a purchase order forward in its lifecycle.
    #[instrument(skip(self), fields(po_id = %po_id, new_status = %new_status))]
    pub async fn update_status(
        &self,
        po_id: Uuid,
        new_status: PurchaseOrderStatus,
    ) -> Result<PurchaseOrderModel, ServiceError> {
        let txn = self.db.begin().await.map_err(|e| {
            error!("Failed to begin transaction: {}", e);
            ServiceError::DatabaseError(e)
        })?;

        let order = PurchaseOrder::find_by_id(po_id)
            .one(&txn)
            .await
            .map_err(ServiceError::DatabaseError)?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase order {} not found", po_id)))?;

        let old_status = order.status;
        if old_status == new_status {
            return Ok(order);
        }
        if !old_status.can_transition_to(new_status) {
            error!("Invalid status transition from {} to {}", old_status, new_status);
            return Err(ServiceError::InvalidStatus(format!(
                "Cannot transition purchase order from '{}' to '{}'",
                old_status, new_status
            )));
        }

        let mut active: PurchaseOrderActiveModel = order.into();
        active.status = Set(new_status);
        let updated = active.update(&txn).await.map_err(|e| {
            error!("Failed to update purchase order {} status: {}", po_id, e);
            ServiceError::DatabaseError(e)
        })?;

        txn.commit().await.map_err(ServiceError::DatabaseError)?;

        info!(
            "Purchase order {} status updated from '{}' to '{}'",
            updated.po_number, old_status, new_status
        );

        if let Some(sender) = &self.event_sender {
            let event = Event::PurchaseOrderStatusChanged {
                po_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            };
            if let Err(e) = sender.send(event).await {
                warn!("Failed to publish PurchaseOrderStatusChanged event: {}", e);
            }
        }

        Ok(updated)
    }
}
