use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::product::{self, Column as ProductColumn, Entity as Product};
use crate::entities::{collection, product_variant, style};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::PaginatedResponse;

const MAX_PAGE_SIZE: u64 = 200;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 100, message = "SKU must be between 1 and 100 characters"))]
    pub sku: String,
    #[validate(length(min = 1, max = 500, message = "Product name must be between 1 and 500 characters"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub material: Option<String>,
    pub cost_price: Option<Decimal>,
    pub wholesale_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateVariantInput {
    pub product_id: Option<Uuid>,
    pub style_id: Option<Uuid>,
    #[validate(length(min = 1, max = 100))]
    pub sku: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub material: Option<String>,
    pub season: Option<String>,
    pub cost_price: Option<Decimal>,
    pub wholesale_price: Option<Decimal>,
    pub retail_price: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    pub page: u64,
    pub limit: u64,
    /// Case-insensitive substring of name or SKU
    pub search: Option<String>,
    pub active: Option<bool>,
}

/// Catalog administration: products, collections, styles and variants.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: Option<EventSender>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db_pool,
            event_sender: None,
        }
    }

    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Create a new product
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(&self, input: CreateProductInput) -> Result<product::Model, ServiceError> {
        input.validate()?;
        let db = &*self.db_pool;

        let existing = Product::find()
            .filter(ProductColumn::Sku.eq(input.sku.as_str()))
            .one(db)
            .await
            .map_err(|e| {
                let msg = format!("Failed to check for existing product: {}", e);
                error!(%msg);
                ServiceError::db_error(msg)
            })?;

        if existing.is_some() {
            let msg = format!("Product with SKU '{}' already exists", input.sku);
            error!(%msg);
            return Err(ServiceError::Conflict(msg));
        }

        let now = Utc::now();
        let created = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(input.sku),
            name: Set(input.name),
            description: Set(input.description),
            category: Set(input.category),
            material: Set(input.material),
            cost_price: Set(input.cost_price),
            wholesale_price: Set(input.wholesale_price),
            retail_price: Set(input.retail_price),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        }
        .insert(db)
        .await
        .map_err(|e| {
            let msg = format!("Failed to create product: {}", e);
            error!(%msg);
            ServiceError::db_error(msg)
        })?;

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender.send(Event::ProductCreated(created.id)).await {
                warn!("Failed to publish product created event: {}", e);
            }
        }

        info!(product_id = %created.id, sku = %created.sku, "Product created successfully");
        Ok(created)
    }

    /// Get a product by ID
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(product_id = %id, error = %e, "Database error when fetching product");
                ServiceError::DatabaseError(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Page through products ordered by name.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: ProductListQuery,
    ) -> Result<PaginatedResponse<product::Model>, ServiceError> {
        let page = query.page.max(1);
        let limit = query.limit.clamp(1, MAX_PAGE_SIZE);

        let mut select = Product::find();
        if let Some(active) = query.active {
            select = select.filter(ProductColumn::IsActive.eq(active));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!(
                "%{}%",
                crate::repositories::variant_repository::escape_like(&search.to_lowercase())
            );
            let lower_like = |col: ProductColumn| {
                Expr::expr(Func::lower(Expr::col((Product, col))))
                    .like(LikeExpr::new(pattern.clone()).escape('\\'))
            };
            select = select.filter(
                Condition::any()
                    .add(lower_like(ProductColumn::Name))
                    .add(lower_like(ProductColumn::Sku)),
            );
        }

        let paginator = select
            .order_by_asc(ProductColumn::Name)
            .order_by_asc(ProductColumn::Sku)
            .paginate(&*self.db_pool, limit);

        let total = paginator.num_items().await.map_err(ServiceError::DatabaseError)?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(ServiceError::DatabaseError)?;

        Ok(PaginatedResponse {
            items,
            total,
            page,
            limit,
            total_pages: total.div_ceil(limit),
        })
    }

    /// Activates or retires a product; retired products drop out of fuzzy matching.
    #[instrument(skip(self))]
    pub async fn set_active(&self, id: Uuid, active: bool) -> Result<product::Model, ServiceError> {
        let existing = self.get_product(id).await?;
        let mut model: product::ActiveModel = existing.into();
        model.is_active = Set(active);
        let updated = model
            .update(&*self.db_pool)
            .await
            .map_err(ServiceError::DatabaseError)?;
        info!(product_id = %id, active, "Product activation changed");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn create_collection(
        &self,
        name: String,
        season: Option<String>,
        year: Option<i32>,
    ) -> Result<collection::Model, ServiceError> {
        if name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Collection name must not be empty".to_string(),
            ));
        }
        collection::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            season: Set(season),
            year: Set(year),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(ServiceError::DatabaseError)
    }

    #[instrument(skip(self))]
    pub async fn create_style(
        &self,
        style_name: String,
        style_code: Option<String>,
        collection_id: Option<Uuid>,
    ) -> Result<style::Model, ServiceError> {
        if style_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Style name must not be empty".to_string(),
            ));
        }
        style::ActiveModel {
            id: Set(Uuid::new_v4()),
            style_name: Set(style_name),
            style_code: Set(style_code),
            collection_id: Set(collection_id),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!("Failed to create style: {}", e);
            ServiceError::DatabaseError(e)
        })
    }

    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_variant(
        &self,
        input: CreateVariantInput,
    ) -> Result<product_variant::Model, ServiceError> {
        input.validate()?;
        product_variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(input.product_id),
            style_id: Set(input.style_id),
            color: Set(input.color),
            size: Set(input.size),
            material: Set(input.material),
            season: Set(input.season),
            cost_price: Set(input.cost_price),
            wholesale_price: Set(input.wholesale_price),
            retail_price: Set(input.retail_price),
            sku: Set(input.sku),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!("Failed to create variant: {}", e);
            ServiceError::DatabaseError(e)
        })
    }
}
