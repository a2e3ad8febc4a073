use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::entities::product::{Column, Entity as Product, Model as ProductModel};
use crate::errors::ServiceError;
use crate::repositories::{BaseRepository, CatalogReader, Repository};

/// sea-orm backed catalog reader
#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

#[async_trait]
impl CatalogReader for ProductRepository {
    async fn find_by_sku(&self, sku: &str) -> Result<Option<ProductModel>, ServiceError> {
        Product::find()
            .filter(Column::Sku.eq(sku))
            .one(self.base.get_db())
            .await
            .map_err(|e| {
                error!("Failed to look up product by SKU {}: {}", sku, e);
                ServiceError::DatabaseError(e)
            })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProductModel>, ServiceError> {
        Product::find_by_id(id)
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }

    async fn list_active(&self) -> Result<Vec<ProductModel>, ServiceError> {
        Product::find()
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Sku)
            .all(self.base.get_db())
            .await
            .map_err(|e| {
                error!("Failed to list active products: {}", e);
                ServiceError::DatabaseError(e)
            })
    }
}
