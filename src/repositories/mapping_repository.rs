use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::entities::product_mapping::{
    ActiveModel as MappingActiveModel, Column, Entity as ProductMapping, Model as MappingModel,
};
use crate::errors::ServiceError;
use crate::repositories::{BaseRepository, MappingStore, NewMapping, Repository};

/// sea-orm backed mapping store with upsert on `(platform, external_id)`
#[derive(Debug, Clone)]
pub struct MappingRepository {
    base: BaseRepository,
}

impl MappingRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Every mapping recorded for one product, newest first
    pub async fn find_by_product(&self, product_id: Uuid) -> Result<Vec<MappingModel>, ServiceError> {
        ProductMapping::find()
            .filter(Column::ProductId.eq(product_id))
            .order_by_desc(Column::LastSynced)
            .all(self.base.get_db())
            .await
            .map_err(ServiceError::DatabaseError)
    }
}

#[async_trait]
impl MappingStore for MappingRepository {
    async fn find_by_platform_and_external_id(
        &self,
        platform: &str,
        external_id: &str,
    ) -> Result<Option<MappingModel>, ServiceError> {
        ProductMapping::find()
            .filter(Column::Platform.eq(platform))
            .filter(Column::ExternalId.eq(external_id))
            .one(self.base.get_db())
            .await
            .map_err(|e| {
                error!(
                    "Failed to look up mapping {}/{}: {}",
                    platform, external_id, e
                );
                ServiceError::DatabaseError(e)
            })
    }

    async fn save(&self, mapping: NewMapping) -> Result<MappingModel, ServiceError> {
        let db = self.base.get_db();
        let active = MappingActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(mapping.product_id),
            platform: Set(mapping.platform.clone()),
            external_id: Set(mapping.external_id.clone()),
            external_name: Set(mapping.external_name),
            variant_info: Set(mapping.sku.map(|sku| json!({ "sku": sku }).to_string())),
            last_synced: Set(Utc::now()),
        };

        // NULL external ids never conflict, so there is nothing to upsert against
        let Some(external_id) = mapping.external_id else {
            return active.insert(db).await.map_err(|e| {
                error!("Failed to insert mapping for {}: {}", mapping.platform, e);
                ServiceError::DatabaseError(e)
            });
        };

        ProductMapping::insert(active)
            .on_conflict(
                OnConflict::columns([Column::Platform, Column::ExternalId])
                    .update_columns([
                        Column::ProductId,
                        Column::ExternalName,
                        Column::VariantInfo,
                        Column::LastSynced,
                    ])
                    .to_owned(),
            )
            .exec(db)
            .await
            .map_err(|e| {
                error!(
                    "Failed to upsert mapping {}/{}: {}",
                    mapping.platform, external_id, e
                );
                ServiceError::DatabaseError(e)
            })?;

        debug!(platform = %mapping.platform, external_id = %external_id, "mapping saved");

        self.find_by_platform_and_external_id(&mapping.platform, &external_id)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError(format!(
                    "Mapping {}/{} vanished after upsert",
                    mapping.platform, external_id
                ))
            })
    }
}
