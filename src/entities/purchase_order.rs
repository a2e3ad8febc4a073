use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a wholesale purchase order.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PurchaseOrderStatus {
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "processed")]
    Processed,
    #[sea_orm(string_value = "invoiced")]
    Invoiced,
    #[sea_orm(string_value = "shipped")]
    Shipped,
}

impl PurchaseOrderStatus {
    fn rank(self) -> u8 {
        match self {
            Self::Received => 0,
            Self::Processed => 1,
            Self::Invoiced => 2,
            Self::Shipped => 3,
        }
    }

    /// Orders only move forward; staying put is allowed.
    pub fn can_transition_to(self, next: PurchaseOrderStatus) -> bool {
        next.rank() >= self.rank()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub po_number: String,
    pub customer_name: Option<String>,
    /// Source platform, e.g. `nuorder`
    pub platform: Option<String>,
    pub collection_name: Option<String>,
    /// Number of line items
    pub total_skus: i32,
    /// Sum of line item quantities
    pub total_units: i32,
    pub status: PurchaseOrderStatus,
    pub order_date: DateTime<Utc>,
    pub required_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_order_item::Entity")]
    Items,
}

impl Related<super::purchase_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_only_moves_forward() {
        use PurchaseOrderStatus::*;
        assert!(Received.can_transition_to(Processed));
        assert!(Processed.can_transition_to(Shipped));
        assert!(Invoiced.can_transition_to(Invoiced));
        assert!(!Shipped.can_transition_to(Received));
        assert!(!Invoiced.can_transition_to(Processed));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            PurchaseOrderStatus::from_str("Invoiced").unwrap(),
            PurchaseOrderStatus::Invoiced
        );
        assert_eq!(PurchaseOrderStatus::Shipped.to_string(), "shipped");
        assert!(PurchaseOrderStatus::from_str("lost").is_err());
    }
}
