//! Inventory items.
//!
//! An item is the catalogue entry (router, ONU, cable reel...) whose stock is
//! tracked per warehouse in [`stock_levels`](super::stock_levels).

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: Uuid,
    /// Stock keeping unit, unique across the catalogue (stored upper-case).
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    /// Below this total quantity the item shows up in the low-stock report.
    pub min_stock: i64,
    pub created_at: DateTime<Utc>,
}

impl InventoryItem {
    pub fn new(
        sku: String,
        name: String,
        category: Option<String>,
        min_stock: i64,
    ) -> ResultEngine<Self> {
        if min_stock < 0 {
            return Err(EngineError::InvalidRequest(
                "min_stock must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            sku,
            name,
            category,
            min_stock,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub min_stock: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_levels::Entity")]
    StockLevels,
    #[sea_orm(has_many = "super::stock_movements::Entity")]
    StockMovements,
}

impl Related<super::stock_levels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLevels.def()
    }
}

impl Related<super::stock_movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&InventoryItem> for ActiveModel {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: ActiveValue::Set(item.id),
            sku: ActiveValue::Set(item.sku.clone()),
            name: ActiveValue::Set(item.name.clone()),
            category: ActiveValue::Set(item.category.clone()),
            min_stock: ActiveValue::Set(item.min_stock),
            created_at: ActiveValue::Set(item.created_at),
        }
    }
}

impl From<Model> for InventoryItem {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            sku: model.sku,
            name: model.name,
            category: model.category,
            min_stock: model.min_stock,
            created_at: model.created_at,
        }
    }
}
