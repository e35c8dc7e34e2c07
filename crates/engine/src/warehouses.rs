//! Warehouses (bodegas) holding stock.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
}

impl Warehouse {
    pub fn new(name: String, location: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            location,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "warehouses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub name_norm: String,
    pub location: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_levels::Entity")]
    StockLevels,
}

impl Related<super::stock_levels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockLevels.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Warehouse {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            location: model.location,
        }
    }
}

impl ActiveModel {
    pub(crate) fn from_warehouse(warehouse: &Warehouse, name_norm: String) -> Self {
        Self {
            id: ActiveValue::Set(warehouse.id),
            name: ActiveValue::Set(warehouse.name.clone()),
            name_norm: ActiveValue::Set(name_norm),
            location: ActiveValue::Set(warehouse.location.clone()),
        }
    }
}
