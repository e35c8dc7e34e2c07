//! Per-(item, warehouse) stock quantities.
//!
//! A row is created lazily the first time a movement targets a pair and is
//! only ever mutated by [`Engine::apply_movement`](crate::Engine::apply_movement).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    /// Always >= 0.
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stock_levels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub item_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub warehouse_id: Uuid,
    pub quantity: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Items,
    #[sea_orm(
        belongs_to = "super::warehouses::Entity",
        from = "Column::WarehouseId",
        to = "super::warehouses::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Warehouses,
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::warehouses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Warehouses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StockLevel {
    fn from(model: Model) -> Self {
        Self {
            item_id: model.item_id,
            warehouse_id: model.warehouse_id,
            quantity: model.quantity,
        }
    }
}
