//! Stock movement primitives.
//!
//! A `StockMovement` is the immutable audit record of one IN/OUT adjustment
//! applied to a stock level. Rows are never updated nor deleted.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementKind {
    In,
    Out,
}

impl MovementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl TryFrom<&str> for MovementKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(EngineError::InvalidRequest(format!(
                "invalid movement kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub kind: MovementKind,
    pub quantity: i64,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    pub fn new(
        item_id: Uuid,
        warehouse_id: Uuid,
        kind: MovementKind,
        quantity: i64,
        note: Option<String>,
        created_by: String,
    ) -> ResultEngine<Self> {
        if quantity <= 0 {
            return Err(EngineError::InvalidRequest(
                "quantity must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            item_id,
            warehouse_id,
            kind,
            quantity,
            note,
            created_by,
            created_at: Utc::now(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_id: Uuid,
    pub warehouse_id: Uuid,
    pub kind: String,
    pub quantity: i64,
    pub note: Option<String>,
    pub created_by: String,
    pub created_at: DateTimeUtc,
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

impl From<&StockMovement> for ActiveModel {
    fn from(movement: &StockMovement) -> Self {
        Self {
            id: ActiveValue::Set(movement.id),
            item_id: ActiveValue::Set(movement.item_id),
            warehouse_id: ActiveValue::Set(movement.warehouse_id),
            kind: ActiveValue::Set(movement.kind.as_str().to_string()),
            quantity: ActiveValue::Set(movement.quantity),
            note: ActiveValue::Set(movement.note.clone()),
            created_by: ActiveValue::Set(movement.created_by.clone()),
            created_at: ActiveValue::Set(movement.created_at),
        }
    }
}

impl TryFrom<Model> for StockMovement {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            item_id: model.item_id,
            warehouse_id: model.warehouse_id,
            kind: MovementKind::try_from(model.kind.as_str())?,
            quantity: model.quantity,
            note: model.note,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
