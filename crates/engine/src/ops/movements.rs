use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use crate::{
    EngineError, MovementKind, ResultEngine, StockLevel, StockMovement, stock_levels,
    stock_movements, util::normalize_optional,
};

use super::{Engine, with_tx};

/// Input for [`Engine::apply_movement`].
#[derive(Clone, Debug)]
pub struct MovementCmd {
    pub item_id: Uuid,
    /// Mandatory; kept optional so a missing value is reported as
    /// `InvalidRequest` instead of failing deserialization upstream.
    pub warehouse_id: Option<Uuid>,
    pub kind: MovementKind,
    pub quantity: i64,
    pub note: Option<String>,
    pub user_id: String,
}

impl Engine {
    /// Applies an IN/OUT movement to the (item, warehouse) stock level and
    /// appends the movement record.
    ///
    /// - the stock level is created at 0 on the first movement of a pair;
    /// - IN succeeds unless the level would leave i64 range
    ///   (`InvalidRequest`);
    /// - OUT fails with `InsufficientStock` when it would go below 0, and
    ///   leaves the level untouched.
    ///
    /// The level update and the movement insert share one DB transaction.
    pub async fn apply_movement(&self, cmd: MovementCmd) -> ResultEngine<StockMovement> {
        let warehouse_id = cmd.warehouse_id.ok_or_else(|| {
            EngineError::InvalidRequest("warehouse_id is required".to_string())
        })?;
        let movement = StockMovement::new(
            cmd.item_id,
            warehouse_id,
            cmd.kind,
            cmd.quantity,
            normalize_optional(cmd.note.as_deref()),
            cmd.user_id,
        )?;

        let level = with_tx!(self, |db_tx| {
            self.require_item(&db_tx, movement.item_id).await?;
            self.require_warehouse(&db_tx, movement.warehouse_id)
                .await?;

            self.ensure_stock_level(&db_tx, movement.item_id, movement.warehouse_id)
                .await?;
            let level = self.shift_stock_level(&db_tx, &movement).await?;
            stock_movements::ActiveModel::from(&movement)
                .insert(&db_tx)
                .await?;
            Ok::<_, EngineError>(level)
        })?;

        tracing::info!(
            movement_id = %movement.id,
            item_id = %movement.item_id,
            warehouse_id = %movement.warehouse_id,
            kind = movement.kind.as_str(),
            quantity = movement.quantity,
            stock = level.quantity,
            "stock movement applied"
        );
        Ok(movement)
    }

    /// Movements of an item, newest first.
    pub async fn movements_for_item(
        &self,
        item_id: Uuid,
        limit: u64,
    ) -> ResultEngine<Vec<StockMovement>> {
        self.require_item(&self.database, item_id).await?;
        let models = stock_movements::Entity::find()
            .filter(stock_movements::Column::ItemId.eq(item_id))
            .order_by_desc(stock_movements::Column::CreatedAt)
            .order_by_desc(stock_movements::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?;
        models.into_iter().map(StockMovement::try_from).collect()
    }

    /// Get-or-create of the stock row: inserts a zero quantity unless the
    /// pair already exists.
    async fn ensure_stock_level(
        &self,
        db_tx: &DatabaseTransaction,
        item_id: Uuid,
        warehouse_id: Uuid,
    ) -> ResultEngine<()> {
        let zero = stock_levels::ActiveModel {
            item_id: ActiveValue::Set(item_id),
            warehouse_id: ActiveValue::Set(warehouse_id),
            quantity: ActiveValue::Set(0),
        };
        stock_levels::Entity::insert(zero)
            .on_conflict(
                OnConflict::columns([
                    stock_levels::Column::ItemId,
                    stock_levels::Column::WarehouseId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;
        Ok(())
    }

    /// Read-modify-write of the quantity as one conditional `UPDATE`, so two
    /// concurrent movements on the same pair never apply against a stale
    /// value.
    async fn shift_stock_level(
        &self,
        db_tx: &DatabaseTransaction,
        movement: &StockMovement,
    ) -> ResultEngine<StockLevel> {
        let quantity = stock_levels::Column::Quantity;
        let update = stock_levels::Entity::update_many()
            .filter(stock_levels::Column::ItemId.eq(movement.item_id))
            .filter(stock_levels::Column::WarehouseId.eq(movement.warehouse_id));

        let result = match movement.kind {
            MovementKind::In => {
                update
                    .col_expr(quantity, Expr::col(quantity).add(movement.quantity))
                    .filter(quantity.lte(i64::MAX - movement.quantity))
                    .exec(db_tx)
                    .await?
            }
            MovementKind::Out => {
                update
                    .col_expr(quantity, Expr::col(quantity).sub(movement.quantity))
                    .filter(quantity.gte(movement.quantity))
                    .exec(db_tx)
                    .await?
            }
        };

        if result.rows_affected == 0 {
            let key = (movement.item_id, movement.warehouse_id);
            let available = stock_levels::Entity::find_by_id(key)
                .one(db_tx)
                .await?
                .map_or(0, |level| level.quantity);
            return Err(match movement.kind {
                MovementKind::In => EngineError::InvalidRequest(format!(
                    "quantity {} on top of {available} exceeds the stock limit",
                    movement.quantity
                )),
                MovementKind::Out => EngineError::InsufficientStock(format!(
                    "requested {}, available {available}",
                    movement.quantity
                )),
            });
        }

        stock_levels::Entity::find_by_id((movement.item_id, movement.warehouse_id))
            .one(db_tx)
            .await?
            .map(StockLevel::from)
            .ok_or_else(|| EngineError::NotFound("stock level".to_string()))
    }
}
