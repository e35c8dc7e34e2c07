use std::collections::HashMap;

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, InventoryItem, ResultEngine, StockLevel, Warehouse, items, stock_levels,
    stock_movements,
    util::{name_key, normalize_optional, normalize_required, normalize_sku},
    warehouses,
};

use super::{Engine, with_tx};

/// Input for [`Engine::new_item`].
#[derive(Clone, Debug)]
pub struct NewItem {
    pub sku: String,
    pub name: String,
    pub category: Option<String>,
    pub min_stock: i64,
}

/// Partial update of an item. `None` leaves the field untouched; a blank
/// category clears it.
#[derive(Clone, Debug, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub min_stock: Option<i64>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StockFilter {
    pub item_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
}

/// An item whose total quantity across warehouses is below its minimum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LowStock {
    pub item: InventoryItem,
    pub quantity: i64,
}

impl Engine {
    /// Adds a catalogue item. The SKU must be unique.
    pub async fn new_item(&self, input: NewItem) -> ResultEngine<InventoryItem> {
        let sku = normalize_sku(&input.sku)?;
        let name = normalize_required(&input.name, "item name")?;
        let item = InventoryItem::new(
            sku,
            name,
            normalize_optional(input.category.as_deref()),
            input.min_stock,
        )?;

        with_tx!(self, |db_tx| {
            let exists = items::Entity::find()
                .filter(items::Column::Sku.eq(item.sku.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "sku {} already present",
                    item.sku
                )));
            }

            items::ActiveModel::from(&item).insert(&db_tx).await?;
            tracing::debug!(item_id = %item.id, sku = %item.sku, "inventory item created");
            Ok(item)
        })
    }

    /// Updates name, category and/or minimum stock of an item.
    pub async fn update_item(
        &self,
        item_id: Uuid,
        update: ItemUpdate,
    ) -> ResultEngine<InventoryItem> {
        let name = update
            .name
            .as_deref()
            .map(|name| normalize_required(name, "item name"))
            .transpose()?;
        if let Some(min_stock) = update.min_stock
            && min_stock < 0
        {
            return Err(EngineError::InvalidRequest(
                "min_stock must be >= 0".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let model = self.require_item(&db_tx, item_id).await?;
            let mut active: items::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(category) = update.category.as_deref() {
                active.category = ActiveValue::Set(normalize_optional(Some(category)));
            }
            if let Some(min_stock) = update.min_stock {
                active.min_stock = ActiveValue::Set(min_stock);
            }
            let model = active.update(&db_tx).await?;
            Ok(InventoryItem::from(model))
        })
    }

    /// Return an item snapshot from DB.
    pub async fn item(&self, item_id: Uuid) -> ResultEngine<InventoryItem> {
        items::Entity::find_by_id(item_id)
            .one(&self.database)
            .await?
            .map(InventoryItem::from)
            .ok_or_else(|| EngineError::NotFound(format!("item {item_id}")))
    }

    /// Every catalogue item, ordered by SKU.
    pub async fn items(&self) -> ResultEngine<Vec<InventoryItem>> {
        let models = items::Entity::find()
            .order_by_asc(items::Column::Sku)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(InventoryItem::from).collect())
    }

    /// Deletes an item.
    ///
    /// Items with stock levels or movements are kept so the audit trail never
    /// points to a missing row: the call fails with `Conflict`.
    pub async fn delete_item(&self, item_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_item(&db_tx, item_id).await?;

            let has_levels = stock_levels::Entity::find()
                .filter(stock_levels::Column::ItemId.eq(item_id))
                .one(&db_tx)
                .await?
                .is_some();
            let has_movements = stock_movements::Entity::find()
                .filter(stock_movements::Column::ItemId.eq(item_id))
                .one(&db_tx)
                .await?
                .is_some();
            if has_levels || has_movements {
                return Err(EngineError::Conflict(format!(
                    "item {item_id} has stock history"
                )));
            }

            items::Entity::delete_by_id(item_id).exec(&db_tx).await?;
            Ok(())
        })
    }

    /// Adds a warehouse. Names are unique, case-insensitively.
    pub async fn new_warehouse(
        &self,
        name: &str,
        location: Option<&str>,
    ) -> ResultEngine<Warehouse> {
        let name = normalize_required(name, "warehouse name")?;
        let key = name_key(&name);
        let warehouse = Warehouse::new(name, normalize_optional(location));

        with_tx!(self, |db_tx| {
            let exists = warehouses::Entity::find()
                .filter(warehouses::Column::NameNorm.eq(key.clone()))
                .one(&db_tx)
                .await?
                .is_some();
            if exists {
                return Err(EngineError::Conflict(format!(
                    "warehouse {} already present",
                    warehouse.name
                )));
            }

            warehouses::ActiveModel::from_warehouse(&warehouse, key)
                .insert(&db_tx)
                .await?;
            Ok(warehouse)
        })
    }

    /// Every warehouse, ordered by name.
    pub async fn warehouses(&self) -> ResultEngine<Vec<Warehouse>> {
        let models = warehouses::Entity::find()
            .order_by_asc(warehouses::Column::NameNorm)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Warehouse::from).collect())
    }

    /// Deletes a warehouse that never held stock.
    pub async fn delete_warehouse(&self, warehouse_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_warehouse(&db_tx, warehouse_id).await?;

            let has_levels = stock_levels::Entity::find()
                .filter(stock_levels::Column::WarehouseId.eq(warehouse_id))
                .one(&db_tx)
                .await?
                .is_some();
            let has_movements = stock_movements::Entity::find()
                .filter(stock_movements::Column::WarehouseId.eq(warehouse_id))
                .one(&db_tx)
                .await?
                .is_some();
            if has_levels || has_movements {
                return Err(EngineError::Conflict(format!(
                    "warehouse {warehouse_id} has stock history"
                )));
            }

            warehouses::Entity::delete_by_id(warehouse_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    /// Stock levels, optionally restricted to one item and/or one warehouse.
    pub async fn stock_levels(&self, filter: StockFilter) -> ResultEngine<Vec<StockLevel>> {
        let mut query = stock_levels::Entity::find();
        if let Some(item_id) = filter.item_id {
            query = query.filter(stock_levels::Column::ItemId.eq(item_id));
        }
        if let Some(warehouse_id) = filter.warehouse_id {
            query = query.filter(stock_levels::Column::WarehouseId.eq(warehouse_id));
        }
        let models = query
            .order_by_asc(stock_levels::Column::ItemId)
            .order_by_asc(stock_levels::Column::WarehouseId)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(StockLevel::from).collect())
    }

    /// Quantity of one (item, warehouse) pair; 0 when no movement touched it yet.
    pub async fn stock_quantity(&self, item_id: Uuid, warehouse_id: Uuid) -> ResultEngine<i64> {
        let level = stock_levels::Entity::find_by_id((item_id, warehouse_id))
            .one(&self.database)
            .await?;
        Ok(level.map_or(0, |level| level.quantity))
    }

    /// Items whose quantity summed over every warehouse is below `min_stock`.
    pub async fn low_stock(&self) -> ResultEngine<Vec<LowStock>> {
        let levels = stock_levels::Entity::find().all(&self.database).await?;
        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for level in levels {
            let total = totals.entry(level.item_id).or_default();
            *total = total.saturating_add(level.quantity);
        }

        let items = self.items().await?;
        Ok(items
            .into_iter()
            .filter_map(|item| {
                let quantity = totals.get(&item.id).copied().unwrap_or(0);
                (quantity < item.min_stock).then_some(LowStock { item, quantity })
            })
            .collect())
    }

    pub(super) async fn require_item<C: ConnectionTrait>(
        &self,
        db: &C,
        item_id: Uuid,
    ) -> ResultEngine<items::Model> {
        items::Entity::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("item {item_id}")))
    }

    pub(super) async fn require_warehouse<C: ConnectionTrait>(
        &self,
        db: &C,
        warehouse_id: Uuid,
    ) -> ResultEngine<warehouses::Model> {
        warehouses::Entity::find_by_id(warehouse_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("warehouse {warehouse_id}")))
    }
}
