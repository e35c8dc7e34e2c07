//! Initial schema for the InternetPerla back office.
//!
//! - `users`: login accounts, also the worker registry for payroll
//! - `inventory_items`, `warehouses`: catalogue
//! - `stock_levels`: current quantity per (item, warehouse)
//! - `stock_movements`: append-only IN/OUT ledger
//! - `cash_entries`: incomes and expenses per business date
//! - `cash_daily_summaries`: one closure per business date
//! - `cash_user_closures`: workers folded into a closure
//! - `payroll_accruals`: one daily wage per (date, worker)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
    DisplayName,
    Role,
    Active,
}

#[derive(Iden)]
enum InventoryItems {
    Table,
    Id,
    Sku,
    Name,
    Category,
    MinStock,
    CreatedAt,
}

#[derive(Iden)]
enum Warehouses {
    Table,
    Id,
    Name,
    NameNorm,
    Location,
}

#[derive(Iden)]
enum StockLevels {
    Table,
    ItemId,
    WarehouseId,
    Quantity,
}

#[derive(Iden)]
enum StockMovements {
    Table,
    Id,
    ItemId,
    WarehouseId,
    Kind,
    Quantity,
    Note,
    CreatedBy,
    CreatedAt,
}

#[derive(Iden)]
enum CashEntries {
    Table,
    Id,
    BusinessDate,
    Kind,
    Description,
    AmountMinor,
    CreatedBy,
    CreatedByName,
    CreatedAt,
}

#[derive(Iden)]
enum CashDailySummaries {
    Table,
    Id,
    BusinessDate,
    IncomesMinor,
    ExpensesMinor,
    BalanceMinor,
    ClosedBy,
    ClosedAt,
}

#[derive(Iden)]
enum CashUserClosures {
    Table,
    BusinessDate,
    UserId,
    UserName,
    CashClosureId,
    ClosedAt,
}

#[derive(Iden)]
enum PayrollAccruals {
    Table,
    Id,
    BusinessDate,
    UserId,
    UserName,
    AmountMinor,
    Description,
    CashClosureId,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(
                        ColumnDef::new(Users::DisplayName)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Users::Role)
                            .string()
                            .not_null()
                            .default("worker"),
                    )
                    .col(
                        ColumnDef::new(Users::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Catalogue
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(InventoryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryItems::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryItems::Sku).string().not_null())
                    .col(ColumnDef::new(InventoryItems::Name).string().not_null())
                    .col(ColumnDef::new(InventoryItems::Category).string())
                    .col(
                        ColumnDef::new(InventoryItems::MinStock)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(InventoryItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_items-sku-unique")
                    .table(InventoryItems::Table)
                    .col(InventoryItems::Sku)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Warehouses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Warehouses::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Warehouses::Name).string().not_null())
                    .col(ColumnDef::new(Warehouses::NameNorm).string().not_null())
                    .col(ColumnDef::new(Warehouses::Location).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-warehouses-name_norm-unique")
                    .table(Warehouses::Table)
                    .col(Warehouses::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Stock ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(StockLevels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StockLevels::ItemId).blob().not_null())
                    .col(ColumnDef::new(StockLevels::WarehouseId).blob().not_null())
                    .col(
                        ColumnDef::new(StockLevels::Quantity)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(StockLevels::ItemId)
                            .col(StockLevels::WarehouseId),
                    )
                    .check(Expr::col(StockLevels::Quantity).gte(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_levels-item_id")
                            .from(StockLevels::Table, StockLevels::ItemId)
                            .to(InventoryItems::Table, InventoryItems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_levels-warehouse_id")
                            .from(StockLevels::Table, StockLevels::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StockMovements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StockMovements::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StockMovements::ItemId).blob().not_null())
                    .col(
                        ColumnDef::new(StockMovements::WarehouseId)
                            .blob()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::Kind).string().not_null())
                    .col(
                        ColumnDef::new(StockMovements::Quantity)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StockMovements::Note).string())
                    .col(ColumnDef::new(StockMovements::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(StockMovements::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .check(Expr::col(StockMovements::Quantity).gt(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_movements-item_id")
                            .from(StockMovements::Table, StockMovements::ItemId)
                            .to(InventoryItems::Table, InventoryItems::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-stock_movements-warehouse_id")
                            .from(StockMovements::Table, StockMovements::WarehouseId)
                            .to(Warehouses::Table, Warehouses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-stock_movements-item_id-created_at")
                    .table(StockMovements::Table)
                    .col(StockMovements::ItemId)
                    .col(StockMovements::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Cash ledger
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(CashEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashEntries::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CashEntries::BusinessDate).date().not_null())
                    .col(ColumnDef::new(CashEntries::Kind).string().not_null())
                    .col(ColumnDef::new(CashEntries::Description).string().not_null())
                    .col(
                        ColumnDef::new(CashEntries::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashEntries::CreatedBy).string().not_null())
                    .col(
                        ColumnDef::new(CashEntries::CreatedByName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashEntries::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .check(Expr::col(CashEntries::AmountMinor).gt(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_entries-business_date")
                    .table(CashEntries::Table)
                    .col(CashEntries::BusinessDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CashDailySummaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashDailySummaries::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashDailySummaries::BusinessDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashDailySummaries::IncomesMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashDailySummaries::ExpensesMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashDailySummaries::BalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashDailySummaries::ClosedBy)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashDailySummaries::ClosedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_daily_summaries-business_date-unique")
                    .table(CashDailySummaries::Table)
                    .col(CashDailySummaries::BusinessDate)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CashUserClosures::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashUserClosures::BusinessDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashUserClosures::UserId).string().not_null())
                    .col(
                        ColumnDef::new(CashUserClosures::UserName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashUserClosures::CashClosureId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CashUserClosures::ClosedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(CashUserClosures::BusinessDate)
                            .col(CashUserClosures::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-cash_user_closures-cash_closure_id")
                            .from(CashUserClosures::Table, CashUserClosures::CashClosureId)
                            .to(CashDailySummaries::Table, CashDailySummaries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Payroll
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PayrollAccruals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PayrollAccruals::Id)
                            .blob()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PayrollAccruals::BusinessDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PayrollAccruals::UserId).string().not_null())
                    .col(ColumnDef::new(PayrollAccruals::UserName).string().not_null())
                    .col(
                        ColumnDef::new(PayrollAccruals::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayrollAccruals::Description)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayrollAccruals::CashClosureId)
                            .blob()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PayrollAccruals::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payroll_accruals-cash_closure_id")
                            .from(PayrollAccruals::Table, PayrollAccruals::CashClosureId)
                            .to(CashDailySummaries::Table, CashDailySummaries::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payroll_accruals-business_date-user_id-unique")
                    .table(PayrollAccruals::Table)
                    .col(PayrollAccruals::BusinessDate)
                    .col(PayrollAccruals::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(PayrollAccruals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashUserClosures::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashDailySummaries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockMovements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StockLevels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Warehouses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
