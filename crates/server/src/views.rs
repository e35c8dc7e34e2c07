//! Mapping between engine values and the JSON bodies of `api_types`.

use api_types::{
    cash::{CashEntryView, DailyTotalsView, SummaryView, UserClosureView},
    inventory::{ItemView, LowStockView, StockLevelView, WarehouseView},
    movement::MovementView,
    payroll::AccrualView,
};
use engine::{
    CashDailySummary, CashEntry, DailyTotals, InventoryItem, LowStock, PayrollAccrual, StockLevel,
    StockMovement, UserClosure, Warehouse,
};

pub(crate) fn movement_kind(kind: api_types::movement::MovementKind) -> engine::MovementKind {
    match kind {
        api_types::movement::MovementKind::In => engine::MovementKind::In,
        api_types::movement::MovementKind::Out => engine::MovementKind::Out,
    }
}

pub(crate) fn cash_kind(kind: api_types::cash::CashEntryKind) -> engine::CashEntryKind {
    match kind {
        api_types::cash::CashEntryKind::Income => engine::CashEntryKind::Income,
        api_types::cash::CashEntryKind::Expense => engine::CashEntryKind::Expense,
    }
}

pub(crate) fn item(item: InventoryItem) -> ItemView {
    ItemView {
        id: item.id,
        sku: item.sku,
        name: item.name,
        category: item.category,
        min_stock: item.min_stock,
        created_at: item.created_at,
    }
}

pub(crate) fn low_stock(low: LowStock) -> LowStockView {
    LowStockView {
        item: item(low.item),
        quantity: low.quantity,
    }
}

pub(crate) fn warehouse(warehouse: Warehouse) -> WarehouseView {
    WarehouseView {
        id: warehouse.id,
        name: warehouse.name,
        location: warehouse.location,
    }
}

pub(crate) fn stock_level(level: StockLevel) -> StockLevelView {
    StockLevelView {
        item_id: level.item_id,
        warehouse_id: level.warehouse_id,
        quantity: level.quantity,
    }
}

pub(crate) fn movement(movement: StockMovement) -> MovementView {
    MovementView {
        id: movement.id,
        item_id: movement.item_id,
        warehouse_id: movement.warehouse_id,
        kind: match movement.kind {
            engine::MovementKind::In => api_types::movement::MovementKind::In,
            engine::MovementKind::Out => api_types::movement::MovementKind::Out,
        },
        quantity: movement.quantity,
        note: movement.note,
        created_by: movement.created_by,
        created_at: movement.created_at,
    }
}

pub(crate) fn cash_entry(entry: CashEntry) -> CashEntryView {
    CashEntryView {
        id: entry.id,
        date: entry.business_date,
        kind: match entry.kind {
            engine::CashEntryKind::Income => api_types::cash::CashEntryKind::Income,
            engine::CashEntryKind::Expense => api_types::cash::CashEntryKind::Expense,
        },
        description: entry.description,
        amount: entry.amount.to_string(),
        amount_minor: entry.amount.cents(),
        created_by: entry.created_by,
        created_by_name: entry.created_by_name,
        created_at: entry.created_at,
    }
}

pub(crate) fn totals(totals: DailyTotals) -> DailyTotalsView {
    DailyTotalsView {
        date: totals.date,
        incomes: totals.incomes.to_string(),
        expenses: totals.expenses.to_string(),
        balance: totals.balance.to_string(),
        balance_minor: totals.balance.cents(),
    }
}

pub(crate) fn summary(summary: CashDailySummary) -> SummaryView {
    SummaryView {
        id: summary.id,
        date: summary.business_date,
        incomes: summary.incomes.to_string(),
        expenses: summary.expenses.to_string(),
        balance: summary.balance.to_string(),
        balance_minor: summary.balance.cents(),
        closed_by: summary.closed_by,
        closed_at: summary.closed_at,
    }
}

pub(crate) fn user_closure(closure: UserClosure) -> UserClosureView {
    UserClosureView {
        user_id: closure.user_id,
        user_name: closure.user_name,
        closed_at: closure.closed_at,
    }
}

pub(crate) fn accrual(accrual: PayrollAccrual) -> AccrualView {
    AccrualView {
        id: accrual.id,
        date: accrual.business_date,
        user_id: accrual.user_id,
        user_name: accrual.user_name,
        amount: accrual.amount.to_string(),
        amount_minor: accrual.amount.cents(),
        description: accrual.description,
        cash_closure_id: accrual.cash_closure_id,
    }
}
