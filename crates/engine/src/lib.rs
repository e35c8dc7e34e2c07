//! Back-office core for InternetPerla.
//!
//! The engine owns the inventory stock ledger, the cash ledger with its
//! daily closure and the payroll accruals produced by closure. It keeps no
//! state between calls: every operation re-reads the database.

pub use calendar::DEFAULT_TIMEZONE;
pub use cash_entries::{CashEntry, CashEntryKind};
pub use cash_summaries::{CashDailySummary, DailyTotals};
pub use error::EngineError;
pub use items::InventoryItem;
pub use money::Money;
pub use ops::{
    AccrualFilter, CashEntryCmd, CashEntryFilter, CloseStatus, DayClosure, Engine, EngineBuilder,
    ItemUpdate, LowStock, MovementCmd, NewItem, PayrollPolicy, StockFilter,
};
pub use payroll_accruals::{AccrualOutcome, DEFAULT_ACCRUAL_DESCRIPTION, PayrollAccrual};
pub use stock_levels::StockLevel;
pub use stock_movements::{MovementKind, StockMovement};
pub use user_closures::UserClosure;
pub use users::Role;
pub use warehouses::Warehouse;

pub mod calendar;
mod cash_entries;
mod cash_summaries;
mod error;
mod items;
mod money;
mod ops;
mod payroll_accruals;
mod stock_levels;
mod stock_movements;
mod user_closures;
pub mod users;
mod util;
mod warehouses;

type ResultEngine<T> = Result<T, EngineError>;

/// Username recorded as `closed_by` when the scheduler closes a day.
pub const SYSTEM_USER: &str = "system";
