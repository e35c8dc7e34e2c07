//! JSON bodies exchanged with the HTTP API.
//!
//! Dates travel as `YYYY-MM-DD`. Amounts travel as decimal strings with two
//! fractional digits (`"150.00"`); responses also carry the value in cents.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod inventory {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub sku: String,
        pub name: String,
        pub category: Option<String>,
        #[serde(default)]
        pub min_stock: i64,
    }

    /// Absent fields are left untouched; an empty category clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub name: Option<String>,
        pub category: Option<String>,
        pub min_stock: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub sku: String,
        pub name: String,
        pub category: Option<String>,
        pub min_stock: i64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LowStockView {
        pub item: ItemView,
        /// Total across every warehouse.
        pub quantity: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WarehouseNew {
        pub name: String,
        pub location: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WarehouseView {
        pub id: Uuid,
        pub name: String,
        pub location: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct StockQuery {
        pub item_id: Option<Uuid>,
        pub warehouse_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct StockLevelView {
        pub item_id: Uuid,
        pub warehouse_id: Uuid,
        pub quantity: i64,
    }
}

pub mod movement {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum MovementKind {
        In,
        Out,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementNew {
        pub item_id: Uuid,
        /// Mandatory; a missing value is answered with 422.
        pub warehouse_id: Option<Uuid>,
        #[serde(rename = "type")]
        pub kind: MovementKind,
        pub quantity: i64,
        pub note: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MovementList {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MovementView {
        pub id: Uuid,
        pub item_id: Uuid,
        pub warehouse_id: Uuid,
        #[serde(rename = "type")]
        pub kind: MovementKind,
        pub quantity: i64,
        pub note: Option<String>,
        pub created_by: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod cash {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum CashEntryKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashEntryNew {
        /// Defaults to today in the business timezone.
        pub date: Option<NaiveDate>,
        #[serde(rename = "type")]
        pub kind: CashEntryKind,
        pub description: String,
        /// Decimal string, `.` or `,` as separator.
        pub amount: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CashEntryView {
        pub id: Uuid,
        pub date: NaiveDate,
        #[serde(rename = "type")]
        pub kind: CashEntryKind,
        pub description: String,
        pub amount: String,
        pub amount_minor: i64,
        pub created_by: String,
        pub created_by_name: String,
        pub created_at: DateTime<Utc>,
    }

    /// Inclusive range; both ends default to today.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CashRange {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub created_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DailyTotalsView {
        pub date: NaiveDate,
        pub incomes: String,
        pub expenses: String,
        pub balance: String,
        pub balance_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CloseDay {
        /// Defaults to today in the business timezone.
        pub date: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub incomes: String,
        pub expenses: String,
        pub balance: String,
        pub balance_minor: i64,
        pub closed_by: String,
        pub closed_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserClosureView {
        pub user_id: String,
        pub user_name: String,
        pub closed_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ClosureResponse {
        /// `closed` on the first closure of the date, `reclosed` afterwards.
        pub status: String,
        pub summary: SummaryView,
        pub workers: Vec<UserClosureView>,
        pub accrued: Vec<super::payroll::AccrualView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryDetail {
        pub summary: SummaryView,
        pub workers: Vec<UserClosureView>,
    }
}

pub mod payroll {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AccrualList {
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
        pub user_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccrualView {
        pub id: Uuid,
        pub date: NaiveDate,
        pub user_id: String,
        pub user_name: String,
        pub amount: String,
        pub amount_minor: i64,
        pub description: String,
        pub cash_closure_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccrualListResponse {
        pub accruals: Vec<AccrualView>,
        pub total: String,
        pub total_minor: i64,
    }
}
