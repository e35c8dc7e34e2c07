use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::{DEFAULT_ACCRUAL_DESCRIPTION, Money, ResultEngine, calendar};

mod cash;
mod closures;
mod inventory;
mod movements;
mod payroll;

pub use cash::{CashEntryCmd, CashEntryFilter};
pub use closures::{CloseStatus, DayClosure};
pub use inventory::{ItemUpdate, LowStock, NewItem, StockFilter};
pub use movements::MovementCmd;
pub use payroll::AccrualFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// How closure accrues payroll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PayrollPolicy {
    /// Flat amount accrued per worker and closed day.
    pub daily_rate: Money,
    pub description: String,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            daily_rate: Money::ZERO,
            description: DEFAULT_ACCRUAL_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Tz,
    payroll: PayrollPolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Business timezone used to resolve "today".
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Current business date in the configured timezone.
    pub fn today(&self) -> NaiveDate {
        calendar::business_date(self.timezone, Utc::now())
    }

    pub fn payroll_policy(&self) -> &PayrollPolicy {
        &self.payroll
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Tz,
    payroll: PayrollPolicy,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            timezone: calendar::DEFAULT_TIMEZONE,
            payroll: PayrollPolicy::default(),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Business timezone (defaults to `America/Guatemala`).
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = timezone;
        self
    }

    /// Payroll accrual policy applied on closure.
    pub fn payroll(mut self, payroll: PayrollPolicy) -> EngineBuilder {
        self.payroll = payroll;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.payroll.daily_rate.cents() < 0 {
            return Err(crate::EngineError::InvalidRequest(
                "daily rate must be >= 0".to_string(),
            ));
        }
        Ok(Engine {
            database: self.database,
            timezone: self.timezone,
            payroll: self.payroll,
        })
    }
}
