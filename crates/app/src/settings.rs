//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and then from `PERLA__*` environment variables
//! (`PERLA__SERVER__PORT=8080`).
use chrono::NaiveTime;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use engine::{DEFAULT_ACCRUAL_DESCRIPTION, EngineError, Money, PayrollPolicy, calendar};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub port: u16,
    pub bind: Option<String>,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Business {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Flat wage accrued per worker and closed day, e.g. `"100.00"`.
    #[serde(default = "default_daily_rate")]
    pub daily_rate: String,
    #[serde(default = "default_accrual_description")]
    pub accrual_description: String,
}

impl Default for Business {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            daily_rate: default_daily_rate(),
            accrual_description: default_accrual_description(),
        }
    }
}

impl Business {
    pub fn timezone(&self) -> Result<Tz, EngineError> {
        calendar::parse_timezone(&self.timezone)
    }

    pub fn payroll(&self) -> Result<PayrollPolicy, EngineError> {
        let daily_rate: Money = self.daily_rate.parse()?;
        Ok(PayrollPolicy {
            daily_rate,
            description: self.accrual_description.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Scheduler {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Local time (`HH:MM`) of the daily automatic closure.
    #[serde(default = "default_close_time")]
    pub close_time: String,
    #[serde(default = "default_backfill_days")]
    pub backfill_days: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            close_time: default_close_time(),
            backfill_days: default_backfill_days(),
        }
    }
}

impl Scheduler {
    pub fn close_time(&self) -> Result<NaiveTime, EngineError> {
        NaiveTime::parse_from_str(self.close_time.trim(), "%H:%M").map_err(|_| {
            EngineError::InvalidRequest(format!("invalid close time: {}", self.close_time))
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Server,
    #[serde(default)]
    pub business: Business,
    #[serde(default)]
    pub scheduler: Scheduler,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(
                Environment::with_prefix("PERLA")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

fn default_level() -> String {
    "info".to_string()
}

fn default_timezone() -> String {
    calendar::DEFAULT_TIMEZONE.name().to_string()
}

fn default_daily_rate() -> String {
    Money::ZERO.to_string()
}

fn default_accrual_description() -> String {
    DEFAULT_ACCRUAL_DESCRIPTION.to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_close_time() -> String {
    "20:00".to_string()
}

fn default_backfill_days() -> u32 {
    3
}
