//! The `[business]` section of the settings shared with `perla`: optional
//! `settings.toml`, then `PERLA__BUSINESS__*` environment variables.
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File, Source};
use engine::{DEFAULT_ACCRUAL_DESCRIPTION, EngineError, Money, PayrollPolicy, calendar};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Business {
    pub timezone: Option<String>,
    pub daily_rate: Option<String>,
    pub accrual_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Settings {
    #[serde(default)]
    business: Business,
}

impl Business {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(File::with_name("settings").required(false))
    }

    #[cfg(test)]
    fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        Self::from_source(File::from_str(toml, FileFormat::Toml))
    }

    fn from_source<S>(file: S) -> Result<Self, ConfigError>
    where
        S: Source + Send + Sync + 'static,
    {
        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("PERLA")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(settings.business)
    }

    pub fn timezone(&self, flag: Option<&str>) -> Result<Tz, EngineError> {
        match flag.or(self.timezone.as_deref()) {
            Some(raw) => calendar::parse_timezone(raw),
            None => Ok(calendar::DEFAULT_TIMEZONE),
        }
    }

    /// Accruals are written once per (date, worker), so a close never falls
    /// back to a made-up rate: it comes from the flag or the settings.
    pub fn payroll(&self, flag: Option<&str>) -> Result<PayrollPolicy, EngineError> {
        let raw = flag.or(self.daily_rate.as_deref()).ok_or_else(|| {
            EngineError::InvalidRequest(
                "no daily rate: set business.daily_rate or pass --daily-rate".to_string(),
            )
        })?;
        let daily_rate: Money = raw.parse()?;
        Ok(PayrollPolicy {
            daily_rate,
            description: self
                .accrual_description
                .clone()
                .unwrap_or_else(|| DEFAULT_ACCRUAL_DESCRIPTION.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_uses_the_configured_rate_and_description() {
        let business = Business::from_toml(
            r#"
            [business]
            daily_rate = "100.00"
            accrual_description = "Jornal"
            "#,
        )
        .unwrap();

        let payroll = business.payroll(None).unwrap();
        assert_eq!(payroll.daily_rate, Money::new(100_00));
        assert_eq!(payroll.description, "Jornal");
    }

    #[test]
    fn flag_overrides_settings() {
        let business = Business::from_toml("[business]\ndaily_rate = \"100.00\"").unwrap();
        let payroll = business.payroll(Some("75,50")).unwrap();
        assert_eq!(payroll.daily_rate, Money::new(75_50));
        assert_eq!(payroll.description, DEFAULT_ACCRUAL_DESCRIPTION);
    }

    #[test]
    fn missing_rate_is_refused() {
        let business = Business::default();
        let err = business.payroll(None).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRequest(_)));
    }

    #[test]
    fn timezone_falls_back_to_business_default() {
        let business = Business::default();
        assert_eq!(business.timezone(None).unwrap(), calendar::DEFAULT_TIMEZONE);

        let business = Business::from_toml("[business]\ntimezone = \"Europe/Rome\"").unwrap();
        assert_eq!(
            business.timezone(None).unwrap(),
            chrono_tz::Europe::Rome
        );
    }
}
