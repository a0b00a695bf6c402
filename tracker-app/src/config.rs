//! Startup configuration, read from the process environment (and a `.env` file when present).
use error_stack::{Report, ResultExt};
use std::str::FromStr;

const PORT: &str = "PORT";
const DATABASE_URL: &str = "DATABASE_URL";
const DATABASE_NAME: &str = "DATABASE_NAME";
const METRICS_ENABLED: &str = "METRICS_ENABLED";

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_DATABASE_NAME: &str = "defect_tracker";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is missing")]
    Missing(&'static str),
    #[error("{0} has an invalid value")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub database_name: String,
    pub metrics_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Report<ConfigError>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Report<ConfigError>> {
        let database_url = lookup(DATABASE_URL)
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL))?;

        Ok(Self {
            port: parse_or(&lookup, PORT, DEFAULT_PORT)?,
            database_url,
            database_name: lookup(DATABASE_NAME)
                .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            metrics_enabled: parse_or(&lookup, METRICS_ENABLED, true)?,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, Report<ConfigError>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .change_context(ConfigError::Invalid(key))
            .attach_with(|| format!("value: '{value}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, Report<ConfigError>> {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_the_database_url_is_set() {
        let config = config_from(&[(DATABASE_URL, "mongodb://localhost:27017")]).unwrap();

        assert_eq!(
            AppConfig {
                port: 5000,
                database_url: "mongodb://localhost:27017".to_string(),
                database_name: "defect_tracker".to_string(),
                metrics_enabled: true,
            },
            config
        );
    }

    #[test]
    fn every_value_can_be_overridden() {
        let config = config_from(&[
            (DATABASE_URL, "mongodb://db:27017"),
            (PORT, "8080"),
            (DATABASE_NAME, "tracker_test"),
            (METRICS_ENABLED, "false"),
        ])
        .unwrap();

        assert_eq!(8080, config.port);
        assert_eq!("tracker_test", config.database_name);
        assert!(!config.metrics_enabled);
    }

    #[rstest]
    #[case::absent(&[])]
    #[case::blank(&[(DATABASE_URL, "  ")])]
    fn database_url_is_required(#[case] vars: &[(&str, &str)]) {
        let err = config_from(vars).unwrap_err();

        assert!(matches!(
            err.current_context(),
            ConfigError::Missing(DATABASE_URL)
        ));
    }

    #[rstest]
    #[case::port(PORT, "not-a-port")]
    #[case::port_out_of_range(PORT, "70000")]
    #[case::metrics_flag(METRICS_ENABLED, "sometimes")]
    fn unparsable_values_are_rejected(#[case] key: &'static str, #[case] value: &str) {
        let err = config_from(&[(DATABASE_URL, "mongodb://localhost"), (key, value)]).unwrap_err();

        assert!(matches!(err.current_context(), ConfigError::Invalid(k) if *k == key));
    }
}
