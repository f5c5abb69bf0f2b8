use thiserror::Error;

pub const ENV_LOG_FORMAT: &str = "SITEGATE_LOG_FORMAT";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown log format '{0}' (expected 'json' or 'pretty')")]
    UnknownLogFormat(String),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line, with timestamps.
    #[default]
    Json,
    /// Human-readable multi-line output for local development.
    Pretty,
}

impl core::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            other => Err(ConfigError::UnknownLogFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is unset.
    pub default_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Json,
            default_filter: "info".to_string(),
        }
    }
}

impl ObservabilityConfig {
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_default_filter(mut self, filter: impl Into<String>) -> Self {
        self.default_filter = filter.into();
        self
    }

    /// Read `SITEGATE_LOG_FORMAT`. Unset means the default format.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::default();
        match lookup(ENV_LOG_FORMAT) {
            Some(raw) => Ok(config.with_format(raw.parse()?)),
            None => Ok(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_formats_case_insensitively() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" pretty ".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
        assert_eq!(
            "xml".parse::<LogFormat>().unwrap_err(),
            ConfigError::UnknownLogFormat("xml".to_string())
        );
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = ObservabilityConfig::default()
            .with_format(LogFormat::Pretty)
            .with_default_filter("sitegate_auth=debug");
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.default_filter, "sitegate_auth=debug");
    }

    #[test]
    fn lookup_reports_unknown_format() {
        let unset = ObservabilityConfig::from_lookup(|_| None).unwrap();
        assert_eq!(unset, ObservabilityConfig::default());

        let pretty = ObservabilityConfig::from_lookup(|key| (key == ENV_LOG_FORMAT).then(|| "Pretty".to_string()));
        assert_eq!(pretty.unwrap().format, LogFormat::Pretty);

        let err = ObservabilityConfig::from_lookup(|_| Some("xml".to_string())).unwrap_err();
        assert_eq!(err, ConfigError::UnknownLogFormat("xml".to_string()));
    }
}
