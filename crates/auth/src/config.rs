//! Access-check configuration.

use chrono::Duration;

use sitegate_core::{DomainError, DomainResult};

use crate::Permission;

pub const ENV_FALLBACK_PERMISSION: &str = "SITEGATE_FALLBACK_PERMISSION";
pub const ENV_CLOCK_SKEW_SECS: &str = "SITEGATE_CLOCK_SKEW_SECS";

/// Upper bound on tolerated clock skew (one day).
pub const MAX_CLOCK_SKEW_SECS: i64 = 86_400;

/// Tunables for guards built on the tenant access gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessConfig {
    /// Permission checked when a guard is given no permissions.
    pub fallback_permission: Permission,
    /// Tolerated clock skew when validating sessions, in seconds.
    /// Kept within `0..=MAX_CLOCK_SKEW_SECS`.
    pub clock_skew_secs: i64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            fallback_permission: Permission::Read,
            clock_skew_secs: 0,
        }
    }
}

impl AccessConfig {
    pub fn with_fallback_permission(mut self, permission: Permission) -> Self {
        self.fallback_permission = permission;
        self
    }

    /// Values outside `0..=MAX_CLOCK_SKEW_SECS` are clamped.
    pub fn with_clock_skew_secs(mut self, secs: i64) -> Self {
        self.clock_skew_secs = secs.clamp(0, MAX_CLOCK_SKEW_SECS);
        self
    }

    pub fn clock_skew(&self) -> Duration {
        Duration::try_seconds(self.clock_skew_secs.clamp(0, MAX_CLOCK_SKEW_SECS)).unwrap_or_else(Duration::zero)
    }

    /// Load from the process environment; unset variables keep defaults.
    pub fn from_env() -> DomainResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (used by `from_env` and tests).
    pub fn from_lookup<F>(lookup: F) -> DomainResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_FALLBACK_PERMISSION) {
            config.fallback_permission = raw.trim().parse()?;
        }

        if let Some(raw) = lookup(ENV_CLOCK_SKEW_SECS) {
            let secs: i64 = raw.trim().parse().map_err(|e| {
                DomainError::validation(format!("{ENV_CLOCK_SKEW_SECS}: {e}"))
            })?;
            if secs < 0 {
                return Err(DomainError::validation(format!(
                    "{ENV_CLOCK_SKEW_SECS}: must not be negative"
                )));
            }
            if secs > MAX_CLOCK_SKEW_SECS {
                return Err(DomainError::validation(format!(
                    "{ENV_CLOCK_SKEW_SECS}: must not exceed {MAX_CLOCK_SKEW_SECS}"
                )));
            }
            config.clock_skew_secs = secs;
        }

        Ok(config)
    }
}
