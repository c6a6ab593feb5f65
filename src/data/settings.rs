//! Pool sizing and diagnostics settings for the connection factory.

use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Extended-profile default for [`PoolSettings::max_open_connections`].
pub const DEFAULT_MAX_OPEN_CONNECTIONS: u32 = 25;
/// Extended-profile default for [`PoolSettings::max_idle_connections`].
pub const DEFAULT_MAX_IDLE_CONNECTIONS: u32 = 10;
/// Upper bound on a single acquire, which also bounds the startup probe.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

const EXTENDED_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 2);
const EXTENDED_MAX_LIFETIME: Duration = Duration::from_secs(60 * 30);

/// Which configuration profile the factory applies on success.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionProfile {
    /// No pool tuning and no debug logging; sqlx defaults apply.
    Basic,
    /// Bounded pool sizing, connection recycling and optional debug logging.
    #[default]
    Extended,
}

/// Typed pool options.
///
/// `None` for a sizing field leaves the sqlx default in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub profile: ConnectionProfile,
    /// Cap on total concurrent connections.
    pub max_open_connections: Option<u32>,
    /// Idle connections kept warm. sqlx has no idle cap, so this is a floor
    /// (the pool's `min_connections`), not a ceiling: up to
    /// `max_open_connections` may sit idle until the idle timeout reaps those
    /// above this count. Clamped to `max_open_connections`.
    pub max_idle_connections: Option<u32>,
    /// Log every statement executed through the handle at INFO.
    pub debug: bool,
    pub acquire_timeout: Duration,
}

impl PoolSettings {
    /// Basic profile: open and probe only.
    pub fn basic() -> Self {
        Self {
            profile: ConnectionProfile::Basic,
            max_open_connections: None,
            max_idle_connections: None,
            debug: false,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Extended profile with the default bounds (25 open, 10 idle).
    pub fn extended(debug: bool) -> Self {
        Self {
            profile: ConnectionProfile::Extended,
            max_open_connections: Some(DEFAULT_MAX_OPEN_CONNECTIONS),
            max_idle_connections: Some(DEFAULT_MAX_IDLE_CONNECTIONS),
            debug,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Idle timeout applied to pooled connections (extended profile only).
    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.profile {
            ConnectionProfile::Basic => None,
            ConnectionProfile::Extended => Some(EXTENDED_IDLE_TIMEOUT),
        }
    }

    /// Maximum lifetime of a pooled connection (extended profile only).
    pub fn max_lifetime(&self) -> Option<Duration> {
        match self.profile {
            ConnectionProfile::Basic => None,
            ConnectionProfile::Extended => Some(EXTENDED_MAX_LIFETIME),
        }
    }

    /// Clamp the idle bound so it never exceeds the open bound, and force a
    /// zero open bound up to one.
    pub fn normalized(mut self) -> Self {
        if let Some(max_open) = self.max_open_connections
            && max_open == 0
        {
            warn!("max_open_connections of 0 would starve the pool, using 1");
            self.max_open_connections = Some(1);
        }

        if let (Some(max_open), Some(max_idle)) =
            (self.max_open_connections, self.max_idle_connections)
            && max_idle > max_open
        {
            warn!(
                max_idle_connections = max_idle,
                max_open_connections = max_open,
                "max_idle_connections exceeds max_open_connections, clamping"
            );
            self.max_idle_connections = Some(max_open);
        }
        self
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::extended(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_defaults() {
        let settings = PoolSettings::default();
        assert_eq!(settings.profile, ConnectionProfile::Extended);
        assert_eq!(settings.max_open_connections, Some(25));
        assert_eq!(settings.max_idle_connections, Some(10));
        assert!(!settings.debug);
        assert_eq!(settings.idle_timeout(), Some(Duration::from_secs(120)));
        assert_eq!(settings.max_lifetime(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn basic_profile_leaves_pool_untuned() {
        let settings = PoolSettings::basic();
        assert_eq!(settings.max_open_connections, None);
        assert_eq!(settings.max_idle_connections, None);
        assert!(!settings.debug);
        assert_eq!(settings.idle_timeout(), None);
        assert_eq!(settings.max_lifetime(), None);
    }

    #[test]
    fn idle_is_clamped_to_open() {
        let settings = PoolSettings {
            max_open_connections: Some(4),
            max_idle_connections: Some(12),
            ..PoolSettings::default()
        }
        .normalized();
        assert_eq!(settings.max_idle_connections, Some(4));
        assert_eq!(settings.max_open_connections, Some(4));
    }

    #[test]
    fn zero_open_bound_becomes_one() {
        let settings = PoolSettings {
            max_open_connections: Some(0),
            max_idle_connections: Some(0),
            ..PoolSettings::default()
        }
        .normalized();
        assert_eq!(settings.max_open_connections, Some(1));
        assert_eq!(settings.max_idle_connections, Some(0));
    }

    #[test]
    fn profile_deserializes_lowercase() {
        let profile: ConnectionProfile = serde_json::from_str("\"basic\"").unwrap();
        assert_eq!(profile, ConnectionProfile::Basic);
        let profile: ConnectionProfile = serde_json::from_str("\"extended\"").unwrap();
        assert_eq!(profile, ConnectionProfile::Extended);
    }
}
