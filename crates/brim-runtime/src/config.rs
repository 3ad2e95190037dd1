/// Environment variable that switches tracking on or off for the process-wide
/// tracker.
pub const TRACKING_ENV: &str = "BRIM_TRACKING";

const DEFAULT_SWEEPER_THREAD_NAME: &str = "brim-sweeper";

/// Tracker configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// When false, registration is a pass-through and snapshots are empty.
    pub enabled: bool,

    /// Name given to the background thread that removes swept entries.
    pub sweeper_thread_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            sweeper_thread_name: DEFAULT_SWEEPER_THREAD_NAME.to_string(),
        }
    }
}

impl Config {
    /// Reads [`TRACKING_ENV`]. An unset or empty variable keeps tracking on.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        let Some(value) = std::env::var_os(TRACKING_ENV) else {
            return config;
        };
        let value = value.to_string_lossy();
        match parse_switch(&value) {
            Some(enabled) => config.enabled = enabled,
            None => {
                tracing::warn!(
                    var = TRACKING_ENV,
                    value = %value,
                    "unrecognized value, keeping queue tracking enabled"
                );
            }
        }
        config
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Parses an on/off switch. Empty means "not set", which is on.
pub fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_switch_accepts_common_spellings() {
        for on in ["1", "true", "ON", " yes ", ""] {
            assert_eq!(parse_switch(on), Some(true), "{on:?}");
        }
        for off in ["0", "false", "Off", "NO"] {
            assert_eq!(parse_switch(off), Some(false), "{off:?}");
        }
        assert_eq!(parse_switch("maybe"), None);
    }

    #[test]
    fn from_env_reads_the_tracking_switch() {
        // Nothing else in this crate reads the environment.
        unsafe { std::env::set_var(TRACKING_ENV, "0") };
        let off = Config::from_env();
        unsafe { std::env::set_var(TRACKING_ENV, "sometimes") };
        let invalid = Config::from_env();
        unsafe { std::env::remove_var(TRACKING_ENV) };
        let unset = Config::from_env();

        assert!(!off.enabled);
        assert!(invalid.enabled);
        assert!(unset.enabled);
    }

    #[test]
    fn default_is_enabled() {
        let config = Config::default();
        assert!(config.enabled);
        assert_eq!(config.sweeper_thread_name, "brim-sweeper");
        assert!(!Config::disabled().enabled);
    }
}
