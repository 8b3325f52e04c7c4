//! Configuration schema definitions.
//!
//! The file-loadable subset of the receiver configuration. All fields have
//! defaults so an empty file is a valid config.

use serde::Deserialize;

/// Receiver settings as they appear in a config file.
///
/// ```toml
/// port = 8080
/// drain_quiet_period_ms = 45000
/// shutdown_timeout_ms = 60000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default)]
pub struct ReceiverSettings {
    /// Port to bind on all interfaces (0 = ephemeral).
    pub port: u16,

    /// Milliseconds to keep accepting after cancellation before the listener closes.
    pub drain_quiet_period_ms: u64,

    /// Hard bound on total shutdown in milliseconds. Absent = wait for connections to drain.
    pub shutdown_timeout_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let settings: ReceiverSettings = toml::from_str("").unwrap();
        assert_eq!(settings, ReceiverSettings::default());
        assert_eq!(settings.shutdown_timeout_ms, None);
    }

    #[test]
    fn all_fields_deserialize() {
        let settings: ReceiverSettings = toml::from_str(
            "port = 8080\ndrain_quiet_period_ms = 10\nshutdown_timeout_ms = 15\n",
        )
        .unwrap();
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.drain_quiet_period_ms, 10);
        assert_eq!(settings.shutdown_timeout_ms, Some(15));
    }
}
