//! Configuration validation.
//!
//! # Responsibilities
//! - Flag combinations that are legal but probably not intended
//!
//! # Design Decisions
//! - No combination is rejected; the caller owns the policy
//! - Validation is a pure function: ReceiverSettings → Vec<ValidationWarning>

use std::fmt;

use crate::config::schema::ReceiverSettings;

/// A legal but suspicious setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// The hard timeout can elapse before the quiet period ends, forcing
    /// connections closed while the listener is still accepting.
    TimeoutShorterThanQuietPeriod { timeout_ms: u64, quiet_period_ms: u64 },
    /// Any in-flight request at cancellation time will be cut off.
    ZeroShutdownTimeout,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::TimeoutShorterThanQuietPeriod {
                timeout_ms,
                quiet_period_ms,
            } => write!(
                f,
                "shutdown_timeout_ms ({}) is shorter than drain_quiet_period_ms ({})",
                timeout_ms, quiet_period_ms
            ),
            ValidationWarning::ZeroShutdownTimeout => {
                write!(f, "shutdown_timeout_ms is 0; shutdown will never be graceful")
            }
        }
    }
}

/// Report every questionable combination in `settings`.
pub fn validate_settings(settings: &ReceiverSettings) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if let Some(timeout_ms) = settings.shutdown_timeout_ms {
        if timeout_ms == 0 {
            warnings.push(ValidationWarning::ZeroShutdownTimeout);
        } else if timeout_ms < settings.drain_quiet_period_ms {
            warnings.push(ValidationWarning::TimeoutShorterThanQuietPeriod {
                timeout_ms,
                quiet_period_ms: settings.drain_quiet_period_ms,
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_clean() {
        assert!(validate_settings(&ReceiverSettings::default()).is_empty());
    }

    #[test]
    fn timeout_shorter_than_quiet_period() {
        let settings = ReceiverSettings {
            port: 0,
            drain_quiet_period_ms: 100,
            shutdown_timeout_ms: Some(15),
        };
        assert_eq!(
            validate_settings(&settings),
            vec![ValidationWarning::TimeoutShorterThanQuietPeriod {
                timeout_ms: 15,
                quiet_period_ms: 100,
            }]
        );
    }

    #[test]
    fn zero_timeout() {
        let settings = ReceiverSettings {
            shutdown_timeout_ms: Some(0),
            ..ReceiverSettings::default()
        };
        assert_eq!(validate_settings(&settings), vec![ValidationWarning::ZeroShutdownTimeout]);
    }
}
