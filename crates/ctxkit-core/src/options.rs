//! Per-call request options.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Advisory metadata a caller may attach to any dispatch operation.
///
/// The timeout is not enforced by this core: dispatch operations are
/// cooperatively cancellable futures, and enforcement belongs to the
/// transport or caller that drops the future when the deadline passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Advisory timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<f64>,
}

impl RequestOptions {
    /// Options with an advisory timeout.
    #[must_use]
    pub const fn with_timeout(seconds: f64) -> Self {
        Self {
            timeout: Some(seconds),
        }
    }

    /// The advisory timeout as a [`Duration`], if one was set and is
    /// representable (finite and non-negative).
    #[must_use]
    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.and_then(|s| Duration::try_from_secs_f64(s).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn timeout_is_optional_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&RequestOptions::default()).unwrap(),
            "{}"
        );
        assert_eq!(
            serde_json::to_string(&RequestOptions::with_timeout(2.5)).unwrap(),
            r#"{"timeout":2.5}"#
        );
    }

    #[test]
    fn duration_conversion_rejects_nonsense() {
        assert_eq!(
            RequestOptions::with_timeout(1.5).timeout_duration(),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(RequestOptions::with_timeout(-1.0).timeout_duration(), None);
        assert_eq!(RequestOptions::default().timeout_duration(), None);
    }
}
