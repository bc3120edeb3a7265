//! Configuration for a detection run.

use std::time::Duration;

/// Tuning knobs for the detection loop.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tagwatch_session::WatchConfig;
///
/// let config = WatchConfig {
///     presence_poll_interval: Duration::from_millis(5),
///     ..WatchConfig::default()
/// };
/// assert_eq!(config.select_retry_interval, Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    /// Pause between presence checks while a target sits in the field.
    ///
    /// The presence loop runs entirely inside one unit of background work;
    /// this interval bounds how hard it hits the reader. Zero means an
    /// unthrottled spin.
    pub presence_poll_interval: Duration,

    /// Pause before re-issuing a passive-target selection after the field
    /// stayed quiet (or the selection failed).
    pub select_retry_interval: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            presence_poll_interval: Duration::from_millis(10),
            select_retry_interval: Duration::from_millis(250),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = WatchConfig::default();
        assert_eq!(config.presence_poll_interval, Duration::from_millis(10));
        assert_eq!(config.select_retry_interval, Duration::from_millis(250));
    }
}
