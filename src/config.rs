//! # Registry configuration.
//!
//! Provides [`Config`], centralized settings for a [`Registry`](crate::Registry)
//! and defaults for the components it constructs.
//!
//! Config is used in two ways:
//! 1. **Registry creation**: `Registry::new(config)`
//! 2. **Component defaults**: unset [`CountdownOptions`](crate::CountdownOptions)
//!    fields fall back to `tick`, `finished_text` and `padding` when
//!    `CountdownTimer::construct` runs
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `tick = 0s` → clamped to 1ms (a zero-period interval is invalid)

use std::borrow::Cow;
use std::time::Duration;

use crate::components::Padding;

/// Global configuration for the attach registry.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `tick`: Default countdown cadence
/// - `finished_text`: Default text rendered when a countdown ends
/// - `padding`: Default digit padding for rendered countdowns
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` messages will
    /// skip older items.
    pub bus_capacity: usize,

    /// Default interval between countdown ticks.
    pub tick: Duration,

    /// Default terminal text of a countdown.
    pub finished_text: Cow<'static, str>,

    /// Default rendering of the minute and second units.
    pub padding: Padding,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the tick interval clamped to a minimum of 1ms.
    #[inline]
    pub fn tick_clamped(&self) -> Duration {
        self.tick.max(Duration::from_millis(1))
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `tick = 1s`
    /// - `finished_text = "Finished"`
    /// - `padding = Padding::Unpadded`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            tick: Duration::from_secs(1),
            finished_text: Cow::Borrowed("Finished"),
            padding: Padding::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_are_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            tick: Duration::ZERO,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.tick_clamped(), Duration::from_millis(1));
    }
}
