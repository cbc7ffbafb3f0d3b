//! Components built on the attach contract.
//!
//! - [`countdown`]: [`CountdownTimer`], a live `H:M:S` display that ends on a fixed text.

pub mod countdown;

pub use countdown::{
    CountdownOptions, CountdownTimer, Padding, Remaining, TARGET_ATTR, TickOutcome, parse_target,
};
