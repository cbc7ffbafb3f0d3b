//! # CountdownTimer: live time-left display bound to a node.
//!
//! Reads the target instant once from the node's `data-end-at` attribute and
//! keeps the node's text at `hours:minutes:seconds` until the target is
//! reached, then writes the terminal text (`"Finished"` by default).
//!
//! ## State machine
//! ```text
//! start() ──► tick() ──┬─ remaining > 0 ─► Running: arm interval(tick)
//!                      │                     │
//!                      │                     └─► every period: tick()
//!                      │                            ├─ remaining > 0 → render
//!                      │                            └─ remaining = 0 ─┐
//!                      └─ remaining = 0 ──────────────────────────────┴─► Finished
//!                                                   (timer cancelled once, terminal text)
//! ```
//!
//! ## Rules
//! - The first render happens in `start`, with no delay.
//! - A missing or unparseable target is not an error: it is reported as
//!   `TargetMalformed` and the countdown finishes on that first render.
//! - `Finished` is terminal: later `tick()` calls return [`TickOutcome::Idle`]
//!   and never touch the node.
//! - Disposal cancels the timer and silences `tick()`; the instance is
//!   never restarted.

mod remaining;

use std::borrow::Cow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, RuntimeClock};
use crate::core::{Attach, AttachContext};
use crate::dom::{NodeHandle, WeakNode};
use crate::error::TargetError;
use crate::events::EventKind;

pub use remaining::{Padding, Remaining, parse_target};

/// Data attribute holding the target instant.
pub const TARGET_ATTR: &str = "end-at";

/// Construction options. Unset fields fall back to the registry [`Config`](crate::Config).
#[derive(Clone, Default)]
pub struct CountdownOptions {
    /// Interval between ticks.
    pub tick: Option<Duration>,
    /// Text written once the countdown ends.
    pub finished_text: Option<Cow<'static, str>>,
    /// Rendering of minutes and seconds.
    pub padding: Option<Padding>,
    /// Source of "now". Defaults to a fresh [`RuntimeClock`].
    pub clock: Option<Arc<dyn Clock>>,
}

impl CountdownOptions {
    #[must_use]
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = Some(tick);
        self
    }

    #[must_use]
    pub fn with_finished_text(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        self.finished_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = Some(padding);
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }
}

/// Result of one [`CountdownTimer::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Time left was rendered; still running.
    Rendered(Remaining),
    /// This tick reached zero and wrote the terminal text.
    Finished,
    /// Already finished: nothing was written.
    Idle,
    /// The node no longer exists; the timer was stopped.
    Detached,
}

struct CountdownState {
    remaining: Remaining,
    finished: bool,
    /// Set by disposal; a disposed instance never writes again.
    disposed: bool,
    /// Live repeat token; `Some` only while running with an armed timer.
    timer: Option<CancellationToken>,
}

/// Countdown controller attached to one node.
pub struct CountdownTimer {
    node: WeakNode,
    target: Option<DateTime<Utc>>,
    target_error: Option<TargetError>,
    period: Duration,
    finished_text: Cow<'static, str>,
    padding: Padding,
    clock: Arc<dyn Clock>,
    state: Mutex<CountdownState>,
}

impl Attach for CountdownTimer {
    const KIND: &'static str = "vjCountdownTimerInstance";
    type Options = CountdownOptions;

    fn construct(node: &NodeHandle, options: CountdownOptions, ctx: &AttachContext) -> Self {
        let cfg = ctx.config();
        let (target, target_error) = match node.data(TARGET_ATTR) {
            Some(raw) => match parse_target(&raw) {
                Ok(t) => (Some(t), None),
                Err(e) => (None, Some(e)),
            },
            None => (None, Some(TargetError::Empty)),
        };

        Self {
            node: node.downgrade(),
            target,
            target_error,
            period: options
                .tick
                .unwrap_or_else(|| cfg.tick_clamped())
                .max(Duration::from_millis(1)),
            finished_text: options
                .finished_text
                .unwrap_or_else(|| cfg.finished_text.clone()),
            padding: options.padding.unwrap_or(cfg.padding),
            clock: options
                .clock
                .unwrap_or_else(|| Arc::new(RuntimeClock::new())),
            state: Mutex::new(CountdownState {
                remaining: Remaining::ZERO,
                finished: false,
                disposed: false,
                timer: None,
            }),
        }
    }

    fn start(self: Arc<Self>, ctx: AttachContext) {
        if let Some(err) = &self.target_error {
            ctx.bus().publish(
                ctx.event(EventKind::TargetMalformed)
                    .with_reason(err.as_label()),
            );
        }

        let timer = ctx.token().child_token();
        self.lock().timer = Some(timer.clone());

        match self.tick() {
            TickOutcome::Rendered(_) => {}
            TickOutcome::Finished => {
                ctx.publish(EventKind::TimerFinished);
                return;
            }
            TickOutcome::Idle | TickOutcome::Detached => return,
        }

        ctx.publish(EventKind::TimerStarted);
        tokio::spawn(async move {
            let period = self.period;
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = timer.cancelled() => break,
                    _ = interval.tick() => {
                        match self.tick() {
                            TickOutcome::Rendered(_) => {}
                            TickOutcome::Finished => {
                                ctx.publish(EventKind::TimerFinished);
                                break;
                            }
                            TickOutcome::Idle | TickOutcome::Detached => break,
                        }
                    }
                }
            }
        });
    }

    fn dispose(&self) {
        let mut state = self.lock();
        state.disposed = true;
        if let Some(timer) = state.timer.take() {
            timer.cancel();
        }
    }
}

impl CountdownTimer {
    /// Recomputes the time left and renders it (one scheduled step).
    ///
    /// Safe to call by hand; after the terminal transition or disposal it is
    /// a no-op.
    pub fn tick(&self) -> TickOutcome {
        let mut state = self.lock();
        if state.finished || state.disposed {
            return TickOutcome::Idle;
        }

        let Some(node) = self.node.upgrade() else {
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            return TickOutcome::Detached;
        };

        let remaining = Remaining::until(self.target, self.clock.now());
        state.remaining = remaining;

        if remaining.is_zero() {
            state.finished = true;
            if let Some(timer) = state.timer.take() {
                timer.cancel();
            }
            node.set_text(self.finished_text.as_ref());
            TickOutcome::Finished
        } else {
            node.set_text(remaining.render(self.padding));
            TickOutcome::Rendered(remaining)
        }
    }

    /// Target instant, `None` when the attribute was missing or malformed.
    pub fn target(&self) -> Option<DateTime<Utc>> {
        self.target
    }

    /// Why the target could not be read, if it could not.
    pub fn target_error(&self) -> Option<&TargetError> {
        self.target_error.as_ref()
    }

    /// Time left as of the last tick.
    pub fn remaining(&self) -> Remaining {
        self.lock().remaining
    }

    /// True once the terminal state is reached.
    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }

    /// True while a repeating timer is armed.
    pub fn is_running(&self) -> bool {
        self.lock()
            .timer
            .as_ref()
            .is_some_and(|t| !t.is_cancelled())
    }

    fn lock(&self) -> MutexGuard<'_, CountdownState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
