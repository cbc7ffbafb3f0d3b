//! # Page-ready wiring.
//!
//! The host pages that show a contest clock all do the same thing on
//! page-ready: look up `#contest-countdown-timer` and attach a countdown to it.
//! [`PageInit`] is that step, parameterized by page name.
//!
//! ```text
//! page ready ──► PageInit::on_ready(page, &Document)
//!                  ├─ page has no countdown  → Ok(None)
//!                  ├─ element not on page     → Ok(None)
//!                  └─ element found           → Registry::get_or_construct::<CountdownTimer>
//! ```
//!
//! Calling `on_ready` again (a partial included twice, a re-fired ready event)
//! returns the instance built the first time.

use std::sync::Arc;

use crate::components::{CountdownOptions, CountdownTimer};
use crate::core::Registry;
use crate::dom::Document;
use crate::error::AttachError;

/// Element id the contest pages render the clock into.
pub const COUNTDOWN_ELEMENT_ID: &str = "contest-countdown-timer";

/// Pages that carry a contest countdown.
pub const COUNTDOWN_PAGES: &[&str] = &[
    "contest_detail",
    "contest_scoreboard",
    "problem_submit",
    "discussion_main_or_node",
];

/// Attaches page components on page-ready.
pub struct PageInit {
    registry: Arc<Registry>,
    options: CountdownOptions,
}

impl PageInit {
    /// Creates the initializer with default countdown options.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_options(registry, CountdownOptions::default())
    }

    /// Creates the initializer with explicit countdown options.
    pub fn with_options(registry: Arc<Registry>, options: CountdownOptions) -> Self {
        Self { registry, options }
    }

    /// True if `page` shows a contest countdown.
    pub fn has_countdown(page: &str) -> bool {
        COUNTDOWN_PAGES.contains(&page)
    }

    /// Runs the page-ready step for `page`.
    ///
    /// # Errors
    /// Propagates registry errors other than a missing element, which is not
    /// an error for a page (the contest may simply not be running).
    pub async fn on_ready(
        &self,
        page: &str,
        document: &Document,
    ) -> Result<Option<Arc<CountdownTimer>>, AttachError> {
        if !Self::has_countdown(page) {
            return Ok(None);
        }
        let Some(node) = document.query(COUNTDOWN_ELEMENT_ID) else {
            return Ok(None);
        };
        self.registry
            .get_or_construct::<CountdownTimer>(Some(&node), self.options.clone())
            .await
            .map(Some)
    }

    /// Page teardown: disposes everything attached to the countdown element.
    pub async fn on_leave(&self, document: &Document) -> usize {
        match document.query(COUNTDOWN_ELEMENT_ID) {
            Some(node) => {
                let n = self.registry.dispose_node(&node).await;
                document.remove(&node);
                n
            }
            None => 0,
        }
    }
}
