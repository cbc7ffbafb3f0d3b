//! # Example: countdown
//!
//! Attaches a countdown to a contest page and watches it reach its terminal state.
//!
//! Shows how to:
//! - Build a [`Registry`] with the [`LogWriter`] subscriber
//! - Run the page-ready step twice and get the same instance back
//! - Observe the node text until the countdown finishes
//! - Tear the page down with [`PageInit::on_leave`]
//!
//! ## Flow
//! ```text
//! main()
//!   ├─► Document with #contest-countdown-timer (data-end-at = now + 5s)
//!   ├─► PageInit::on_ready("contest_detail")      → InstanceConstructed, TimerStarted
//!   ├─► PageInit::on_ready("contest_scoreboard")  → InstanceReused (same Arc)
//!   ├─► print node text every second             → 0:0:4 … Finished
//!   └─► PageInit::on_leave                        → InstanceDisposed
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example countdown --features logging
//! ```

use std::{sync::Arc, time::Duration};

use chrono::{SecondsFormat, TimeDelta, Utc};
use domattach::{
    COUNTDOWN_ELEMENT_ID, Config, Document, LogWriter, PageInit, Padding, Registry, Subscribe,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // 1. Configure registry
    let cfg = Config {
        padding: Padding::MinutesSeconds,
        ..Config::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let registry = Registry::with_subscribers(cfg, subs);

    // 2. Host page with a contest clock ending in 5 seconds
    let page = Document::new();
    let end_at = Utc::now() + TimeDelta::seconds(5);
    page.create_element(COUNTDOWN_ELEMENT_ID)
        .set_data("end-at", end_at.to_rfc3339_opts(SecondsFormat::Millis, true));

    // 3. Page-ready, twice (a partial included by two layouts)
    let pages = PageInit::new(Arc::clone(&registry));
    let timer = pages
        .on_ready("contest_detail", &page)
        .await?
        .ok_or_else(|| anyhow::anyhow!("countdown element missing"))?;
    let again = pages.on_ready("contest_scoreboard", &page).await?;
    assert!(again.is_some_and(|t| Arc::ptr_eq(&t, &timer)));

    // 4. Watch the node
    let node = page
        .query(COUNTDOWN_ELEMENT_ID)
        .ok_or_else(|| anyhow::anyhow!("countdown element missing"))?;
    while !timer.is_finished() {
        println!("[page] {}", node.text());
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    println!("[page] {}", node.text());

    // 5. Teardown
    let disposed = pages.on_leave(&page).await;
    println!("[page] disposed {disposed} component(s)");

    registry.shutdown().await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
