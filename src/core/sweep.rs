//! Periodic auto-close of idle conversations

use crate::core::traits::ConversationService;
use di::Ref;
use log::{debug, info};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Runs the sweep every `period` until the runtime shuts down.
///
/// Only one of these should run per deployment; `period` must stay well above the
/// time a single sweep takes.
pub async fn auto_close_task(
    service: Ref<dyn ConversationService>,
    period: Duration,
    max_idle: chrono::Duration,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // first tick fires immediately
    interval.tick().await;

    loop {
        interval.tick().await;

        let closed = service.close_inactive_conversations(max_idle).await;
        if closed > 0 {
            info!("auto-closed {closed} inactive conversation(s)");
        } else {
            debug!("auto-close sweep found nothing to close");
        }
    }
}
