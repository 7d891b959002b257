//! Countdown background task

use std::{sync::Weak, time::Duration};
use tokio::time::sleep;
use tracing::debug;

use crate::state::timer_state::{SharedTimer, TickOutcome};

/// Background task that decrements the timer once per `period`.
///
/// Each period starts when the previous tick has been applied, so delays
/// accumulate rather than being corrected. The task exits when the timer is
/// dropped, cancelled, or reaches zero.
pub(crate) async fn countdown_task(timer: Weak<SharedTimer>, generation: u64, period: Duration) {
    debug!("Starting countdown task (generation {})", generation);

    loop {
        sleep(period).await;

        let Some(timer) = timer.upgrade() else {
            debug!("Timer dropped, ending countdown task");
            break;
        };

        match timer.tick(generation) {
            TickOutcome::Continue => {}
            TickOutcome::Finished => break,
            TickOutcome::Stale => {
                debug!("Countdown generation {} superseded", generation);
                break;
            }
        }
    }
}
