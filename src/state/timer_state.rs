//! Countdown state machine

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tokio::{
    runtime::Handle,
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use super::{TimerEvent, TimerSnapshot};
use crate::{
    config::TimerConfig,
    geometry::{self, Point},
    tasks::countdown_task,
};

/// Result of a single countdown tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    Continue,
    Finished,
    /// The countdown was cancelled or replaced since the task started
    Stale,
}

#[derive(Debug)]
struct Inner {
    time_remaining: u32,
    running: bool,
    /// Identifies the countdown task allowed to tick; bumped on every cancel
    generation: u64,
    countdown: Option<JoinHandle<()>>,
    last_action: Option<(&'static str, DateTime<Utc>)>,
}

/// State shared between [`TimerState`] and its countdown task
#[derive(Debug)]
pub(crate) struct SharedTimer {
    config: TimerConfig,
    inner: Mutex<Inner>,
    snapshot_tx: watch::Sender<TimerSnapshot>,
    event_tx: broadcast::Sender<TimerEvent>,
}

impl SharedTimer {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e: PoisonError<_>| {
            warn!("Timer state lock was poisoned, recovering");
            e.into_inner()
        })
    }

    fn snapshot_of(&self, inner: &Inner) -> TimerSnapshot {
        TimerSnapshot::new(inner.time_remaining, self.config.time_limit, inner.running)
    }

    /// Record the action and notify observers. Called with the lock held so
    /// snapshots are published in mutation order.
    fn publish(&self, inner: &mut Inner, event: TimerEvent) {
        if !matches!(event, TimerEvent::Ticked { .. }) {
            inner.last_action = Some((event.action(), Utc::now()));
        }

        self.snapshot_tx.send_replace(self.snapshot_of(inner));

        // No receivers is normal when nobody listens for events
        let _ = self.event_tx.send(event);
    }

    fn cancel_countdown(inner: &mut Inner) {
        inner.generation = inner.generation.wrapping_add(1);
        inner.running = false;
        if let Some(handle) = inner.countdown.take() {
            handle.abort();
        }
    }

    /// Decrement the remaining time on behalf of countdown `generation`
    pub(crate) fn tick(&self, generation: u64) -> TickOutcome {
        let mut inner = self.lock();

        if !inner.running || inner.generation != generation {
            return TickOutcome::Stale;
        }

        inner.time_remaining = inner.time_remaining.saturating_sub(1);
        let remaining = inner.time_remaining;
        debug!("Countdown tick, {}s remaining", remaining);

        if remaining > 0 {
            self.publish(&mut inner, TimerEvent::Ticked { time_remaining: remaining });
            return TickOutcome::Continue;
        }

        // The last tick only goes out as an event; watchers see the idle snapshot
        let _ = self.event_tx.send(TimerEvent::Ticked { time_remaining: 0 });

        // This is the calling task's own handle; release it rather than abort
        drop(inner.countdown.take());
        Self::cancel_countdown(&mut inner);
        self.publish(&mut inner, TimerEvent::Finished);
        info!("Countdown finished");
        TickOutcome::Finished
    }
}

/// Countdown timer with a running flag and a single cancellable tick task.
///
/// Operations never fail. Combinations that make no sense (starting at zero,
/// dragging while running) are ignored. Starting a countdown needs a Tokio
/// runtime; without one [`toggle`](Self::toggle) leaves the timer idle.
/// Dropping the timer cancels its countdown.
#[derive(Debug)]
pub struct TimerState {
    shared: Arc<SharedTimer>,
}

impl TimerState {
    /// Create a full, idle timer
    pub fn new(config: TimerConfig) -> Self {
        let config = TimerConfig {
            time_limit: config.time_limit.max(1),
            ..config
        };
        let (snapshot_tx, _) = watch::channel(TimerSnapshot::idle(config.time_limit));
        let (event_tx, _) = broadcast::channel(64);

        Self {
            shared: Arc::new(SharedTimer {
                config,
                inner: Mutex::new(Inner {
                    time_remaining: config.time_limit,
                    running: false,
                    generation: 0,
                    countdown: None,
                    last_action: None,
                }),
                snapshot_tx,
                event_tx,
            }),
        }
    }

    /// Start the countdown when idle, stop it when running
    pub fn toggle(&self) {
        let shared = &self.shared;
        let mut inner = shared.lock();

        if inner.running {
            SharedTimer::cancel_countdown(&mut inner);
            let remaining = inner.time_remaining;
            shared.publish(&mut inner, TimerEvent::Stopped { time_remaining: remaining });
            info!("Timer stopped at {}s", remaining);
            return;
        }

        if inner.time_remaining == 0 {
            debug!("Ignoring start with no time remaining");
            return;
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                warn!("Cannot start countdown outside a Tokio runtime: {}", e);
                return;
            }
        };

        SharedTimer::cancel_countdown(&mut inner);
        let generation = inner.generation;
        inner.running = true;
        inner.countdown = Some(runtime.spawn(countdown_task(
            Arc::downgrade(shared),
            generation,
            shared.config.tick_period,
        )));

        let remaining = inner.time_remaining;
        shared.publish(&mut inner, TimerEvent::Started { time_remaining: remaining });
        info!("Timer started at {}s", remaining);
    }

    /// Stop any countdown and refill the dial
    pub fn reset(&self) {
        let shared = &self.shared;
        let mut inner = shared.lock();

        SharedTimer::cancel_countdown(&mut inner);
        inner.time_remaining = shared.config.time_limit;
        let remaining = inner.time_remaining;
        shared.publish(&mut inner, TimerEvent::Reset { time_remaining: remaining });
        info!("Timer reset to {}s", remaining);
    }

    /// Set the remaining time from a touch on the dial.
    ///
    /// Ignored while running. A touch exactly on the center keeps the
    /// previous value.
    pub fn set_time_by_touch(&self, center: Point, position: Point) {
        if self.is_running() {
            debug!("Ignoring dial touch while running");
            return;
        }

        match geometry::position_to_time(center, position, self.shared.config.time_limit) {
            Some(seconds) => self.set_time(seconds),
            None => debug!("Touch at dial center, keeping current time"),
        }
    }

    /// Set the remaining time directly, clamped to the limit. Ignored while running.
    pub fn set_time(&self, seconds: u32) {
        let shared = &self.shared;
        let mut inner = shared.lock();

        if inner.running {
            debug!("Ignoring time change while running");
            return;
        }

        let seconds = seconds.min(shared.config.time_limit);
        if seconds == inner.time_remaining {
            return;
        }

        inner.time_remaining = seconds;
        shared.publish(&mut inner, TimerEvent::TimeSet { time_remaining: seconds });
        debug!("Time set to {}s", seconds);
    }

    /// Current values
    pub fn snapshot(&self) -> TimerSnapshot {
        self.shared.snapshot_of(&self.shared.lock())
    }

    pub fn time_remaining(&self) -> u32 {
        self.shared.lock().time_remaining
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    pub fn progress(&self) -> f32 {
        self.snapshot().progress
    }

    pub fn is_reset_visible(&self) -> bool {
        self.snapshot().reset_visible
    }

    pub fn time_limit(&self) -> u32 {
        self.shared.config.time_limit
    }

    pub fn config(&self) -> TimerConfig {
        self.shared.config
    }

    /// Watch the latest snapshot
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Receive every event from now on
    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.shared.event_tx.subscribe()
    }

    /// Get last action information. Ticks are not counted as actions.
    pub fn last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        match self.shared.lock().last_action {
            Some((action, at)) => (Some(action.to_string()), Some(at)),
            None => (None, None),
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

impl Drop for TimerState {
    fn drop(&mut self) {
        SharedTimer::cancel_countdown(&mut self.shared.lock());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::sleep;

    use super::*;

    const CENTER: Point = Point::new(0.0, 0.0);

    /// Wait through `ticks` one-second periods plus a margin
    async fn elapse(ticks: u64) {
        sleep(Duration::from_millis(ticks * 1000 + 500)).await;
    }

    #[test]
    fn starts_full_and_idle() {
        let timer = TimerState::default();
        assert_eq!(timer.time_remaining(), 60);
        assert!(!timer.is_running());
        assert_eq!(timer.progress(), 1.0);
        assert!(!timer.is_reset_visible());
        assert_eq!(timer.last_action(), (None, None));
    }

    #[test]
    fn touch_sets_time_when_idle() {
        let timer = TimerState::default();
        timer.set_time_by_touch(CENTER, Point::new(10.0, 0.0));
        assert_eq!(timer.time_remaining(), 15);
        assert!(timer.is_reset_visible());

        timer.set_time_by_touch(CENTER, Point::new(0.0, -10.0));
        assert_eq!(timer.time_remaining(), 0);
        assert_eq!(timer.last_action().0.as_deref(), Some("set-time"));
    }

    #[test]
    fn touch_on_center_keeps_previous_time() {
        let timer = TimerState::default();
        timer.set_time(42);
        timer.set_time_by_touch(CENTER, CENTER);
        assert_eq!(timer.time_remaining(), 42);
    }

    #[test]
    fn set_time_is_clamped() {
        let timer = TimerState::new(TimerConfig::with_limit(30));
        timer.set_time(500);
        assert_eq!(timer.time_remaining(), 30);
    }

    #[test]
    fn toggle_without_runtime_stays_idle() {
        let timer = TimerState::default();
        timer.toggle();
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn three_ticks_then_stop() {
        let timer = TimerState::default();
        timer.toggle();
        assert!(timer.is_running());

        elapse(3).await;
        assert_eq!(timer.time_remaining(), 57);
        assert!(timer.is_running());

        timer.toggle();
        assert!(!timer.is_running());
        elapse(5).await;
        assert_eq!(timer.time_remaining(), 57);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_at_zero_is_ignored() {
        let timer = TimerState::default();
        timer.set_time(0);
        let mut events = timer.subscribe_events();

        timer.toggle();
        assert!(!timer.is_running());
        assert!(events.try_recv().is_err());
        elapse(2).await;
        assert_eq!(timer.time_remaining(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_from_running_cancels_ticks() {
        let timer = TimerState::default();
        timer.toggle();
        elapse(2).await;

        timer.reset();
        let snapshot = timer.snapshot();
        assert_eq!(snapshot.time_remaining, 60);
        assert!(!snapshot.running);
        assert!(!snapshot.reset_visible);

        elapse(10).await;
        assert_eq!(timer.time_remaining(), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn touch_ignored_while_running() {
        let timer = TimerState::default();
        timer.toggle();
        timer.set_time_by_touch(CENTER, Point::new(0.0, 10.0));
        timer.set_time(5);
        assert_eq!(timer.time_remaining(), 60);
        timer.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn finishes_and_returns_to_idle() {
        let timer = TimerState::default();
        timer.set_time(2);
        let mut events = timer.subscribe_events();
        timer.toggle();

        elapse(2).await;
        assert!(timer.snapshot().is_finished());

        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                TimerEvent::Started { time_remaining: 2 },
                TimerEvent::Ticked { time_remaining: 1 },
                TimerEvent::Ticked { time_remaining: 0 },
                TimerEvent::Finished,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn finishing_tick_publishes_idle_snapshot_once() {
        let timer = TimerState::default();
        timer.set_time(1);
        timer.toggle();
        let mut rx = timer.subscribe();
        let mut events = timer.subscribe_events();

        rx.changed().await.unwrap();
        let snapshot = *rx.borrow_and_update();
        assert_eq!(snapshot, TimerSnapshot::new(0, 60, false));
        assert!(!rx.has_changed().unwrap());

        assert_eq!(events.try_recv().unwrap(), TimerEvent::Ticked { time_remaining: 0 });
        assert_eq!(events.try_recv().unwrap(), TimerEvent::Finished);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn finishing_tick_goes_idle_and_stops_ticking() {
        let timer = TimerState::default();
        let mut rx = timer.subscribe();
        let generation = {
            let mut inner = timer.shared.lock();
            inner.time_remaining = 1;
            inner.running = true;
            inner.generation
        };

        assert_eq!(timer.shared.tick(generation), TickOutcome::Finished);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), TimerSnapshot::new(0, 60, false));
        assert_eq!(timer.last_action().0.as_deref(), Some("finish"));

        // The finished countdown can no longer tick
        assert_eq!(timer.shared.tick(generation), TickOutcome::Stale);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn watchers_see_each_change() {
        let timer = TimerState::default();
        let mut rx = timer.subscribe();
        timer.toggle();

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().running);

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().time_remaining, 59);
        timer.reset();
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_timer_stops_countdown() {
        let timer = TimerState::default();
        let rx = timer.subscribe();
        timer.toggle();
        drop(timer);

        elapse(3).await;
        // Sender is gone with the timer; the last published value is the start
        assert!(rx.has_changed().is_err());
        assert_eq!(rx.borrow().time_remaining, 60);
    }
}
