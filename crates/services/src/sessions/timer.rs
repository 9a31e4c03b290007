use std::time::Duration;

use quiz_core::model::TimerMode;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, trace};

/// Timing knobs that are not part of the quiz settings proper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    /// Length of one countdown unit.
    pub tick: Duration,
    /// How long a per-question answer stays revealed before auto-advancing.
    pub reveal_pause: Duration,
    /// Submit the quiz when the last per-question countdown runs out.
    pub finish_on_last_timeout: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            reveal_pause: Duration::from_millis(1500),
            finish_on_last_timeout: false,
        }
    }
}

/// What the session should do when a countdown reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutAction {
    /// Overall mode: submit the whole quiz.
    FinishAll,
    /// Per-question mode: close the current question unanswered.
    CommitCurrent,
}

impl TimeoutAction {
    #[must_use]
    pub fn for_mode(mode: TimerMode) -> Self {
        match mode {
            TimerMode::Overall => Self::FinishAll,
            TimerMode::PerQuestion => Self::CommitCurrent,
        }
    }
}

/// Intent raised by a background timer task.
///
/// Tasks never touch session state; they only send these to the controller,
/// which applies them. `generation` identifies the run that produced the
/// event so events from a stopped run can be told apart and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick {
        generation: u64,
        remaining_secs: u32,
    },
    Expired {
        generation: u64,
        action: TimeoutAction,
    },
    RevealElapsed {
        generation: u64,
        from_index: usize,
    },
}

/// Owns the countdown task and the reveal-pause task of one session.
///
/// At most one countdown runs at a time: `start` stops the previous run
/// before spawning a new one, and `stop` is idempotent.
#[derive(Debug)]
pub struct TimerScheduler {
    tx: mpsc::UnboundedSender<TimerEvent>,
    tick: Duration,
    next_generation: u64,
    countdown: Option<Run>,
    reveal: Option<Run>,
}

#[derive(Debug)]
struct Run {
    generation: u64,
    handle: JoinHandle<()>,
}

impl Run {
    fn cancel(self) {
        self.handle.abort();
    }
}

impl TimerScheduler {
    /// Create a scheduler and the receiving end of its event stream.
    #[must_use]
    pub fn new(tick: Duration) -> (Self, mpsc::UnboundedReceiver<TimerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            tx,
            tick,
            next_generation: 1,
            countdown: None,
            reveal: None,
        };
        (scheduler, rx)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.countdown.is_some()
    }

    #[must_use]
    pub fn reveal_pending(&self) -> bool {
        self.reveal.is_some()
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    /// Start a countdown of `seconds` units, replacing any running one.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, mode: TimerMode, seconds: u32) {
        self.stop();
        let generation = self.bump_generation();
        let action = TimeoutAction::for_mode(mode);
        debug!(generation, seconds, ?action, "starting countdown");
        let handle = tokio::spawn(run_countdown(
            generation,
            seconds,
            self.tick,
            action,
            self.tx.clone(),
        ));
        self.countdown = Some(Run { generation, handle });
    }

    /// Stop the running countdown, if any.
    pub fn stop(&mut self) {
        if let Some(run) = self.countdown.take() {
            debug!(generation = run.generation, "stopping countdown");
            run.cancel();
        }
    }

    /// Raise `RevealElapsed` for `from_index` after `pause`, replacing any
    /// pending reveal.
    pub fn schedule_reveal(&mut self, from_index: usize, pause: Duration) {
        self.cancel_reveal();
        let generation = self.bump_generation();
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            time::sleep(pause).await;
            let _ = tx.send(TimerEvent::RevealElapsed {
                generation,
                from_index,
            });
        });
        self.reveal = Some(Run { generation, handle });
    }

    pub fn cancel_reveal(&mut self) {
        if let Some(run) = self.reveal.take() {
            run.cancel();
        }
    }

    /// Decide whether `event` comes from a live run.
    ///
    /// Terminal events (`Expired`, `RevealElapsed`) retire their run, so each
    /// fires its action at most once. Anything from a stopped or replaced run
    /// is rejected.
    pub fn accept(&mut self, event: &TimerEvent) -> bool {
        let live = |run: &Option<Run>, generation: u64| {
            run.as_ref().is_some_and(|r| r.generation == generation)
        };

        let accepted = match *event {
            TimerEvent::Tick { generation, .. } => live(&self.countdown, generation),
            TimerEvent::Expired { generation, .. } => {
                let ok = live(&self.countdown, generation);
                if ok {
                    self.countdown = None;
                }
                ok
            }
            TimerEvent::RevealElapsed { generation, .. } => {
                let ok = live(&self.reveal, generation);
                if ok {
                    self.reveal = None;
                }
                ok
            }
        };
        if !accepted {
            trace!(?event, "dropping stale timer event");
        }
        accepted
    }

    /// Stop everything.
    pub fn shutdown(&mut self) {
        self.stop();
        self.cancel_reveal();
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_countdown(
    generation: u64,
    seconds: u32,
    tick: Duration,
    action: TimeoutAction,
    tx: mpsc::UnboundedSender<TimerEvent>,
) {
    let mut interval = time::interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut remaining = seconds;
    while remaining > 0 {
        interval.tick().await;
        remaining -= 1;
        let tick_event = TimerEvent::Tick {
            generation,
            remaining_secs: remaining,
        };
        if tx.send(tick_event).is_err() {
            return;
        }
    }
    let _ = tx.send(TimerEvent::Expired { generation, action });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn counts_down_once_per_tick_then_expires() {
        let (mut timer, mut rx) = TimerScheduler::new(Duration::from_secs(1));
        let started = Instant::now();
        timer.start(TimerMode::Overall, 3);

        for expected in [2, 1, 0] {
            let event = rx.recv().await.unwrap();
            assert!(timer.accept(&event));
            assert!(matches!(
                event,
                TimerEvent::Tick { remaining_secs, .. } if remaining_secs == expected
            ));
        }
        let event = rx.recv().await.unwrap();
        assert!(matches!(
            event,
            TimerEvent::Expired {
                action: TimeoutAction::FinishAll,
                ..
            }
        ));
        assert!(timer.accept(&event));
        assert!(!timer.is_active());
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_invalidates_previous_run() {
        let (mut timer, mut rx) = TimerScheduler::new(Duration::from_secs(1));
        timer.start(TimerMode::PerQuestion, 5);
        let first = rx.recv().await.unwrap();
        assert!(timer.accept(&first));

        timer.start(TimerMode::PerQuestion, 5);
        // A tick from the first run that was already queued is now stale.
        assert!(!timer.accept(&first));

        let next = rx.recv().await.unwrap();
        assert!(timer.accept(&next));
        assert!(matches!(next, TimerEvent::Tick { remaining_secs: 4, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn stopped_countdown_sends_nothing_more() {
        let (mut timer, mut rx) = TimerScheduler::new(Duration::from_secs(1));
        timer.start(TimerMode::Overall, 2);
        timer.stop();
        timer.stop();
        assert!(!timer.is_active());

        time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_fires_once() {
        let (mut timer, mut rx) = TimerScheduler::new(Duration::from_secs(1));
        timer.start(TimerMode::PerQuestion, 1);
        let _tick = rx.recv().await.unwrap();
        let expired = rx.recv().await.unwrap();
        assert!(timer.accept(&expired));
        assert!(!timer.accept(&expired));
    }

    #[tokio::test(start_paused = true)]
    async fn reveal_fires_after_pause_unless_cancelled() {
        let (mut timer, mut rx) = TimerScheduler::new(Duration::from_secs(1));
        let started = Instant::now();
        timer.schedule_reveal(3, Duration::from_millis(1500));
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, TimerEvent::RevealElapsed { from_index: 3, .. }));
        assert!(timer.accept(&event));
        assert_eq!(started.elapsed(), Duration::from_millis(1500));

        timer.schedule_reveal(4, Duration::from_millis(1500));
        timer.cancel_reveal();
        time::sleep(Duration::from_secs(3)).await;
        assert!(rx.try_recv().is_err());
    }
}
