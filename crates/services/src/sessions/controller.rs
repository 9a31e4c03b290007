use std::fmt;

use quiz_core::Clock;
use quiz_core::model::{Letter, Question, QuizSettings, QuizSummary};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::state::{CommitOutcome, SessionState};
use super::timer::{TimeoutAction, TimerEvent, TimerScheduler, TimerSettings};
use super::view::SessionView;
use crate::error::SessionError;

/// Single writer for a quiz session.
///
/// User intents arrive as method calls; timer intents arrive on the event
/// stream and are applied through [`SessionController::handle_timer_event`].
/// Both paths run on whichever task owns the controller, so session state
/// never has more than one writer. The read model is republished after
/// every change.
pub struct SessionController {
    state: SessionState,
    timer: TimerScheduler,
    events: mpsc::UnboundedReceiver<TimerEvent>,
    timer_settings: TimerSettings,
    clock: Clock,
    view_tx: watch::Sender<SessionView>,
}

impl SessionController {
    /// Set up a session over `questions` and start its countdown.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if `questions` is empty.
    pub fn initialize(
        questions: Vec<Question>,
        settings: &QuizSettings,
        timer_settings: TimerSettings,
        clock: Clock,
    ) -> Result<Self, SessionError> {
        let state = SessionState::new(questions, settings, clock.now())?;
        let (timer, events) = TimerScheduler::new(timer_settings.tick);
        let (view_tx, _) = watch::channel(SessionView::from_state(&state));

        let mut controller = Self {
            state,
            timer,
            events,
            timer_settings,
            clock,
            view_tx,
        };
        info!(
            questions = controller.state.len(),
            mode = %controller.state.timer_mode(),
            limit = controller.state.time_limit_secs(),
            "quiz session started"
        );
        controller.start_countdown();
        controller.publish();
        Ok(controller)
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn timer_settings(&self) -> TimerSettings {
        self.timer_settings
    }

    /// Snapshot of the current read model.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView::from_state(&self.state)
    }

    /// Receiver that sees every republished read model.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.view_tx.subscribe()
    }

    fn publish(&self) {
        self.view_tx.send_replace(SessionView::from_state(&self.state));
    }

    fn start_countdown(&mut self) {
        self.state.reset_remaining();
        self.timer
            .start(self.state.timer_mode(), self.state.time_limit_secs());
        self.state.set_timer_active(true);
    }

    fn stop_countdown(&mut self) {
        self.timer.stop();
        self.state.set_timer_active(false);
    }

    /// Tentatively choose `letter` for the current question.
    pub fn select_pending(&mut self, letter: Letter) -> bool {
        let changed = self.state.select_pending(letter);
        if changed {
            self.publish();
        }
        changed
    }

    /// Commit the pending selection for the current question.
    ///
    /// In per-question mode a successful commit stops the countdown and
    /// schedules the reveal-pause advance.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSelection` if the question is open and nothing is selected.
    pub fn commit_answer(&mut self) -> Result<CommitOutcome, SessionError> {
        let outcome = self.state.commit_pending()?;
        self.after_commit(outcome);
        Ok(outcome)
    }

    fn commit_timeout(&mut self) -> CommitOutcome {
        let outcome = self.state.commit_timeout();
        self.after_commit(outcome);
        outcome
    }

    fn after_commit(&mut self, outcome: CommitOutcome) {
        let CommitOutcome::Committed(letter) = outcome else {
            debug!(?outcome, index = self.state.current_index(), "commit ignored");
            return;
        };
        let index = self.state.current_index();
        debug!(index, ?letter, "answer committed");

        if self.state.timer_mode().is_per_question() {
            self.stop_countdown();
            if !self.state.is_last() {
                self.timer
                    .schedule_reveal(index, self.timer_settings.reveal_pause);
            }
        }
        self.publish();
    }

    /// Move to the next question. No-op at the last question.
    ///
    /// In per-question mode, before submission, the countdown restarts at
    /// the full limit for the new question.
    pub fn advance(&mut self) -> bool {
        if !self.state.advance() {
            return false;
        }
        self.timer.cancel_reveal();
        if self.state.navigation_locked() {
            self.start_countdown();
        }
        debug!(index = self.state.current_index(), "advanced");
        self.publish();
        true
    }

    /// Move to the previous question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NavigationLocked` in per-question mode before submission.
    pub fn retreat(&mut self) -> Result<bool, SessionError> {
        let moved = self.state.retreat()?;
        if moved {
            self.publish();
        }
        Ok(moved)
    }

    /// Jump to question `index` (zero-based).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NavigationLocked` in per-question mode before submission,
    /// or `SessionError::OutOfRange` for an unknown index.
    pub fn jump_to(&mut self, index: usize) -> Result<bool, SessionError> {
        let moved = self.state.jump_to(index)?;
        self.publish();
        Ok(moved)
    }

    /// Flip the review flag of the current question.
    pub fn toggle_flag(&mut self) -> bool {
        let changed = self.state.toggle_flag();
        if changed {
            self.publish();
        }
        changed
    }

    /// Submit the quiz, stop all timers and score it.
    ///
    /// Returns the summary on the first call and `None` afterwards.
    pub fn finish_all(&mut self) -> Option<QuizSummary> {
        if self.state.is_submitted() {
            return None;
        }
        self.timer.shutdown();
        let summary = self.state.finish(self.clock.now()).cloned();
        if let Some(summary) = &summary {
            info!(
                total = summary.total(),
                correct = summary.correct(),
                wrong = summary.wrong(),
                attempted = summary.attempted(),
                marked = summary.marked(),
                "quiz submitted"
            );
        }
        self.publish();
        summary
    }

    /// Wait for the next timer intent.
    ///
    /// Cancel-safe, so it can sit in a `tokio::select!` next to user input.
    pub async fn next_timer_event(&mut self) -> Option<TimerEvent> {
        self.events.recv().await
    }

    /// Apply a timer intent. Events from stopped or replaced runs are ignored.
    pub fn handle_timer_event(&mut self, event: TimerEvent) {
        if self.state.is_submitted() || !self.timer.accept(&event) {
            return;
        }

        match event {
            TimerEvent::Tick { remaining_secs, .. } => {
                self.state.set_remaining(remaining_secs);
                self.publish();
            }
            TimerEvent::Expired { action, .. } => {
                self.state.set_timer_active(false);
                debug!(?action, index = self.state.current_index(), "countdown expired");
                match action {
                    TimeoutAction::FinishAll => {
                        self.finish_all();
                    }
                    TimeoutAction::CommitCurrent => {
                        let last = self.state.is_last();
                        self.commit_timeout();
                        if last && self.timer_settings.finish_on_last_timeout {
                            self.finish_all();
                        } else {
                            self.publish();
                        }
                    }
                }
            }
            TimerEvent::RevealElapsed { from_index, .. } => {
                if self.state.current_index() == from_index {
                    self.advance();
                }
            }
        }
    }

    /// Wait for one timer intent and apply it.
    ///
    /// Returns false if the event stream has closed.
    pub async fn pump_timer(&mut self) -> bool {
        match self.next_timer_event().await {
            Some(event) => {
                self.handle_timer_event(event);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("timer", &self.timer)
            .field("timer_settings", &self.timer_settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Record, TimerMode};
    use quiz_core::time::fixed_now;
    use std::time::Duration;
    use tokio::time::Instant;

    use crate::sessions::state::AnswerSlot;

    fn question(n: usize, correct: Letter) -> Question {
        let recs: Vec<Record> = (0..4)
            .map(|i| Record::new(format!("idiom {n}.{i}"), format!("meaning {n}.{i}")))
            .collect();
        Question::from_ordered(Letter::ALL.map(|l| (&recs[l.index()], l == correct))).unwrap()
    }

    fn controller(correct: &[Letter], mode: TimerMode, limit: u32) -> SessionController {
        let items = correct
            .iter()
            .enumerate()
            .map(|(n, l)| question(n, *l))
            .collect();
        let settings = QuizSettings::new(None, limit, mode);
        SessionController::initialize(
            items,
            &settings,
            TimerSettings::default(),
            Clock::fixed(fixed_now()),
        )
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn overall_timeout_submits_everything() {
        let mut c = controller(&[Letter::A, Letter::B], TimerMode::Overall, 1);
        let started = Instant::now();

        while !c.state().is_submitted() {
            assert!(c.pump_timer().await);
        }

        assert_eq!(started.elapsed(), Duration::from_secs(1));
        assert_eq!(c.state().answers(), vec![None, None]);
        let summary = c.state().summary().unwrap();
        assert_eq!(summary.correct(), 0);
        assert_eq!(summary.total(), 2);
        assert!(!c.state().timer_active());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_update_the_timer_display() {
        let mut c = controller(&[Letter::A], TimerMode::Overall, 90);
        let mut views = c.subscribe();
        assert_eq!(views.borrow_and_update().timer, "01:30");

        assert!(c.pump_timer().await);
        assert!(views.has_changed().unwrap());
        assert_eq!(views.borrow_and_update().timer, "01:29");
        assert_eq!(c.state().remaining_secs(), 89);
    }

    #[tokio::test(start_paused = true)]
    async fn per_question_timeout_commits_then_advances_after_pause() {
        let mut c = controller(&[Letter::A, Letter::B, Letter::C], TimerMode::PerQuestion, 1);
        let started = Instant::now();
        c.select_pending(Letter::B);

        // tick to zero, then expiry
        while c.state().slot(0) == Some(AnswerSlot::Open) {
            assert!(c.pump_timer().await);
        }
        assert_eq!(c.state().slot(0), Some(AnswerSlot::Committed(None)));
        assert_eq!(c.state().current_index(), 0);
        assert!(c.view().feedback.is_some());

        assert!(c.pump_timer().await);
        assert_eq!(c.state().current_index(), 1);
        assert_eq!(started.elapsed(), Duration::from_millis(2500));
        assert_eq!(c.state().remaining_secs(), 1);
        assert!(c.state().timer_active());
        assert_eq!(c.state().pending(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_commit_in_per_question_mode_stops_countdown_and_advances() {
        let mut c = controller(&[Letter::A, Letter::B], TimerMode::PerQuestion, 30);
        c.select_pending(Letter::A);
        assert_eq!(c.commit_answer(), Ok(CommitOutcome::Committed(Some(Letter::A))));
        assert!(!c.state().timer_active());

        let started = Instant::now();
        assert!(c.pump_timer().await);
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
        assert_eq!(c.state().current_index(), 1);
        assert_eq!(c.state().remaining_secs(), 30);
        assert!(c.state().timer_active());
    }

    #[tokio::test(start_paused = true)]
    async fn manual_and_timeout_commit_race_has_one_winner() {
        let mut c = controller(&[Letter::A, Letter::B], TimerMode::PerQuestion, 1);
        c.select_pending(Letter::A);

        // Let the countdown reach zero while the user is still "clicking".
        let tick = c.next_timer_event().await.unwrap();
        let expired = c.next_timer_event().await.unwrap();
        assert!(matches!(expired, TimerEvent::Expired { .. }));

        c.handle_timer_event(tick);
        assert_eq!(c.commit_answer(), Ok(CommitOutcome::Committed(Some(Letter::A))));
        c.handle_timer_event(expired);

        assert_eq!(c.state().slot(0), Some(AnswerSlot::Committed(Some(Letter::A))));
    }

    #[tokio::test(start_paused = true)]
    async fn last_question_timeout_commits_without_finishing() {
        let mut c = controller(&[Letter::A], TimerMode::PerQuestion, 1);
        while c.state().slot(0) == Some(AnswerSlot::Open) {
            assert!(c.pump_timer().await);
        }
        assert_eq!(c.state().current_index(), 0);
        assert!(!c.state().is_submitted());
        assert!(!c.timer.is_active());
        assert!(!c.timer.reveal_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn last_question_timeout_can_finish_when_configured() {
        let settings = QuizSettings::new(None, 1, TimerMode::PerQuestion);
        let timer_settings = TimerSettings {
            finish_on_last_timeout: true,
            ..TimerSettings::default()
        };
        let mut c = SessionController::initialize(
            vec![question(0, Letter::A)],
            &settings,
            timer_settings,
            Clock::fixed(fixed_now()),
        )
        .unwrap();

        while !c.state().is_submitted() {
            assert!(c.pump_timer().await);
        }
        assert_eq!(c.state().summary().map(QuizSummary::attempted), Some(0));
    }

    #[tokio::test(start_paused = true)]
    async fn manual_next_during_reveal_pause_does_not_double_advance() {
        let mut c = controller(&[Letter::A, Letter::B, Letter::C], TimerMode::PerQuestion, 30);
        c.select_pending(Letter::A);
        c.commit_answer().unwrap();
        assert!(c.advance());
        assert_eq!(c.state().current_index(), 1);

        // Next event is a tick of question 1's countdown, not a second advance.
        assert!(c.pump_timer().await);
        assert_eq!(c.state().current_index(), 1);
        assert_eq!(c.state().remaining_secs(), 29);
    }

    #[tokio::test(start_paused = true)]
    async fn per_question_navigation_is_forward_only() {
        let mut c = controller(&[Letter::A, Letter::B, Letter::C], TimerMode::PerQuestion, 30);
        c.advance();
        assert!(c.retreat().is_err());
        assert!(c.jump_to(0).is_err());
        assert_eq!(c.state().current_index(), 1);
        assert!(c.jump_to(2).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn overall_mode_allows_free_navigation_and_keeps_timer() {
        let mut c = controller(&[Letter::A, Letter::B, Letter::C], TimerMode::Overall, 30);
        c.select_pending(Letter::B);
        c.commit_answer().unwrap();
        assert!(c.state().timer_active());

        assert_eq!(c.jump_to(2), Ok(true));
        assert_eq!(c.retreat(), Ok(true));
        assert_eq!(c.state().current_index(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn finish_all_is_idempotent_and_silences_timer() {
        let mut c = controller(&[Letter::A, Letter::B], TimerMode::Overall, 5);
        c.toggle_flag();
        let summary = c.finish_all().unwrap();
        assert_eq!(summary.marked(), 1);
        assert!(c.finish_all().is_none());

        // Nothing may land after the stop.
        tokio::time::sleep(Duration::from_secs(10)).await;
        while let Ok(event) = c.events.try_recv() {
            c.handle_timer_event(event);
        }
        assert_eq!(c.state().remaining_secs(), 5);
        assert!(!c.toggle_flag());
    }

    #[tokio::test(start_paused = true)]
    async fn commit_without_selection_is_reported() {
        let mut c = controller(&[Letter::A], TimerMode::Overall, 5);
        assert_eq!(c.commit_answer(), Err(SessionError::NoSelection));
        assert!(c.state().timer_active());
    }
}
