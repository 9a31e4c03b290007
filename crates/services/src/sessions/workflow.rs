use std::sync::Arc;

use quiz_core::model::{QuizSettings, Record};
use quiz_core::{Clock, QuestionSetBuilder};
use storage::RecordSource;
use tracing::debug;

use super::controller::SessionController;
use super::timer::TimerSettings;
use crate::error::SetupError;

/// Orchestrates quiz setup: load records, build questions, start a session.
///
/// Records are cached after the first load so a retry reuses them without
/// touching the source again. Swapping the source replaces the cache.
pub struct QuizLoopService {
    clock: Clock,
    source: Arc<dyn RecordSource>,
    settings: QuizSettings,
    timer_settings: TimerSettings,
    records: Option<Arc<[Record]>>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(clock: Clock, source: Arc<dyn RecordSource>, settings: QuizSettings) -> Self {
        Self {
            clock,
            source,
            settings,
            timer_settings: TimerSettings::default(),
            records: None,
        }
    }

    #[must_use]
    pub fn with_timer_settings(mut self, timer_settings: TimerSettings) -> Self {
        self.timer_settings = timer_settings;
        self
    }

    /// Start a session from a different data source.
    ///
    /// The swap only happens once the new source has loaded and produced a
    /// session; on error the previous source and its cached records stay.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if loading, question building or session setup fails.
    pub async fn replace_source(
        &mut self,
        source: Arc<dyn RecordSource>,
    ) -> Result<SessionController, SetupError> {
        let records: Arc<[Record]> = source.load_records().await?.into();
        let controller = self.start_with(&records)?;
        debug!(count = records.len(), "switched record source");
        self.source = source;
        self.records = Some(records);
        Ok(controller)
    }

    /// Load records from the source (refreshing the cache) and start a session.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if loading, question building or session setup fails.
    pub async fn start(&mut self) -> Result<SessionController, SetupError> {
        let records: Arc<[Record]> = self.source.load_records().await?.into();
        debug!(count = records.len(), "records loaded");
        self.records = Some(Arc::clone(&records));
        self.start_with(&records)
    }

    /// Start a fresh session from the cached records, loading them first if needed.
    ///
    /// With a seed the retry reproduces the previous quiz; without one it is
    /// reshuffled.
    ///
    /// # Errors
    ///
    /// Returns `SetupError` if loading, question building or session setup fails.
    pub async fn retry(&mut self) -> Result<SessionController, SetupError> {
        match self.records.clone() {
            Some(records) => self.start_with(&records),
            None => self.start().await,
        }
    }

    fn start_with(&self, records: &[Record]) -> Result<SessionController, SetupError> {
        let questions = QuestionSetBuilder::new()
            .with_seed(self.settings.seed())
            .build(records)?;
        let controller = SessionController::initialize(
            questions,
            &self.settings,
            self.timer_settings,
            self.clock,
        )?;
        Ok(controller)
    }
}
