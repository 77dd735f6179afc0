use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use super::catalog::QuestionView;
use super::dashboard::DashboardState;
use super::history::HistoryEntry;
use super::reconcile::reconcile;
use super::rules::RuleBook;
use super::scoring::{FinalResult, ScoredSubmission, ScoringEngine, UserAnswer};
use super::store::{DashboardStore, HistoryStore, StoreError};

/// Service composing the scorer, reconciler, and the two persisted documents.
///
/// Every operation touching the dashboard or history runs under one writer lock;
/// submissions are applied one at a time.
pub struct QuizService<D, H> {
    engine: ScoringEngine,
    rules: Arc<RuleBook>,
    initial: Arc<DashboardState>,
    dashboard: Arc<D>,
    history: Arc<H>,
    writer: Mutex<()>,
}

impl<D, H> QuizService<D, H>
where
    D: DashboardStore + 'static,
    H: HistoryStore + 'static,
{
    pub fn new(
        engine: ScoringEngine,
        rules: Arc<RuleBook>,
        initial: Arc<DashboardState>,
        dashboard: Arc<D>,
        history: Arc<H>,
    ) -> Self {
        Self {
            engine,
            rules,
            initial,
            dashboard,
            history,
            writer: Mutex::new(()),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn initial_snapshot(&self) -> &DashboardState {
        &self.initial
    }

    /// Catalog projection for the questionnaire front-end.
    pub fn questions(&self) -> Vec<QuestionView> {
        self.engine.catalog().views()
    }

    /// Score a submission, fold it into the dashboard, and record it in history.
    pub fn submit(&self, answers: &[UserAnswer]) -> Result<FinalResult, QuizServiceError> {
        self.submit_scored(answers).map(|scored| scored.result)
    }

    /// Same as [`QuizService::submit`], keeping the scoring diagnostics.
    pub fn submit_scored(
        &self,
        answers: &[UserAnswer],
    ) -> Result<ScoredSubmission, QuizServiceError> {
        let scored = self.engine.score(answers);
        let diagnostics = scored.diagnostics;
        if diagnostics.unmatched_questions > 0 || diagnostics.unmatched_answers > 0 {
            debug!(
                unmatched_questions = diagnostics.unmatched_questions,
                unmatched_answers = diagnostics.unmatched_answers,
                "submission contained answers outside the catalog"
            );
        }

        let _writer = self.lock();
        let previous = self.dashboard.load()?;
        let mut state = previous.clone();
        let report = reconcile(&scored.result, answers, &mut state, &self.rules);
        if report.miss_count() > 0 {
            debug!(
                unmatched_categories = report.unmatched_categories,
                answers_without_rule = report.answers_without_rule,
                unknown_badges = report.unknown_badges,
                unknown_objectives = report.unknown_objectives,
                "dashboard lookups missed"
            );
        }
        self.dashboard.save(&state)?;
        if let Err(err) = self.history.append(HistoryEntry::now(scored.result.clone())) {
            self.restore_dashboard(&previous);
            return Err(err.into());
        }

        info!(
            answers = answers.len(),
            matched = diagnostics.matched_answers,
            total_points = scored.result.total_points,
            score_percentage = scored.result.score_percentage,
            risk = scored.result.risk_level.label(),
            badges_raised = report.badges_raised.len(),
            objectives_completed = report.objectives_completed.len(),
            "questionnaire scored"
        );

        Ok(scored)
    }

    pub fn dashboard(&self) -> Result<DashboardState, QuizServiceError> {
        let _writer = self.lock();
        Ok(self.dashboard.load()?)
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        let _writer = self.lock();
        self.history.load()
    }

    /// Restore the initial dashboard snapshot and empty the history log.
    pub fn reset(&self) -> Result<DashboardState, QuizServiceError> {
        let _writer = self.lock();
        // A missing live dashboard is seeded rather than restored on failure.
        let previous = self.dashboard.load().ok();
        let snapshot = DashboardState::clone(&self.initial);
        self.dashboard.save(&snapshot)?;
        if let Err(err) = self.history.clear() {
            if let Some(previous) = &previous {
                self.restore_dashboard(previous);
            }
            return Err(err.into());
        }
        info!("dashboard reset to initial snapshot");
        Ok(snapshot)
    }

    /// Put back the dashboard saved before a write whose history half failed.
    fn restore_dashboard(&self, previous: &DashboardState) {
        match self.dashboard.save(previous) {
            Ok(()) => warn!("history write failed; dashboard change rolled back"),
            Err(err) => error!(error = %err, "history write failed and dashboard rollback failed"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // Guards no data; poisoning is ignored.
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error raised by the quiz service.
#[derive(Debug, thiserror::Error)]
pub enum QuizServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
}
