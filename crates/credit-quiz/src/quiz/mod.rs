//! Credit questionnaire scoring and the gamified dashboard it drives.
//!
//! A submission is scored against the question catalog, folded into the persisted
//! dashboard (pillar progress, badge levels, objectives), and appended to the history
//! log. The scorer and reconciler are pure; persistence sits behind the store traits.

pub mod catalog;
pub mod dashboard;
pub mod history;
pub mod reconcile;
pub mod router;
pub mod rules;
pub mod scoring;
pub mod service;
pub mod setup;
pub mod store;

#[cfg(test)]
mod tests;

pub use catalog::{AnswerOption, CatalogError, Question, QuestionCatalog, QuestionView};
pub use dashboard::{Badge, DashboardDocumentError, DashboardState, Objective, Pillar};
pub use history::HistoryEntry;
pub use reconcile::{reconcile, ReconcileReport};
pub use router::quiz_router;
pub use rules::{AnswerRule, RuleBook, RuleBookError};
pub use scoring::{
    read_answers, score, score_with_diagnostics, CategoryResult, FinalResult,
    RecommendedDecision, RiskLevel, ScoreDiagnostics, ScoredSubmission, ScoringEngine,
    ScoringProfile, ScoringProfileError, UserAnswer, UserAnswerFileError,
};
pub use service::{QuizService, QuizServiceError};
pub use setup::{build_file_service, open_file_service, FileQuizService, QuizSetupError};
pub use store::{
    DashboardStore, HistoryStore, JsonFileDashboardStore, JsonFileHistoryStore, StoreError,
};
