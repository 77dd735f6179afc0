use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;

use super::catalog::{CatalogError, QuestionCatalog};
use super::dashboard::{DashboardDocumentError, DashboardState};
use super::rules::{RuleBook, RuleBookError};
use super::scoring::{ScoringEngine, ScoringProfile, ScoringProfileError};
use super::service::QuizService;
use super::store::{DashboardStore, JsonFileDashboardStore, JsonFileHistoryStore, StoreError};

pub type FileQuizService = QuizService<JsonFileDashboardStore, JsonFileHistoryStore>;

/// Load every configuration document and build a file-backed service.
///
/// Fails when the catalog, scoring profile, rules, or initial snapshot cannot be read,
/// when the rules reference badges or objectives missing from the snapshot, or when the
/// live dashboard is unreadable.
pub fn build_file_service(storage: &StorageConfig) -> Result<FileQuizService, QuizSetupError> {
    let service = open_file_service(storage)?;
    JsonFileDashboardStore::new(&storage.dashboard_path)
        .load()
        .map_err(QuizSetupError::Dashboard)?;
    Ok(service)
}

/// Like [`build_file_service`] without requiring the live dashboard to exist yet.
pub fn open_file_service(storage: &StorageConfig) -> Result<FileQuizService, QuizSetupError> {
    let catalog = Arc::new(QuestionCatalog::from_path(&storage.catalog_path)?);
    let profile = ScoringProfile::from_path(&storage.scoring_path)?;
    let rules = RuleBook::from_path(&storage.rules_path)?;
    let initial = DashboardState::from_path(&storage.initial_dashboard_path)?;
    rules.validate_against(&initial)?;

    info!(
        questions = catalog.len(),
        rules = rules.len(),
        total_max = profile.total_max(),
        "quiz configuration loaded"
    );

    Ok(QuizService::new(
        ScoringEngine::new(catalog, profile),
        Arc::new(rules),
        Arc::new(initial),
        Arc::new(JsonFileDashboardStore::new(&storage.dashboard_path)),
        Arc::new(JsonFileHistoryStore::new(&storage.history_path)),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum QuizSetupError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Scoring(#[from] ScoringProfileError),
    #[error(transparent)]
    Rules(#[from] RuleBookError),
    #[error(transparent)]
    Snapshot(#[from] DashboardDocumentError),
    #[error("live dashboard unavailable: {0}")]
    Dashboard(#[source] StoreError),
}
