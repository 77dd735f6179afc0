use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::QuestionCatalog;

/// Score at or above which a submission is classified low risk.
pub const LOW_RISK_THRESHOLD: f64 = 80.0;
/// Score at or above which a submission is classified medium risk.
pub const MEDIUM_RISK_THRESHOLD: f64 = 60.0;

/// Answer submitted by the caller, matched against the catalog by trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    #[serde(alias = "texto_pergunta")]
    pub question_text: String,
    #[serde(alias = "resposta")]
    pub answer: String,
}

impl UserAnswer {
    pub fn new(question_text: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question_text: question_text.into(),
            answer: answer.into(),
        }
    }
}

/// Read a JSON array of answers, as posted to `/result`.
pub fn read_answers(path: impl AsRef<Path>) -> Result<Vec<UserAnswer>, UserAnswerFileError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| UserAnswerFileError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| UserAnswerFileError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum UserAnswerFileError {
    #[error("unable to read answers at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("answers at {path} must be a JSON array of {{question_text, answer}}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub points: u32,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    LowRisk,
    MediumRisk,
    HighRisk,
}

impl RiskLevel {
    /// Closed lower bounds: 80.0 is low risk, 60.0 is medium risk.
    pub fn classify(score_percentage: f64) -> Self {
        if score_percentage >= LOW_RISK_THRESHOLD {
            RiskLevel::LowRisk
        } else if score_percentage >= MEDIUM_RISK_THRESHOLD {
            RiskLevel::MediumRisk
        } else {
            RiskLevel::HighRisk
        }
    }

    pub fn recommended_decision(self) -> RecommendedDecision {
        match self {
            RiskLevel::LowRisk => RecommendedDecision::Approve,
            RiskLevel::MediumRisk => RecommendedDecision::FurtherReview,
            RiskLevel::HighRisk => RecommendedDecision::Reject,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::LowRisk => "low risk",
            RiskLevel::MediumRisk => "medium risk",
            RiskLevel::HighRisk => "high risk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendedDecision {
    Approve,
    FurtherReview,
    Reject,
}

impl RecommendedDecision {
    pub fn label(self) -> &'static str {
        match self {
            RecommendedDecision::Approve => "approve",
            RecommendedDecision::FurtherReview => "further review",
            RecommendedDecision::Reject => "reject",
        }
    }
}

/// Outcome of scoring one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub total_points: u32,
    pub category_results: Vec<CategoryResult>,
    pub score_percentage: f64,
    pub risk_level: RiskLevel,
    pub recommended_decision: RecommendedDecision,
}

/// Category maxima used to normalize raw points into percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringProfile {
    pub category_max: BTreeMap<String, u32>,
    /// Defaults to the sum of `category_max` when absent from the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    total_max: Option<u32>,
}

impl ScoringProfile {
    pub fn new(category_max: BTreeMap<String, u32>) -> Self {
        Self {
            category_max,
            total_max: None,
        }
    }

    pub fn with_total_max(mut self, total_max: u32) -> Self {
        self.total_max = Some(total_max);
        self
    }

    /// Reference configuration of the questionnaire.
    pub fn standard() -> Self {
        let category_max = [("Social", 26), ("Financeiro", 30), ("Analítico", 20)]
            .into_iter()
            .map(|(category, max)| (category.to_string(), max))
            .collect();
        Self::new(category_max)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScoringProfileError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ScoringProfileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn total_max(&self) -> u32 {
        self.total_max.unwrap_or_else(|| {
            self.category_max
                .values()
                .fold(0u32, |total, max| total.saturating_add(*max))
        })
    }

    /// Unlisted categories fall back to a maximum of 1.
    pub fn category_max(&self, category: &str) -> u32 {
        self.category_max.get(category).copied().unwrap_or(1)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ScoringProfileError {
    #[error("unable to read scoring profile at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("scoring profile is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Lookup misses seen while scoring; they never fail a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoreDiagnostics {
    pub matched_answers: usize,
    pub unmatched_questions: usize,
    pub unmatched_answers: usize,
}

/// Result paired with the diagnostics gathered while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSubmission {
    pub result: FinalResult,
    pub diagnostics: ScoreDiagnostics,
}

/// Stateless scorer binding a catalog to its normalization profile.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    catalog: Arc<QuestionCatalog>,
    profile: ScoringProfile,
}

impl ScoringEngine {
    pub fn new(catalog: Arc<QuestionCatalog>, profile: ScoringProfile) -> Self {
        Self { catalog, profile }
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn profile(&self) -> &ScoringProfile {
        &self.profile
    }

    pub fn score(&self, answers: &[UserAnswer]) -> ScoredSubmission {
        score_with_diagnostics(answers, &self.catalog, &self.profile)
    }
}

/// Score a submission against the catalog.
pub fn score(
    answers: &[UserAnswer],
    catalog: &QuestionCatalog,
    profile: &ScoringProfile,
) -> FinalResult {
    score_with_diagnostics(answers, catalog, profile).result
}

pub fn score_with_diagnostics(
    answers: &[UserAnswer],
    catalog: &QuestionCatalog,
    profile: &ScoringProfile,
) -> ScoredSubmission {
    let mut diagnostics = ScoreDiagnostics::default();
    let mut category_points: Vec<(String, u32)> = Vec::new();
    let mut total_points: u32 = 0;

    for user_answer in answers {
        let Some(question) = catalog.find(&user_answer.question_text) else {
            diagnostics.unmatched_questions += 1;
            continue;
        };

        let weight = match question.weight_for(&user_answer.answer) {
            Some(weight) => {
                diagnostics.matched_answers += 1;
                weight
            }
            None => {
                diagnostics.unmatched_answers += 1;
                0
            }
        };

        match category_points
            .iter_mut()
            .find(|(category, _)| *category == question.category)
        {
            Some((_, points)) => *points = points.saturating_add(weight),
            None => category_points.push((question.category.clone(), weight)),
        }
        total_points = total_points.saturating_add(weight);
    }

    let category_results = category_points
        .into_iter()
        .map(|(category, points)| {
            let percentage = percentage(points, profile.category_max(&category));
            CategoryResult {
                category,
                points,
                percentage,
            }
        })
        .collect();

    let score_percentage = percentage(total_points, profile.total_max());
    let risk_level = RiskLevel::classify(score_percentage);

    ScoredSubmission {
        result: FinalResult {
            total_points,
            category_results,
            score_percentage,
            risk_level,
            recommended_decision: risk_level.recommended_decision(),
        },
        diagnostics,
    }
}

/// A zero maximum yields 0% rather than NaN or infinity.
fn percentage(points: u32, max: u32) -> f64 {
    if max == 0 {
        return 0.0;
    }
    f64::from(points) / f64::from(max) * 100.0
}
