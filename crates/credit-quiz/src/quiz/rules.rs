use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::dashboard::DashboardState;

/// Gamification effect of answering one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRule {
    pub badge_id: String,
    pub objective_id: String,
    /// Achieved badge level per answer text; unlisted answers achieve level 0.
    #[serde(default)]
    pub levels: BTreeMap<String, u32>,
}

impl AnswerRule {
    pub fn level_for(&self, answer: &str) -> u32 {
        let answer = answer.trim();
        self.levels
            .iter()
            .find(|(label, _)| label.trim() == answer)
            .map(|(_, level)| *level)
            .unwrap_or(0)
    }
}

/// Question text -> rule table, kept apart from the catalog weights so the two
/// interpretations can evolve independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleBook {
    rules: BTreeMap<String, AnswerRule>,
}

impl RuleBook {
    pub fn new(rules: BTreeMap<String, AnswerRule>) -> Self {
        Self { rules }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, RuleBookError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| RuleBookError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Rule whose trimmed question text equals the trimmed lookup key.
    pub fn rule_for(&self, question_text: &str) -> Option<&AnswerRule> {
        let key = question_text.trim();
        self.rules.get(key).or_else(|| {
            self.rules
                .iter()
                .find(|(text, _)| text.trim() == key)
                .map(|(_, rule)| rule)
        })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Check every referenced badge and objective exists in the dashboard snapshot.
    pub fn validate_against(&self, snapshot: &DashboardState) -> Result<(), RuleBookError> {
        for (question, rule) in &self.rules {
            if rule.badge_id.trim().is_empty() || rule.objective_id.trim().is_empty() {
                return Err(RuleBookError::EmptyIdentifier {
                    question: question.clone(),
                });
            }
            if snapshot.badge(&rule.badge_id).is_none() {
                return Err(RuleBookError::UnknownBadge {
                    question: question.clone(),
                    badge_id: rule.badge_id.clone(),
                });
            }
            if !snapshot.has_objective(&rule.objective_id) {
                return Err(RuleBookError::UnknownObjective {
                    question: question.clone(),
                    objective_id: rule.objective_id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RuleBookError {
    #[error("unable to read answer rules at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("answer rules are not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rule for '{question}' has an empty badge or objective id")]
    EmptyIdentifier { question: String },
    #[error("rule for '{question}' references unknown badge '{badge_id}'")]
    UnknownBadge { question: String, badge_id: String },
    #[error("rule for '{question}' references unknown objective '{objective_id}'")]
    UnknownObjective {
        question: String,
        objective_id: String,
    },
}
