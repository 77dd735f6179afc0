use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Checklist item tied to a badge; stays complete until a full reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub id: String,
    #[serde(rename = "concluido", default)]
    pub completed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Progress axis mirroring a questionnaire category (`id` is the lowercased category).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    pub id: String,
    #[serde(rename = "progresso", default)]
    pub progress: f64,
    #[serde(rename = "objetivos", default)]
    pub objectives: Vec<Objective>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    #[serde(rename = "nivel_atual", default)]
    pub level: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Process-wide gamification document. Keys not modelled here (display names,
/// icons, descriptions) round-trip untouched through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardState {
    #[serde(rename = "score_geral", default)]
    pub overall_score: f64,
    #[serde(rename = "pilares", default)]
    pub pillars: Vec<Pillar>,
    #[serde(default)]
    pub badges: Vec<Badge>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DashboardState {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DashboardDocumentError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| DashboardDocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| DashboardDocumentError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn pillar(&self, id: &str) -> Option<&Pillar> {
        self.pillars.iter().find(|pillar| pillar.id == id)
    }

    pub fn pillar_mut(&mut self, id: &str) -> Option<&mut Pillar> {
        self.pillars.iter_mut().find(|pillar| pillar.id == id)
    }

    pub fn badge(&self, id: &str) -> Option<&Badge> {
        self.badges.iter().find(|badge| badge.id == id)
    }

    pub fn badge_mut(&mut self, id: &str) -> Option<&mut Badge> {
        self.badges.iter_mut().find(|badge| badge.id == id)
    }

    /// Whether any pillar lists an objective with this id.
    pub fn has_objective(&self, id: &str) -> bool {
        self.pillars
            .iter()
            .any(|pillar| pillar.objectives.iter().any(|objective| objective.id == id))
    }

    /// Completion flag of the first objective with this id, in pillar order.
    pub fn objective_completed(&self, id: &str) -> Option<bool> {
        self.pillars
            .iter()
            .flat_map(|pillar| pillar.objectives.iter())
            .find(|objective| objective.id == id)
            .map(|objective| objective.completed)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardDocumentError {
    #[error("unable to read dashboard document at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dashboard document at {path} is malformed: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
        "score_geral": 12.5,
        "pilares": [
            {
                "id": "social",
                "nome": "Social",
                "progresso": 40.0,
                "objetivos": [
                    { "id": "obj_reservas", "descricao": "Manter reservas", "concluido": false }
                ]
            }
        ],
        "badges": [
            { "id": "preparacao", "nome": "Preparação", "nivel_atual": 0, "nivel_max": 3 }
        ],
        "usuario": "demo"
    }"#;

    #[test]
    fn parses_persisted_keys() {
        let state: DashboardState = serde_json::from_str(DOCUMENT).expect("document parses");
        assert_eq!(state.overall_score, 12.5);
        assert_eq!(state.pillars[0].progress, 40.0);
        assert_eq!(state.badge("preparacao").map(|badge| badge.level), Some(0));
        assert_eq!(state.objective_completed("obj_reservas"), Some(false));
        assert!(state.has_objective("obj_reservas"));
        assert!(!state.has_objective("obj_inexistente"));
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let state: DashboardState = serde_json::from_str(DOCUMENT).expect("document parses");
        let json = serde_json::to_value(&state).expect("serializes");

        assert_eq!(json["usuario"], "demo");
        assert_eq!(json["pilares"][0]["nome"], "Social");
        assert_eq!(json["pilares"][0]["objetivos"][0]["descricao"], "Manter reservas");
        assert_eq!(json["badges"][0]["nivel_max"], 3);
        assert_eq!(json["badges"][0]["nivel_atual"], 0);
        assert_eq!(json["score_geral"], 12.5);
    }

    #[test]
    fn missing_document_reports_path() {
        let err = DashboardState::from_path("/no/such/dashboard.json").expect_err("missing");
        assert!(err.to_string().contains("/no/such/dashboard.json"));
    }
}
