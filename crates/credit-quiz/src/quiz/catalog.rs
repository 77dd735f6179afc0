use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Selectable answer with its scoring weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    #[serde(rename = "resposta")]
    pub label: String,
    #[serde(rename = "peso")]
    pub weight: u32,
}

/// Catalog entry. The text doubles as the key submitted answers are matched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "texto")]
    pub text: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "opcoes")]
    pub options: Vec<AnswerOption>,
}

impl Question {
    /// Weight of the option whose trimmed label equals the trimmed answer.
    pub fn weight_for(&self, answer: &str) -> Option<u32> {
        let answer = answer.trim();
        self.options
            .iter()
            .find(|option| option.label.trim() == answer)
            .map(|option| option.weight)
    }
}

/// Public projection served to the questionnaire front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
    pub category: String,
}

/// Immutable, ordered question set loaded once at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
}

impl QuestionCatalog {
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for question in &questions {
            let key = question.text.trim();
            if !seen.insert(key.to_string()) {
                return Err(CatalogError::DuplicateQuestion(key.to_string()));
            }

            let mut labels = HashSet::new();
            for option in &question.options {
                if !labels.insert(option.label.trim()) {
                    return Err(CatalogError::DuplicateOption {
                        question: key.to_string(),
                        label: option.label.trim().to_string(),
                    });
                }
            }
        }

        Ok(Self { questions })
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, CatalogError> {
        let questions: Vec<Question> = serde_json::from_reader(reader)?;
        Self::new(questions)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question whose trimmed text equals the trimmed lookup key.
    pub fn find(&self, question_text: &str) -> Option<&Question> {
        let key = question_text.trim();
        self.questions
            .iter()
            .find(|question| question.text.trim() == key)
    }

    pub fn views(&self) -> Vec<QuestionView> {
        self.questions
            .iter()
            .map(|question| QuestionView {
                text: question.text.clone(),
                options: question
                    .options
                    .iter()
                    .map(|option| option.label.clone())
                    .collect(),
                category: question.category.clone(),
            })
            .collect()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unable to read question catalog at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("question catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question '{0}' appears more than once in the catalog")]
    DuplicateQuestion(String),
    #[error("question '{question}' lists option '{label}' more than once")]
    DuplicateOption { question: String, label: String },
}
