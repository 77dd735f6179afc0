use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde_json::json;

use crate::quiz::catalog::{AnswerOption, Question, QuestionCatalog};
use crate::quiz::dashboard::DashboardState;
use crate::quiz::history::HistoryEntry;
use crate::quiz::rules::{AnswerRule, RuleBook};
use crate::quiz::scoring::{ScoringEngine, ScoringProfile};
use crate::quiz::service::QuizService;
use crate::quiz::store::{DashboardStore, HistoryStore, StoreError};

pub(super) const RESERVES: &str = "Mantém reservas financeiras?";
pub(super) const OVERDUE_DEBT: &str = "Possui dívidas em atraso?";
pub(super) const BUDGET: &str = "Controla o orçamento mensal?";

pub(super) fn question(text: &str, category: &str, options: &[(&str, u32)]) -> Question {
    Question {
        text: text.to_string(),
        category: category.to_string(),
        options: options
            .iter()
            .map(|(label, weight)| AnswerOption {
                label: label.to_string(),
                weight: *weight,
            })
            .collect(),
    }
}

pub(super) fn catalog() -> QuestionCatalog {
    QuestionCatalog::new(vec![
        question(
            RESERVES,
            "Social",
            &[("Sim", 1), ("Parcialmente", 0), ("Não", 0)],
        ),
        question(OVERDUE_DEBT, "Financeiro", &[("Não", 5), ("Sim", 0)]),
        question(BUDGET, "Financeiro", &[("Sempre", 4), ("Às vezes", 2), ("Nunca", 0)]),
    ])
    .expect("fixture catalog is valid")
}

pub(super) fn rules() -> RuleBook {
    let mut rules = BTreeMap::new();
    rules.insert(
        RESERVES.to_string(),
        AnswerRule {
            badge_id: "preparacao".to_string(),
            objective_id: "obj_reservas".to_string(),
            levels: BTreeMap::from([("Sim".to_string(), 1)]),
        },
    );
    rules.insert(
        BUDGET.to_string(),
        AnswerRule {
            badge_id: "planejador".to_string(),
            objective_id: "obj_orcamento".to_string(),
            levels: BTreeMap::from([("Sempre".to_string(), 2), ("Às vezes".to_string(), 1)]),
        },
    );
    RuleBook::new(rules)
}

pub(super) fn initial_state() -> DashboardState {
    serde_json::from_value(json!({
        "score_geral": 0.0,
        "pilares": [
            { "id": "social", "nome": "Social", "progresso": 0.0, "objetivos": [
                { "id": "obj_reservas", "concluido": false }
            ] },
            { "id": "financeiro", "nome": "Financeiro", "progresso": 0.0, "objetivos": [
                { "id": "obj_orcamento", "concluido": false }
            ] }
        ],
        "badges": [
            { "id": "preparacao", "nivel_atual": 0 },
            { "id": "planejador", "nivel_atual": 0 }
        ]
    }))
    .expect("fixture state parses")
}

#[derive(Default)]
pub(super) struct MemoryDashboard {
    state: Mutex<Option<DashboardState>>,
}

impl MemoryDashboard {
    pub(super) fn with_state(state: DashboardState) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }

    pub(super) fn snapshot(&self) -> Option<DashboardState> {
        self.state.lock().expect("dashboard mutex poisoned").clone()
    }
}

impl DashboardStore for MemoryDashboard {
    fn load(&self) -> Result<DashboardState, StoreError> {
        self.state
            .lock()
            .expect("dashboard mutex poisoned")
            .clone()
            .ok_or_else(|| StoreError::Unavailable("dashboard not seeded".to_string()))
    }

    fn save(&self, state: &DashboardState) -> Result<(), StoreError> {
        *self.state.lock().expect("dashboard mutex poisoned") = Some(state.clone());
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl HistoryStore for MemoryHistory {
    fn load(&self) -> Vec<HistoryEntry> {
        self.entries.lock().expect("history mutex poisoned").clone()
    }

    fn append(&self, entry: HistoryEntry) -> Result<(), StoreError> {
        self.entries
            .lock()
            .expect("history mutex poisoned")
            .push(entry);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.entries.lock().expect("history mutex poisoned").clear();
        Ok(())
    }
}

/// Dashboard store whose writes always fail.
pub(super) struct ReadOnlyDashboard;

impl DashboardStore for ReadOnlyDashboard {
    fn load(&self) -> Result<DashboardState, StoreError> {
        Ok(initial_state())
    }

    fn save(&self, _state: &DashboardState) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("read-only dashboard".to_string()))
    }
}

/// History store whose writes always fail.
pub(super) struct BrokenHistory;

impl HistoryStore for BrokenHistory {
    fn load(&self) -> Vec<HistoryEntry> {
        Vec::new()
    }

    fn append(&self, _entry: HistoryEntry) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("history volume full".to_string()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("history volume full".to_string()))
    }
}

pub(super) fn service_with<D, H>(dashboard: Arc<D>, history: Arc<H>) -> QuizService<D, H>
where
    D: DashboardStore + 'static,
    H: HistoryStore + 'static,
{
    QuizService::new(
        ScoringEngine::new(Arc::new(catalog()), ScoringProfile::standard()),
        Arc::new(rules()),
        Arc::new(initial_state()),
        dashboard,
        history,
    )
}

pub(super) fn build_service() -> (
    Arc<QuizService<MemoryDashboard, MemoryHistory>>,
    Arc<MemoryDashboard>,
    Arc<MemoryHistory>,
) {
    let dashboard = Arc::new(MemoryDashboard::with_state(initial_state()));
    let history = Arc::new(MemoryHistory::default());
    let service = Arc::new(service_with(dashboard.clone(), history.clone()));
    (service, dashboard, history)
}
