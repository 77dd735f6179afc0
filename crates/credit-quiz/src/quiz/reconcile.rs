use serde::Serialize;

use super::dashboard::DashboardState;
use super::rules::RuleBook;
use super::scoring::{FinalResult, UserAnswer};

/// Summary of the mutations applied to a dashboard, including lookup misses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub pillars_updated: Vec<String>,
    pub badges_raised: Vec<String>,
    pub objectives_completed: Vec<String>,
    pub unmatched_categories: usize,
    pub answers_without_rule: usize,
    pub unknown_badges: usize,
    pub unknown_objectives: usize,
}

impl ReconcileReport {
    pub fn miss_count(&self) -> usize {
        self.unmatched_categories
            + self.answers_without_rule
            + self.unknown_badges
            + self.unknown_objectives
    }
}

/// Fold a scored submission into the dashboard.
///
/// Overall score and pillar progress are overwritten. Badge levels only rise and
/// completed objectives stay complete. Every lookup miss is a no-op.
pub fn reconcile(
    result: &FinalResult,
    answers: &[UserAnswer],
    state: &mut DashboardState,
    rules: &RuleBook,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    state.overall_score = result.score_percentage;

    for category in &result.category_results {
        let pillar_id = category.category.to_lowercase();
        match state.pillar_mut(&pillar_id) {
            Some(pillar) => {
                pillar.progress = category.percentage;
                report.pillars_updated.push(pillar_id);
            }
            None => report.unmatched_categories += 1,
        }
    }

    for answer in answers {
        let Some(rule) = rules.rule_for(&answer.question_text) else {
            report.answers_without_rule += 1;
            continue;
        };

        let achieved = rule.level_for(&answer.answer);
        let Some(badge) = state.badge_mut(&rule.badge_id) else {
            report.unknown_badges += 1;
            continue;
        };

        if achieved > badge.level {
            badge.level = achieved;
            report.badges_raised.push(badge.id.clone());
        }
        if badge.level == 0 {
            continue;
        }

        if complete_first_objective(state, &rule.objective_id) {
            report.objectives_completed.push(rule.objective_id.clone());
        } else if !state.has_objective(&rule.objective_id) {
            report.unknown_objectives += 1;
        }
    }

    report
}

/// Mark the first objective with `objective_id`, scanning pillars in order and stopping
/// at the first pillar that lists it. Returns true only when the flag flipped.
fn complete_first_objective(state: &mut DashboardState, objective_id: &str) -> bool {
    for pillar in &mut state.pillars {
        if let Some(objective) = pillar
            .objectives
            .iter_mut()
            .find(|objective| objective.id == objective_id)
        {
            let newly_completed = !objective.completed;
            objective.completed = true;
            return newly_completed;
        }
    }
    false
}
