use crate::cli::DataDirArg;
use clap::Args;
use credit_quiz::config::AppConfig;
use credit_quiz::error::AppError;
use credit_quiz::quiz::{
    build_file_service, open_file_service, read_answers, DashboardState, FinalResult,
    ScoreDiagnostics,
};
use credit_quiz::telemetry;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON array of {"question_text", "answer"} objects
    #[arg(long)]
    pub(crate) answers: PathBuf,
    /// Apply the submission to the dashboard and history, as POST /result does
    #[arg(long)]
    pub(crate) persist: bool,
    #[command(flatten)]
    pub(crate) data: DataDirArg,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ResetArgs {
    #[command(flatten)]
    pub(crate) data: DataDirArg,
}

fn load_config(data: &DataDirArg) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    data.apply(&mut config);
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        answers,
        persist,
        data,
    } = args;

    let config = load_config(&data)?;
    let answers = read_answers(&answers)?;

    if persist {
        let service = build_file_service(&config.storage)?;
        let scored = service.submit_scored(&answers)?;
        render_result(&scored.result, &scored.diagnostics);
        let state = service.dashboard()?;
        render_dashboard(&state);
    } else {
        let service = open_file_service(&config.storage)?;
        let scored = service.engine().score(&answers);
        render_result(&scored.result, &scored.diagnostics);
    }

    Ok(())
}

pub(crate) fn run_reset(args: ResetArgs) -> Result<(), AppError> {
    let config = load_config(&args.data)?;
    let service = open_file_service(&config.storage)?;
    let state = service.reset()?;
    println!(
        "Dashboard restored from {} and history cleared",
        config.storage.initial_dashboard_path.display()
    );
    render_dashboard(&state);
    Ok(())
}

fn render_result(result: &FinalResult, diagnostics: &ScoreDiagnostics) {
    println!("Questionnaire result");
    println!(
        "Total: {} points ({:.2}%) -> {} / {}",
        result.total_points,
        result.score_percentage,
        result.risk_level.label(),
        result.recommended_decision.label()
    );

    if result.category_results.is_empty() {
        println!("\nCategories: none matched");
    } else {
        println!("\nCategories");
        for category in &result.category_results {
            println!(
                "- {}: {} points ({:.2}%)",
                category.category, category.points, category.percentage
            );
        }
    }

    if diagnostics.unmatched_questions > 0 || diagnostics.unmatched_answers > 0 {
        println!(
            "\nIgnored: {} unknown question(s), {} unknown answer(s)",
            diagnostics.unmatched_questions, diagnostics.unmatched_answers
        );
    }
}

fn render_dashboard(state: &DashboardState) {
    println!("\nDashboard (overall {:.2}%)", state.overall_score);
    for pillar in &state.pillars {
        let done = pillar
            .objectives
            .iter()
            .filter(|objective| objective.completed)
            .count();
        println!(
            "- {}: {:.2}% | objectives {}/{}",
            pillar.id,
            pillar.progress,
            done,
            pillar.objectives.len()
        );
    }

    let earned: Vec<String> = state
        .badges
        .iter()
        .filter(|badge| badge.level > 0)
        .map(|badge| format!("{} (level {})", badge.id, badge.level))
        .collect();
    if earned.is_empty() {
        println!("Badges: none earned");
    } else {
        println!("Badges: {}", earned.join(", "));
    }
}
