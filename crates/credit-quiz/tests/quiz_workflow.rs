//! End-to-end scenarios for the questionnaire service backed by the reference data
//! documents, exercised through the public service facade and HTTP router.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use credit_quiz::config::StorageConfig;
use credit_quiz::quiz::{
    build_file_service, open_file_service, quiz_router, QuizSetupError, RiskLevel, RuleBookError,
    UserAnswer,
};

fn reference_data_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data")
}

/// Copy the reference documents into a scratch directory so tests never touch the repo copy.
fn scratch_storage() -> (tempfile::TempDir, StorageConfig) {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in [
        "questions.json",
        "scoring.json",
        "answer_rules.json",
        "dashboard_initial.json",
        "dashboard.json",
    ] {
        fs::copy(reference_data_dir().join(name), dir.path().join(name))
            .unwrap_or_else(|err| panic!("copy {name}: {err}"));
    }
    let storage = StorageConfig::in_dir(dir.path());
    (dir, storage)
}

async fn call(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request builds")
}

fn post(uri: &str, payload: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request builds")
}

#[test]
fn reference_configuration_loads_and_totals_seventy_six() {
    let (_dir, storage) = scratch_storage();
    let service = build_file_service(&storage).expect("reference data is consistent");

    assert_eq!(service.engine().profile().total_max(), 76);
    assert_eq!(service.questions().len(), 16);
}

#[test]
fn reserves_answer_matches_reference_example() {
    let (_dir, storage) = scratch_storage();
    let service = build_file_service(&storage).expect("service builds");

    let result = service
        .submit(&[UserAnswer::new("Mantém reservas financeiras?", "Sim")])
        .expect("submission succeeds");

    assert_eq!(result.total_points, 1);
    assert!((result.category_results[0].percentage - 3.846).abs() < 0.01);
    assert!((result.score_percentage - 1.316).abs() < 0.01);
    assert_eq!(result.risk_level, RiskLevel::HighRisk);

    let state = service.dashboard().expect("dashboard loads");
    assert_eq!(state.badge("preparacao").map(|badge| badge.level), Some(1));
    assert_eq!(state.objective_completed("obj_reservas"), Some(true));

    let persisted: Value = serde_json::from_str(
        &fs::read_to_string(&storage.dashboard_path).expect("dashboard written"),
    )
    .expect("dashboard is json");
    assert_eq!(persisted["badges"][0]["nome"], "Preparação");
    assert_eq!(persisted["pilares"][0]["objetivos"][0]["concluido"], true);

    let history: Value = serde_json::from_str(
        &fs::read_to_string(&storage.history_path).expect("history written"),
    )
    .expect("history is json");
    assert_eq!(history[0]["total_points"], 1);
    assert!(history[0]["timestamp"].is_string());
}

#[test]
fn perfect_submission_is_approved() {
    let (_dir, storage) = scratch_storage();
    let service = build_file_service(&storage).expect("service builds");

    let answers: Vec<UserAnswer> = service
        .engine()
        .catalog()
        .questions()
        .iter()
        .map(|question| {
            let best = question
                .options
                .iter()
                .max_by_key(|option| option.weight)
                .expect("question has options");
            UserAnswer::new(question.text.clone(), best.label.clone())
        })
        .collect();

    let result = service.submit(&answers).expect("submission succeeds");
    assert_eq!(result.total_points, 76);
    assert_eq!(result.score_percentage, 100.0);
    assert_eq!(result.risk_level, RiskLevel::LowRisk);
    assert!(result
        .category_results
        .iter()
        .all(|category| category.percentage == 100.0));

    let state = service.dashboard().expect("dashboard loads");
    assert!(state
        .pillars
        .iter()
        .all(|pillar| pillar.progress == 100.0));
}

#[test]
fn missing_live_dashboard_fails_startup_but_reset_can_seed_it() {
    let (_dir, storage) = scratch_storage();
    fs::remove_file(&storage.dashboard_path).expect("remove live dashboard");

    assert!(matches!(
        build_file_service(&storage),
        Err(QuizSetupError::Dashboard(_))
    ));

    let service = open_file_service(&storage).expect("configuration still loads");
    let restored = service.reset().expect("reset seeds the dashboard");
    assert_eq!(&restored, service.initial_snapshot());
    build_file_service(&storage).expect("dashboard now present");
}

#[test]
fn rules_referencing_unknown_badges_are_rejected_at_startup() {
    let (_dir, storage) = scratch_storage();
    fs::write(
        &storage.rules_path,
        json!({
            "Mantém reservas financeiras?": {
                "badge_id": "inexistente",
                "objective_id": "obj_reservas",
                "levels": { "Sim": 1 }
            }
        })
        .to_string(),
    )
    .expect("write rules");

    assert!(matches!(
        open_file_service(&storage),
        Err(QuizSetupError::Rules(RuleBookError::UnknownBadge { .. }))
    ));
}

#[tokio::test]
async fn http_flow_scores_then_resets() {
    let (_dir, storage) = scratch_storage();
    let service = Arc::new(build_file_service(&storage).expect("service builds"));
    let router = quiz_router(service);

    let (status, questions) = call(&router, get("/questions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(questions[0]["text"], "Mantém reservas financeiras?");

    let (status, result) = call(
        &router,
        post(
            "/result",
            json!([
                { "question_text": "Mantém reservas financeiras?", "answer": "Sim" },
                { "question_text": "Pergunta que não existe?", "answer": "Sim" }
            ]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["total_points"], 1);
    assert_eq!(result["category_results"].as_array().map(Vec::len), Some(1));

    let (_, history) = call(&router, get("/history")).await;
    assert_eq!(history.as_array().map(Vec::len), Some(1));

    let (status, _) = call(&router, post("/reset", Value::Null)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = call(&router, get("/history")).await;
    assert_eq!(history, json!([]));

    let (_, dashboard) = call(&router, get("/dashboard")).await;
    let initial: Value = serde_json::from_str(
        &fs::read_to_string(&storage.initial_dashboard_path).expect("snapshot readable"),
    )
    .expect("snapshot is json");
    assert_eq!(dashboard, initial);
}
