use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

use super::scoring::UserAnswer;
use super::service::QuizService;
use super::store::{DashboardStore, HistoryStore};
use crate::error::AppError;

/// Router exposing the questionnaire, scoring, dashboard, history, and reset endpoints.
pub fn quiz_router<D, H>(service: Arc<QuizService<D, H>>) -> Router
where
    D: DashboardStore + 'static,
    H: HistoryStore + 'static,
{
    Router::new()
        .route("/questions", get(questions_handler::<D, H>))
        .route("/result", post(result_handler::<D, H>))
        .route("/dashboard", get(dashboard_handler::<D, H>))
        .route("/history", get(history_handler::<D, H>))
        .route("/reset", post(reset_handler::<D, H>))
        .with_state(service)
}

pub(crate) async fn questions_handler<D, H>(
    State(service): State<Arc<QuizService<D, H>>>,
) -> Response
where
    D: DashboardStore + 'static,
    H: HistoryStore + 'static,
{
    (StatusCode::OK, Json(service.questions())).into_response()
}

pub(crate) async fn result_handler<D, H>(
    State(service): State<Arc<QuizService<D, H>>>,
    payload: Result<Json<Vec<UserAnswer>>, JsonRejection>,
) -> Result<Response, AppError>
where
    D: DashboardStore + 'static,
    H: HistoryStore + 'static,
{
    let Json(answers) = payload?;
    let result = service.submit(&answers)?;
    Ok((StatusCode::OK, Json(result)).into_response())
}

pub(crate) async fn dashboard_handler<D, H>(
    State(service): State<Arc<QuizService<D, H>>>,
) -> Result<Response, AppError>
where
    D: DashboardStore + 'static,
    H: HistoryStore + 'static,
{
    let state = service.dashboard()?;
    Ok((StatusCode::OK, Json(state)).into_response())
}

pub(crate) async fn history_handler<D, H>(State(service): State<Arc<QuizService<D, H>>>) -> Response
where
    D: DashboardStore + 'static,
    H: HistoryStore + 'static,
{
    (StatusCode::OK, Json(service.history())).into_response()
}

pub(crate) async fn reset_handler<D, H>(
    State(service): State<Arc<QuizService<D, H>>>,
) -> Result<Response, AppError>
where
    D: DashboardStore + 'static,
    H: HistoryStore + 'static,
{
    let state = service.reset()?;
    Ok((StatusCode::OK, Json(state)).into_response())
}
