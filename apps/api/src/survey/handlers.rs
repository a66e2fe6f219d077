use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Dimension, NormalizationReport, SurveyLayout};
use crate::report::pipeline::{load_survey, score_client};
use crate::routes::upload::UploadForm;
use crate::scoring::StatusTier;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub layout: SurveyLayout,
    pub clients: Vec<String>,
    pub report: NormalizationReport,
}

#[derive(Debug, Serialize)]
pub struct ScoredDimension {
    pub dimension: Dimension,
    pub score: Option<f64>,
    pub status: Option<StatusTier>,
    pub responses: usize,
}

#[derive(Debug, Serialize)]
pub struct ScoresResponse {
    pub client: String,
    pub layout: SurveyLayout,
    pub scores: Vec<ScoredDimension>,
    pub report: NormalizationReport,
}

/// POST /api/v1/surveys/clients
pub async fn handle_list_clients(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ClientListResponse>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let survey = load_survey(state.question_map.clone(), form.upload).await?;
    Ok(Json(ClientListResponse {
        clients: survey.clients(),
        layout: survey.layout,
        report: survey.report,
    }))
}

/// POST /api/v1/surveys/scores
pub async fn handle_scores(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ScoresResponse>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let client = form.require_client()?.to_string();
    let survey = load_survey(state.question_map.clone(), form.upload).await?;
    let scored = score_client(&survey, &client)?;

    let thresholds = state.config.status_thresholds;
    let scores = scored
        .scores
        .entries()
        .iter()
        .map(|entry| ScoredDimension {
            dimension: entry.dimension,
            score: entry.score,
            status: entry.score.map(|s| thresholds.classify(s)),
            responses: entry.responses,
        })
        .collect();

    Ok(Json(ScoresResponse {
        client: scored.client,
        layout: scored.layout,
        scores,
        report: scored.report,
    }))
}
