//! Report Pipeline: one end-to-end run from uploaded file to PDF on disk.
//!
//! read -> normalize -> scope -> aggregate -> (narrative || chart) -> compose -> write.
//! The pipeline never retries; a failed run is reported and the caller decides.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chart::{render_radar, ChartError};
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::models::{NormalizationReport, SurveyLayout};
use crate::narrative::{generate_narrative, Narrative};
use crate::report::{compose_to_path, snapshot_rows, ComposeError, ReportContent};
use crate::scoring::{aggregate, ScoreMapping, StatusThresholds};
use crate::state::AppState;
use crate::survey::{normalize_survey, read_table, NormalizedSurvey, QuestionMap};

/// An uploaded survey file as received from the client.
#[derive(Debug, Clone)]
pub struct SurveyUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Collaborators for one run. Built from `AppState` per request.
#[derive(Clone)]
pub struct ReportDeps {
    pub question_map: Arc<QuestionMap>,
    pub generator: Arc<dyn TextGenerator>,
    pub thresholds: StatusThresholds,
    pub output_dir: PathBuf,
}

impl ReportDeps {
    pub fn from_state(state: &AppState) -> Self {
        ReportDeps {
            question_map: state.question_map.clone(),
            generator: state.generator.clone(),
            thresholds: state.config.status_thresholds,
            output_dir: state.config.report_output_dir.clone(),
        }
    }
}

/// Scores for one client, plus what normalization saw along the way.
#[derive(Debug, Clone, Serialize)]
pub struct ClientScores {
    pub client: String,
    pub layout: SurveyLayout,
    pub scores: ScoreMapping,
    pub report: NormalizationReport,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedReport {
    pub run_id: Uuid,
    pub client: String,
    pub file_name: String,
    pub path: PathBuf,
    #[serde(skip)]
    pub run_dir: PathBuf,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub scores: ScoreMapping,
    pub narrative: Narrative,
}

impl GeneratedReport {
    /// Removes the run directory and everything in it.
    pub async fn discard(&self) {
        remove_run_dir(&self.run_dir).await;
    }
}

async fn remove_run_dir(run_dir: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(run_dir).await {
        warn!("Failed to remove report run dir {}: {e}", run_dir.display());
    }
}

/// Creates `run_dir` and runs `compose` off the runtime. The directory is
/// removed again when composing fails, so no partial output survives.
async fn compose_in_run_dir<F>(run_dir: &Path, compose: F) -> Result<Vec<u8>, AppError>
where
    F: FnOnce() -> Result<Vec<u8>, ComposeError> + Send + 'static,
{
    tokio::fs::create_dir_all(run_dir).await?;
    let result = tokio::task::spawn_blocking(compose)
        .await
        .map_err(|e| AppError::Internal(anyhow!("Compose task failed: {e}")))
        .and_then(|composed| composed.map_err(AppError::from));
    if result.is_err() {
        remove_run_dir(run_dir).await;
    }
    result
}

/// Parses and normalizes an upload off the async runtime.
pub async fn load_survey(
    question_map: Arc<QuestionMap>,
    upload: SurveyUpload,
) -> Result<NormalizedSurvey, AppError> {
    tokio::task::spawn_blocking(move || -> Result<NormalizedSurvey, AppError> {
        let table = read_table(&upload.file_name, &upload.bytes)?;
        Ok(normalize_survey(&table, &question_map)?)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("Survey parsing task failed: {e}")))?
}

/// Scopes a normalized survey to one client and aggregates its scores.
pub fn score_client(survey: &NormalizedSurvey, client: &str) -> Result<ClientScores, AppError> {
    let records = survey.records_for_client(client)?;
    let scores = aggregate(&records);
    Ok(ClientScores {
        client: records[0].client.clone(),
        layout: survey.layout.clone(),
        scores,
        report: survey.report.clone(),
    })
}

pub async fn generate_report(
    deps: &ReportDeps,
    upload: SurveyUpload,
    client: &str,
) -> Result<GeneratedReport, AppError> {
    let run_id = Uuid::new_v4();
    info!("Report run {run_id}: file='{}', client='{}'", upload.file_name, client);

    let survey = load_survey(deps.question_map.clone(), upload).await?;
    let ClientScores { client, scores, .. } = score_client(&survey, client)?;
    if scores.is_empty() {
        return Err(ChartError::NoData.into());
    }
    let present = scores.present();
    info!(
        "Report run {run_id}: scored {} of 5 dimensions for '{client}'",
        present.len()
    );

    let chart_task = tokio::task::spawn_blocking(move || render_radar(&present));
    let (narrative, chart) = tokio::join!(
        generate_narrative(deps.generator.as_ref(), &scores),
        chart_task
    );
    let chart = chart.map_err(|e| AppError::Internal(anyhow!("Chart task failed: {e}")))??;
    let narrative = narrative?;

    let run_dir = deps.output_dir.join(run_id.to_string());
    let file_name = report_file_name(&client);
    let path = run_dir.join(&file_name);

    let rows = snapshot_rows(&scores, &deps.thresholds, &narrative.diagnostic);
    let bytes = {
        let client = client.clone();
        let story = narrative.diagnostic.story.clone();
        let insight = narrative.insight.clone();
        let path = path.clone();
        compose_in_run_dir(&run_dir, move || {
            let content = ReportContent {
                client: &client,
                story: &story,
                rows: &rows,
                chart: &chart,
                insight: &insight,
            };
            compose_to_path(&content, &path)
        })
        .await?
    };
    info!(
        "Report run {run_id}: wrote {} ({} bytes)",
        path.display(),
        bytes.len()
    );

    Ok(GeneratedReport {
        run_id,
        client,
        file_name,
        path,
        run_dir,
        bytes,
        scores,
        narrative,
    })
}

/// `{client}_Executive_Team_Diagnostic.pdf`. Letters and digits of any script
/// are kept; separators collapse to `_` and everything else is dropped.
pub fn report_file_name(client: &str) -> String {
    let mut safe = String::with_capacity(client.len());
    for c in client.chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            safe.push(c);
        } else if (c.is_whitespace() || c == '.' || c == '/') && !safe.ends_with('_') {
            safe.push('_');
        }
    }
    let safe = safe.trim_matches('_');
    let safe = if safe.is_empty() { "Client" } else { safe };
    format!("{safe}_Executive_Team_Diagnostic.pdf")
}
