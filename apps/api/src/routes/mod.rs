pub mod health;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::report::handlers::handle_generate_report;
use crate::state::AppState;
use crate::survey::handlers::{handle_list_clients, handle_scores};

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/surveys/clients", post(handle_list_clients))
        .route("/api/v1/surveys/scores", post(handle_scores))
        .route("/api/v1/reports", post(handle_generate_report))
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::narrative::tests::MockGenerator;
    use crate::scoring::StatusThresholds;
    use crate::survey::question_map::tests::sample_map;

    const BOUNDARY: &str = "diagnostic-test-boundary";
    const SURVEY: &str = "Timestamp,Client,Q1,Q2,Q3,Q4,Q6\n\
                          2024-03-01 09:00:00,Acme Holdings,5,4,2,3,4\n\
                          2024-03-01 09:05:00,Acme Holdings,4,4,3,3,2\n\
                          2024-03-01 09:10:00,Globex,2,2,2,2,2\n";

    fn state(output_dir: &Path) -> AppState {
        AppState {
            config: Config {
                openai_api_key: "test-key".to_string(),
                llm_api_base: "http://127.0.0.1:9".to_string(),
                llm_model: "test-model".to_string(),
                llm_timeout_secs: 5,
                llm_max_retries: 0,
                question_map_path: "data/questions.json".into(),
                report_output_dir: output_dir.to_path_buf(),
                keep_reports: false,
                max_upload_bytes: 1024 * 1024,
                status_thresholds: StatusThresholds::default(),
                port: 0,
                rust_log: "info".to_string(),
            },
            question_map: Arc::new(sample_map()),
            generator: Arc::new(MockGenerator::happy()),
        }
    }

    fn multipart(file: Option<(&str, &str)>, client: Option<&str>) -> Request<Body> {
        let mut body = String::new();
        if let Some((file_name, contents)) = file {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: text/csv\r\n\r\n{contents}\r\n"
            ));
        }
        if let Some(client) = client {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"client\"\r\n\r\n{client}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Request::builder()
            .method("POST")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn post(uri: &str, mut request: Request<Body>) -> Request<Body> {
        *request.uri_mut() = uri.parse().unwrap();
        request
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_reports_backend() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path()));
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["generator"], "mock");
    }

    #[tokio::test]
    async fn test_list_clients() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path()));
        let request = post(
            "/api/v1/surveys/clients",
            multipart(Some(("survey.csv", SURVEY)), None),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["clients"], serde_json::json!(["Acme Holdings", "Globex"]));
        assert_eq!(body["layout"]["kind"], "raw");
        assert_eq!(body["report"]["rows_read"], 3);
    }

    #[tokio::test]
    async fn test_scores_carry_status() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path()));
        let request = post(
            "/api/v1/surveys/scores",
            multipart(Some(("survey.csv", SURVEY)), Some("Acme  Holdings")),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["client"], "Acme Holdings");

        let scores = body["scores"].as_array().unwrap();
        assert_eq!(scores.len(), 5);
        assert_eq!(scores[0]["dimension"], "Trust");
        assert_eq!(scores[0]["score"], 4.25);
        assert_eq!(scores[0]["status"], "Strength");
        assert_eq!(scores[1]["status"], "At risk");
        assert_eq!(scores[2]["status"], "Fragile");
        assert!(scores[3]["score"].is_null());
        assert!(scores[3]["status"].is_null());
    }

    #[tokio::test]
    async fn test_scores_require_client() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path()));
        let request = post(
            "/api/v1/surveys/scores",
            multipart(Some(("survey.csv", SURVEY)), None),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_unsupported_file_type() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path()));
        let request = post(
            "/api/v1/surveys/clients",
            multipart(Some(("survey.pdf", SURVEY)), None),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FORMAT");
    }

    #[tokio::test]
    async fn test_report_is_pdf_attachment_and_run_dir_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path()));
        let request = post(
            "/api/v1/reports",
            multipart(Some(("survey.csv", SURVEY)), Some("Acme Holdings")),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Acme_Holdings_Executive_Team_Diagnostic.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_report_for_unknown_client() {
        let dir = tempfile::tempdir().unwrap();
        let app = build_router(state(dir.path()));
        let request = post(
            "/api/v1/reports",
            multipart(Some(("survey.csv", SURVEY)), Some("Initech")),
        );
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "CLIENT_NOT_FOUND");
    }
}
