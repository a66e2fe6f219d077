use axum::extract::{Multipart, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use unicode_normalization::UnicodeNormalization;

use crate::errors::AppError;
use crate::report::pipeline::{generate_report, ReportDeps};
use crate::routes::upload::UploadForm;
use crate::state::AppState;

/// POST /api/v1/reports
/// Runs the full pipeline and streams the PDF back as an attachment.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = UploadForm::read(multipart).await?;
    let client = form.require_client()?.to_string();

    let deps = ReportDeps::from_state(&state);
    let report = generate_report(&deps, form.upload, &client).await?;
    if !state.config.keep_reports {
        report.discard().await;
    }

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&report.file_name)),
        ],
        report.bytes,
    )
        .into_response())
}

/// Attachment header. Non-ASCII names get an accent-stripped `filename` for
/// old clients plus the exact name as RFC 5987 `filename*`.
fn content_disposition(file_name: &str) -> String {
    if file_name.is_ascii() {
        return format!("attachment; filename=\"{file_name}\"");
    }
    let folded: String = file_name.nfd().filter(char::is_ascii).collect();
    let fallback = folded.trim_start_matches('_');
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_name_has_plain_disposition() {
        assert_eq!(
            content_disposition("Acme_Executive_Team_Diagnostic.pdf"),
            "attachment; filename=\"Acme_Executive_Team_Diagnostic.pdf\""
        );
    }

    #[test]
    fn test_accented_name_gets_fallback_and_utf8_form() {
        assert_eq!(
            content_disposition("M\u{00FC}ller_Soci\u{00E9}t\u{00E9}_Executive_Team_Diagnostic.pdf"),
            "attachment; filename=\"Muller_Societe_Executive_Team_Diagnostic.pdf\"; \
             filename*=UTF-8''M%C3%BCller_Soci%C3%A9t%C3%A9_Executive_Team_Diagnostic.pdf"
        );
    }

    #[test]
    fn test_non_latin_name_falls_back_to_suffix() {
        let header = content_disposition("\u{682A}\u{5F0F}_Executive_Team_Diagnostic.pdf");
        assert!(header.starts_with("attachment; filename=\"Executive_Team_Diagnostic.pdf\"; filename*=UTF-8''%E6%A0%AA"));
    }
}
