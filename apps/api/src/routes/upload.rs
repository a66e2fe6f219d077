use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::errors::AppError;
use crate::report::pipeline::SurveyUpload;

const FILE_FIELD: &str = "file";
const CLIENT_FIELD: &str = "client";

/// Fields of a survey upload form: the `file` part and an optional `client`.
#[derive(Debug)]
pub struct UploadForm {
    pub upload: SurveyUpload,
    pub client: Option<String>,
}

impl UploadForm {
    /// Drains the multipart stream. Unknown fields are skipped.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut upload = None;
        let mut client = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some(FILE_FIELD) => {
                    let file_name = field
                        .file_name()
                        .map(str::to_string)
                        .ok_or_else(|| {
                            AppError::BadRequest("The 'file' field has no file name".to_string())
                        })?;
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    upload = Some(SurveyUpload { file_name, bytes });
                }
                Some(CLIENT_FIELD) => {
                    let text = field.text().await.map_err(multipart_error)?;
                    let text = text.trim();
                    if !text.is_empty() {
                        client = Some(text.to_string());
                    }
                }
                other => {
                    tracing::debug!("Ignoring multipart field {other:?}");
                }
            }
        }

        let upload = upload
            .ok_or_else(|| AppError::BadRequest("Missing multipart field 'file'".to_string()))?;
        Ok(UploadForm { upload, client })
    }

    pub fn require_client(&self) -> Result<&str, AppError> {
        self.client
            .as_deref()
            .ok_or_else(|| AppError::BadRequest("Missing multipart field 'client'".to_string()))
    }
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}
