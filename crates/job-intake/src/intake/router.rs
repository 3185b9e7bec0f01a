use std::sync::Arc;

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::json;

use super::domain::{ApplicationForm, UploadedFile};
use super::notifier::Mailer;
use super::service::{IntakeService, SubmissionError};

/// Upper bound for a multipart submission (resume plus cover letter).
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Router builder exposing the multipart intake endpoint.
pub fn intake_router<M>(service: Arc<IntakeService<M>>) -> Router
where
    M: Mailer + 'static,
{
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<M>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service)
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "on" | "yes" | "1"
    )
}

fn parse_years(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

async fn read_file(field: Field<'_>) -> Result<Option<UploadedFile>, axum::extract::multipart::MultipartError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field.bytes().await?;
    if filename.is_empty() && bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(UploadedFile::new(filename, content_type, bytes.to_vec())))
}

/// Collect the multipart fields into a single immutable form.
pub(crate) async fn read_form(
    mut multipart: Multipart,
) -> Result<ApplicationForm, axum::extract::multipart::MultipartError> {
    let mut form = ApplicationForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => form.resume = read_file(field).await?,
            "cover_letter" => form.cover_letter = read_file(field).await?,
            _ => {
                let value = field.text().await?;
                match name.as_str() {
                    "full_name" => form.full_name = value,
                    "email" => form.email = value,
                    "phone" => form.phone = value,
                    "position" => form.position = value,
                    "years_experience" => form.years_experience = parse_years(&value),
                    "expected_salary" => form.expected_salary = value,
                    "location" => form.location = value,
                    "linkedin" => form.linkedin = value,
                    "notes" => form.notes = value,
                    "referred" => form.referral.referred = parse_flag(&value),
                    "ref_name" => form.referral.name = value,
                    "ref_emp_id" => form.referral.employee_id = value,
                    "ref_email" => form.referral.email = value,
                    "consent" => form.consent = parse_flag(&value),
                    other => tracing::debug!(field = other, "ignoring unknown form field"),
                }
            }
        }
    }
    Ok(form)
}

pub(crate) async fn submit_handler<M>(
    State(service): State<Arc<IntakeService<M>>>,
    multipart: Multipart,
) -> Response
where
    M: Mailer + 'static,
{
    let form = match read_form(multipart).await {
        Ok(form) => form,
        Err(err) => {
            let payload = json!({ "error": format!("malformed form data: {err}") });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    let outcome = tokio::task::spawn_blocking(move || service.submit(form)).await;

    match outcome {
        Ok(Ok(receipt)) => (StatusCode::CREATED, axum::Json(receipt)).into_response(),
        Ok(Err(SubmissionError::Rejected(errors))) => {
            let payload = json!({
                "state": "rejected",
                "errors": errors.messages(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Ok(Err(SubmissionError::Persistence(err))) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
        Ok(Err(SubmissionError::PartiallyFailed(partial))) => {
            let payload = json!({
                "state": "partially_failed",
                "application_id": partial.application_id,
                "delivered": partial.delivered,
                "failed": partial.failed,
                "error": partial.to_string(),
            });
            (StatusCode::BAD_GATEWAY, axum::Json(payload)).into_response()
        }
        Err(join_error) => {
            tracing::error!(error = %join_error, "intake worker failed");
            let payload = json!({ "error": "submission could not be processed" });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
