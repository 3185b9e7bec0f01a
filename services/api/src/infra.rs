use job_intake::config::{AppConfig, PortalConfig};
use job_intake::error::AppError;
use job_intake::intake::{
    CsvSubmissionStore, IntakeService, IntakeSettings, SmtpMailer, UploadedFile,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) portal: Arc<PortalConfig>,
}

/// Wire the intake service from configuration: SMTP mailer plus the CSV store
/// when a save directory is configured.
pub(crate) fn build_intake_service(config: &AppConfig) -> Result<IntakeService<SmtpMailer>, AppError> {
    let mailer = Arc::new(SmtpMailer::new(config.smtp.clone()));
    let service = IntakeService::new(IntakeSettings::from(&config.portal), mailer);

    match &config.portal.save_dir {
        Some(dir) => {
            let store = CsvSubmissionStore::open(dir)?;
            tracing::info!(ledger = %store.ledger_path().display(), "submission store ready");
            Ok(service.with_store(Arc::new(store)))
        }
        None => {
            tracing::warn!("SAVE_DIR is empty; submissions will not be persisted");
            Ok(service)
        }
    }
}

/// Load a file from disk as an upload, inferring the declared content type
/// from its extension unless one is given.
pub(crate) fn read_upload(path: &Path, content_type: Option<&str>) -> Result<UploadedFile, AppError> {
    let bytes = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string();
    let content_type = match content_type {
        Some(declared) => declared.to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };
    Ok(UploadedFile::new(filename, content_type, bytes))
}
