use std::sync::Arc;

use serde::Serialize;

use crate::config::PortalConfig;

use super::domain::{
    ApplicationForm, ApplicationId, NoticeKind, RecordSummary, SubmissionRecord, SubmissionState,
};
use super::identifier::{Clock, SystemClock};
use super::notifier::{Mailer, NotifyError, OutboundEmail};
use super::record::build_record;
use super::repository::{PersistenceError, SubmissionStore};
use super::templates::{ApplicantConfirmation, HrNotification, ReferrerNotice};
use super::validation::{validate, ValidationErrors};

/// Sender-side settings the orchestrator needs to address and sign notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeSettings {
    pub hr_email: String,
    pub from_name: String,
}

impl From<&PortalConfig> for IntakeSettings {
    fn from(config: &PortalConfig) -> Self {
        Self {
            hr_email: config.hr_email.clone(),
            from_name: config.from_name.clone(),
        }
    }
}

/// Receipt returned for a completed submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub state: SubmissionState,
    pub record: RecordSummary,
    pub notified: Vec<NoticeKind>,
}

/// Notices that went out before the one that failed.
#[derive(Debug, thiserror::Error)]
#[error("application {application_id} was recorded but the {failed} email could not be sent: {source}")]
pub struct PartialDelivery {
    pub application_id: ApplicationId,
    pub delivered: Vec<NoticeKind>,
    pub failed: NoticeKind,
    #[source]
    pub source: NotifyError,
}

/// Error raised by the intake service; each variant is a distinct terminal outcome.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Rejected(#[from] ValidationErrors),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    PartiallyFailed(Box<PartialDelivery>),
}

impl SubmissionError {
    /// Terminal state for the outcome. A persistence failure halts before
    /// notification and reports from `Persisting`.
    pub fn state(&self) -> SubmissionState {
        match self {
            SubmissionError::Rejected(_) => SubmissionState::Rejected,
            SubmissionError::Persistence(_) => SubmissionState::Persisting,
            SubmissionError::PartiallyFailed(_) => SubmissionState::PartiallyFailed,
        }
    }
}

/// Orchestrates validate -> build -> persist -> notify for one submission at a time.
pub struct IntakeService<M> {
    settings: IntakeSettings,
    mailer: Arc<M>,
    store: Option<Arc<dyn SubmissionStore>>,
    clock: Arc<dyn Clock>,
}

impl<M> IntakeService<M>
where
    M: Mailer + 'static,
{
    pub fn new(settings: IntakeSettings, mailer: Arc<M>) -> Self {
        Self {
            settings,
            mailer,
            store: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn SubmissionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn settings(&self) -> &IntakeSettings {
        &self.settings
    }

    /// Run one submission to a terminal state.
    pub fn submit(&self, form: ApplicationForm) -> Result<SubmissionReceipt, SubmissionError> {
        tracing::debug!(state = SubmissionState::Validating.label(), "validating submission");
        let validated = match validate(form) {
            Ok(validated) => validated,
            Err(errors) => {
                tracing::info!(
                    state = SubmissionState::Rejected.label(),
                    errors = errors.messages().len(),
                    "submission rejected"
                );
                return Err(errors.into());
            }
        };

        let submitted_at = self.clock.now();
        let record = build_record(validated, ApplicationId::at(submitted_at), submitted_at);

        if let Some(store) = &self.store {
            tracing::debug!(
                application_id = %record.application_id,
                state = SubmissionState::Persisting.label(),
                "persisting submission"
            );
            if let Err(err) = store.persist(&record) {
                tracing::error!(
                    application_id = %record.application_id,
                    error = %err,
                    "submission not persisted; skipping notifications"
                );
                return Err(err.into());
            }
        }

        let notified = self.notify(&record)?;
        tracing::info!(
            application_id = %record.application_id,
            state = SubmissionState::Completed.label(),
            notices = notified.len(),
            "submission completed"
        );

        Ok(SubmissionReceipt {
            state: SubmissionState::Completed,
            record: record.summary(),
            notified,
        })
    }

    /// Notices for a record, in send order.
    pub fn notices(&self, record: &SubmissionRecord) -> Vec<(NoticeKind, OutboundEmail)> {
        let from_name = self.settings.from_name.as_str();

        let applicant = ApplicantConfirmation { record, from_name };
        let mut notices = vec![(
            NoticeKind::ApplicantConfirmation,
            OutboundEmail {
                subject: applicant.subject(),
                body: applicant.to_string(),
                to: record.email.clone(),
                attachments: Vec::new(),
                reply_to: Some(self.settings.hr_email.clone()),
            },
        )];

        let hr = HrNotification { record };
        let mut attachments = vec![record.resume.clone()];
        attachments.extend(record.cover_letter.clone());
        notices.push((
            NoticeKind::HrNotification,
            OutboundEmail {
                subject: hr.subject(),
                body: hr.to_string(),
                to: self.settings.hr_email.clone(),
                attachments,
                reply_to: None,
            },
        ));

        if record.referred && !record.referrer.email.is_empty() {
            let referrer = ReferrerNotice { record, from_name };
            notices.push((
                NoticeKind::ReferrerNotice,
                OutboundEmail {
                    subject: referrer.subject(),
                    body: referrer.to_string(),
                    to: record.referrer.email.clone(),
                    attachments: Vec::new(),
                    reply_to: None,
                },
            ));
        }

        notices
    }

    fn notify(&self, record: &SubmissionRecord) -> Result<Vec<NoticeKind>, SubmissionError> {
        let mut delivered = Vec::new();
        for (kind, email) in self.notices(record) {
            tracing::debug!(
                application_id = %record.application_id,
                state = SubmissionState::Notifying.label(),
                notice = kind.label(),
                "sending notice"
            );
            if let Err(source) = self.mailer.send(&email) {
                tracing::warn!(
                    application_id = %record.application_id,
                    state = SubmissionState::PartiallyFailed.label(),
                    notice = kind.label(),
                    delivered = delivered.len(),
                    error = %source,
                    "notice failed; remaining notices skipped"
                );
                return Err(SubmissionError::PartiallyFailed(Box::new(PartialDelivery {
                    application_id: record.application_id.clone(),
                    delivered,
                    failed: kind,
                    source,
                })));
            }
            delivered.push(kind);
        }
        Ok(delivered)
    }
}
