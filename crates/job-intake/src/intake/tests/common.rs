use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};

use crate::intake::domain::{ApplicationForm, ReferralInput, SubmissionRecord, UploadedFile};
use crate::intake::identifier::Clock;
use crate::intake::notifier::{Mailer, NotifyError, OutboundEmail};
use crate::intake::repository::{PersistenceError, SubmissionStore};
use crate::intake::service::{IntakeService, IntakeSettings};
use crate::intake::validation::PDF_CONTENT_TYPE;

pub(super) const HR_EMAIL: &str = "talent@example.com";

pub(super) fn submitted_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
}

pub(super) fn settings() -> IntakeSettings {
    IntakeSettings {
        hr_email: HR_EMAIL.to_string(),
        from_name: "Recruiting Team".to_string(),
    }
}

pub(super) fn resume() -> UploadedFile {
    UploadedFile::new("ada.pdf", PDF_CONTENT_TYPE, b"%PDF-1.7 ada".to_vec())
}

/// Ada Lovelace applying for Engineer with five years and a PDF resume.
pub(super) fn ada_form() -> ApplicationForm {
    ApplicationForm {
        full_name: "Ada Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        position: "Engineer".to_string(),
        years_experience: Some(5.0),
        resume: Some(resume()),
        consent: true,
        ..ApplicationForm::default()
    }
}

pub(super) fn referred_form() -> ApplicationForm {
    ApplicationForm {
        referral: ReferralInput {
            referred: true,
            name: "Grace Hopper".to_string(),
            employee_id: "E-42".to_string(),
            email: "grace@example.com".to_string(),
        },
        ..ada_form()
    }
}

pub(super) struct FixedClock(pub(super) DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Records every send attempt; optionally fails the attempt at `fail_on` (zero based).
#[derive(Default)]
pub(super) struct RecordingMailer {
    attempts: Mutex<Vec<OutboundEmail>>,
    fail_on: Option<usize>,
}

impl RecordingMailer {
    pub(super) fn failing_on(attempt: usize) -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            fail_on: Some(attempt),
        }
    }

    pub(super) fn attempts(&self) -> Vec<OutboundEmail> {
        self.attempts.lock().expect("mailer mutex poisoned").clone()
    }
}

impl Mailer for RecordingMailer {
    fn send(&self, email: &OutboundEmail) -> Result<(), NotifyError> {
        let mut attempts = self.attempts.lock().expect("mailer mutex poisoned");
        let index = attempts.len();
        attempts.push(email.clone());
        if self.fail_on == Some(index) {
            return Err(NotifyError::Delivery("relay rejected message".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl MemoryStore {
    pub(super) fn records(&self) -> Vec<SubmissionRecord> {
        self.records.lock().expect("store mutex poisoned").clone()
    }
}

impl SubmissionStore for MemoryStore {
    fn persist(&self, record: &SubmissionRecord) -> Result<(), PersistenceError> {
        self.records
            .lock()
            .expect("store mutex poisoned")
            .push(record.clone());
        Ok(())
    }
}

pub(super) struct FailingStore;

impl SubmissionStore for FailingStore {
    fn persist(&self, _record: &SubmissionRecord) -> Result<(), PersistenceError> {
        Err(PersistenceError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only volume",
        )))
    }
}

pub(super) fn service(
    mailer: Arc<RecordingMailer>,
    store: Arc<dyn SubmissionStore>,
) -> IntakeService<RecordingMailer> {
    IntakeService::new(settings(), mailer)
        .with_store(store)
        .with_clock(Arc::new(FixedClock(submitted_at())))
}
