use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for submitted applications (`APP-<unix seconds>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file handed over by the form boundary, with the metadata the browser declared.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Lower-cased extension without the dot, if the filename has one.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}

impl fmt::Debug for UploadedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadedFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Raw, unvalidated submission exactly as the form boundary collected it.
///
/// The boundary layer builds one of these per submit; nothing else about the UI
/// session reaches the intake pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationForm {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub years_experience: Option<f64>,
    pub expected_salary: String,
    pub location: String,
    pub linkedin: String,
    pub notes: String,
    pub resume: Option<UploadedFile>,
    pub cover_letter: Option<UploadedFile>,
    pub referral: ReferralInput,
    pub consent: bool,
}

/// Referral toggle plus whatever was typed into the referrer fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferralInput {
    pub referred: bool,
    pub name: String,
    pub employee_id: String,
    pub email: String,
}

/// Named attachment carried by a record and forwarded to HR.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Referrer details; only present on records where the applicant was referred.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    pub name: String,
    pub employee_id: String,
    pub email: String,
}

/// Immutable record of one submission, produced once by the record builder.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRecord {
    pub application_id: ApplicationId,
    pub submitted_at: DateTime<Utc>,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub years_experience: f64,
    pub expected_salary: String,
    pub location: String,
    pub linkedin: String,
    pub notes: String,
    pub referred: bool,
    pub referrer: Referrer,
    pub resume: Attachment,
    pub cover_letter: Option<Attachment>,
}

impl SubmissionRecord {
    pub fn referred_label(&self) -> &'static str {
        if self.referred {
            "Yes"
        } else {
            "No"
        }
    }

    pub fn timestamp_iso(&self) -> String {
        self.submitted_at
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    }

    /// Blob-free view suitable for receipts and API responses.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            application_id: self.application_id.clone(),
            timestamp_iso: self.timestamp_iso(),
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            position: self.position.clone(),
            years_experience: self.years_experience,
            expected_salary: self.expected_salary.clone(),
            location: self.location.clone(),
            linkedin: self.linkedin.clone(),
            notes: self.notes.clone(),
            referred: self.referred_label(),
            ref_name: self.referrer.name.clone(),
            ref_emp_id: self.referrer.employee_id.clone(),
            ref_email: self.referrer.email.clone(),
            cover_letter_filename: self
                .cover_letter
                .as_ref()
                .map(|attachment| attachment.filename.clone()),
        }
    }
}

/// Receipt payload shown back to the applicant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub application_id: ApplicationId,
    pub timestamp_iso: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub years_experience: f64,
    pub expected_salary: String,
    pub location: String,
    pub linkedin: String,
    pub notes: String,
    pub referred: &'static str,
    pub ref_name: String,
    pub ref_emp_id: String,
    pub ref_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_letter_filename: Option<String>,
}

/// Lifecycle of a single submission through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Collecting,
    Validating,
    Rejected,
    Persisting,
    Notifying,
    Completed,
    PartiallyFailed,
}

impl SubmissionState {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionState::Collecting => "collecting",
            SubmissionState::Validating => "validating",
            SubmissionState::Rejected => "rejected",
            SubmissionState::Persisting => "persisting",
            SubmissionState::Notifying => "notifying",
            SubmissionState::Completed => "completed",
            SubmissionState::PartiallyFailed => "partially_failed",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            SubmissionState::Rejected | SubmissionState::Completed | SubmissionState::PartiallyFailed
        )
    }
}

/// The three notices a submission can produce, in send order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ApplicantConfirmation,
    HrNotification,
    ReferrerNotice,
}

impl NoticeKind {
    pub const fn label(self) -> &'static str {
        match self {
            NoticeKind::ApplicantConfirmation => "applicant_confirmation",
            NoticeKind::HrNotification => "hr_notification",
            NoticeKind::ReferrerNotice => "referrer_notice",
        }
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
