//! Job application intake: validation, record building, persistence, and
//! recruiting notifications for a single form submission.

pub mod domain;
pub mod identifier;
pub mod notifier;
pub mod record;
pub mod repository;
pub mod router;
pub mod service;
pub mod templates;
pub mod validation;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationForm, ApplicationId, Attachment, NoticeKind, RecordSummary, ReferralInput,
    Referrer, SubmissionRecord, SubmissionState, UploadedFile,
};
pub use identifier::{Clock, SystemClock};
pub use notifier::{Mailer, NotifyError, OutboundEmail, SmtpMailer};
pub use repository::{CsvSubmissionStore, LedgerRow, PersistenceError, SubmissionStore};
pub use router::intake_router;
pub use service::{
    IntakeService, IntakeSettings, PartialDelivery, SubmissionError, SubmissionReceipt,
};
pub use validation::ValidationErrors;
