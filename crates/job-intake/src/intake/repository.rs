use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use super::domain::SubmissionRecord;

pub const LEDGER_FILENAME: &str = "applications.csv";

pub const LEDGER_HEADER: [&str; 16] = [
    "app_id",
    "timestamp_iso",
    "full_name",
    "email",
    "phone",
    "position",
    "years_experience",
    "expected_salary",
    "location",
    "linkedin",
    "cover_letter",
    "referred",
    "ref_name",
    "ref_emp_id",
    "ref_email",
    "resume_filename",
];

static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// Append-only storage for submission records.
pub trait SubmissionStore: Send + Sync {
    fn persist(&self, record: &SubmissionRecord) -> Result<(), PersistenceError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to save resume {path}: {source}")]
    Resume {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to save application record: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode application record: {0}")]
    Csv(#[from] csv::Error),
    #[error("submission store lock poisoned")]
    Poisoned,
}

/// One ledger row. Field order is the column order of the CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub app_id: String,
    pub timestamp_iso: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub years_experience: f64,
    pub expected_salary: String,
    pub location: String,
    pub linkedin: String,
    pub cover_letter: String,
    pub referred: String,
    pub ref_name: String,
    pub ref_emp_id: String,
    pub ref_email: String,
    pub resume_filename: String,
}

impl From<&SubmissionRecord> for LedgerRow {
    fn from(record: &SubmissionRecord) -> Self {
        Self {
            app_id: record.application_id.0.clone(),
            timestamp_iso: record.timestamp_iso(),
            full_name: record.full_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            position: record.position.clone(),
            years_experience: record.years_experience,
            expected_salary: record.expected_salary.clone(),
            location: record.location.clone(),
            linkedin: record.linkedin.clone(),
            cover_letter: record.notes.clone(),
            referred: record.referred_label().to_string(),
            ref_name: record.referrer.name.clone(),
            ref_emp_id: record.referrer.employee_id.clone(),
            ref_email: record.referrer.email.clone(),
            resume_filename: record.resume.filename.clone(),
        }
    }
}

/// CSV ledger plus resume archive under a single directory.
///
/// The header is published once by hard-linking a staged file into place, so
/// separate processes sharing a directory never both write it. Writers are
/// serialized through an in-process lock, and each row reaches the file as one
/// append-mode write so concurrent processes never interleave partial rows.
#[derive(Debug)]
pub struct CsvSubmissionStore {
    dir: PathBuf,
    ledger: PathBuf,
    lock: Mutex<()>,
}

impl CsvSubmissionStore {
    /// Open (creating if needed) the store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        let ledger = dir.join(LEDGER_FILENAME);
        let store = Self {
            dir,
            ledger,
            lock: Mutex::new(()),
        };
        store.ensure_ledger()?;
        Ok(store)
    }

    /// Create the ledger with its header unless some writer already did.
    fn ensure_ledger(&self) -> Result<(), PersistenceError> {
        if let Ok(metadata) = fs::metadata(&self.ledger) {
            if metadata.len() > 0 {
                return Ok(());
            }
            // An empty file left behind by another tool: give it a header.
            let mut file = OpenOptions::new().append(true).open(&self.ledger)?;
            file.write_all(&Self::header()?)?;
            return Ok(());
        }

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or_default();
        let staged = self.dir.join(format!(
            ".{LEDGER_FILENAME}.{}.{nanos}.{}",
            std::process::id(),
            STAGING_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&staged, Self::header()?)?;
        let linked = fs::hard_link(&staged, &self.ledger);
        fs::remove_file(&staged).ok();
        match linked {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn header() -> Result<Vec<u8>, PersistenceError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(LEDGER_HEADER)?;
        writer
            .into_inner()
            .map_err(|err| PersistenceError::Io(err.into_error()))
    }

    pub fn ledger_path(&self) -> &Path {
        &self.ledger
    }

    pub fn resume_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    fn encode(row: &LedgerRow) -> Result<Vec<u8>, PersistenceError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(row)?;
        writer
            .into_inner()
            .map_err(|err| PersistenceError::Io(err.into_error()))
    }

    /// Every row currently in the ledger, in append order.
    pub fn load(&self) -> Result<Vec<LedgerRow>, PersistenceError> {
        if !self.ledger.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.ledger)?;
        let mut rows = Vec::new();
        for row in reader.deserialize::<LedgerRow>() {
            rows.push(row?);
        }
        Ok(rows)
    }
}

impl SubmissionStore for CsvSubmissionStore {
    fn persist(&self, record: &SubmissionRecord) -> Result<(), PersistenceError> {
        let _guard = self.lock.lock().map_err(|_| PersistenceError::Poisoned)?;

        let resume_path = self.resume_path(&record.resume.filename);
        fs::write(&resume_path, &record.resume.bytes).map_err(|source| {
            PersistenceError::Resume {
                path: resume_path.clone(),
                source,
            }
        })?;

        if !self.ledger.exists() {
            self.ensure_ledger()?;
        }
        let mut file = OpenOptions::new().append(true).open(&self.ledger)?;

        let bytes = Self::encode(&LedgerRow::from(record))?;
        file.write_all(&bytes)?;
        file.flush()?;

        tracing::debug!(
            application_id = %record.application_id,
            ledger = %self.ledger.display(),
            "application record appended"
        );
        Ok(())
    }
}
