use chrono::{DateTime, Utc};

use super::domain::{ApplicationId, Attachment, Referrer, SubmissionRecord};
use super::validation::ValidatedForm;

const MAX_SAFE_NAME_LEN: usize = 80;

/// Replace every run of characters outside `[A-Za-z0-9_.-]` with a single `_`
/// and cap the result at 80 characters.
pub fn sanitize_filename(raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());
    let mut in_run = false;
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-') {
            sanitized.push(ch);
            in_run = false;
        } else if !in_run {
            sanitized.push('_');
            in_run = true;
        }
    }
    sanitized.chars().take(MAX_SAFE_NAME_LEN).collect()
}

/// Archived resume name: `<application id>_<sanitized applicant name>.pdf`.
pub fn resume_filename(application_id: &ApplicationId, full_name: &str) -> String {
    let safe_name = match sanitize_filename(full_name) {
        name if name.is_empty() => "applicant".to_string(),
        name => name,
    };
    format!("{application_id}_{safe_name}.pdf")
}

/// Round to one decimal place. Values too large to scale are already whole
/// and come back unchanged.
pub fn round_one_decimal(value: f64) -> f64 {
    let scaled = value * 10.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 10.0
}

/// Assemble the immutable record for a validated form. Pure: no I/O, no clock.
pub fn build_record(
    validated: ValidatedForm,
    application_id: ApplicationId,
    submitted_at: DateTime<Utc>,
) -> SubmissionRecord {
    let ValidatedForm {
        form,
        years_experience,
        resume,
    } = validated;

    let full_name = form.full_name.trim().to_string();
    let referred = form.referral.referred;
    let referrer = if referred {
        Referrer {
            name: form.referral.name.trim().to_string(),
            employee_id: form.referral.employee_id.trim().to_string(),
            email: form.referral.email.trim().to_string(),
        }
    } else {
        Referrer::default()
    };

    let resume = Attachment {
        filename: resume_filename(&application_id, &full_name),
        bytes: resume.bytes,
    };
    let cover_letter = form.cover_letter.map(|file| Attachment {
        filename: sanitize_filename(&file.filename),
        bytes: file.bytes,
    });

    SubmissionRecord {
        application_id,
        submitted_at,
        full_name,
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        position: form.position.trim().to_string(),
        years_experience: round_one_decimal(years_experience),
        expected_salary: form.expected_salary.trim().to_string(),
        location: form.location.trim().to_string(),
        linkedin: form.linkedin.trim().to_string(),
        notes: form.notes.trim().to_string(),
        referred,
        referrer,
        resume,
        cover_letter,
    }
}
