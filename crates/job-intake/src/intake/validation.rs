use super::domain::{ApplicationForm, UploadedFile};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const COVER_LETTER_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

pub const MSG_FULL_NAME: &str = "Full Name is required.";
pub const MSG_EMAIL: &str = "Valid Email is required.";
pub const MSG_POSITION: &str = "Position is required.";
pub const MSG_EXPERIENCE: &str = "Years of Experience is required.";
pub const MSG_RESUME_MISSING: &str = "Resume PDF is required.";
pub const MSG_RESUME_NOT_PDF: &str = "Resume must be a PDF file.";
pub const MSG_CONSENT: &str = "Consent is required to submit the application.";
pub const MSG_REFERRER_NAME: &str = "Referrer Name is required.";
pub const MSG_REFERRER_ID: &str = "Referrer Employee ID is required.";
pub const MSG_REFERRER_EMAIL: &str = "Valid Referrer Email is required.";
pub const MSG_COVER_LETTER_TYPE: &str = "Cover letter must be a PDF, DOC or DOCX file.";

/// Every rule the form violated, in check order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("submission rejected: {}", .0.join(" "))]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

/// `local@domain.tld`: no whitespace or extra `@` anywhere, and a dot in the
/// domain with at least one character on either side. Surrounding whitespace
/// is ignored.
pub fn is_email(raw: &str) -> bool {
    let candidate = raw.trim();
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || candidate.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }

    domain
        .char_indices()
        .any(|(idx, ch)| ch == '.' && idx > 0 && idx + 1 < domain.len())
}

fn is_pdf(file: &UploadedFile) -> bool {
    file.content_type == PDF_CONTENT_TYPE
}

fn has_cover_letter_extension(file: &UploadedFile) -> bool {
    file.extension()
        .is_some_and(|ext| COVER_LETTER_EXTENSIONS.contains(&ext.as_str()))
}

/// Run every rule independently and collect the messages; empty means valid.
pub fn check(form: &ApplicationForm) -> Vec<String> {
    let mut errors = Vec::new();

    if form.full_name.trim().is_empty() {
        errors.push(MSG_FULL_NAME);
    }
    if !is_email(&form.email) {
        errors.push(MSG_EMAIL);
    }
    if form.position.trim().is_empty() {
        errors.push(MSG_POSITION);
    }
    if !form
        .years_experience
        .is_some_and(|years| years.is_finite() && years >= 0.0)
    {
        errors.push(MSG_EXPERIENCE);
    }
    match &form.resume {
        None => errors.push(MSG_RESUME_MISSING),
        Some(resume) if !is_pdf(resume) => errors.push(MSG_RESUME_NOT_PDF),
        Some(_) => {}
    }
    if !form.consent {
        errors.push(MSG_CONSENT);
    }

    let referral = &form.referral;
    if referral.referred {
        if referral.name.trim().is_empty() {
            errors.push(MSG_REFERRER_NAME);
        }
        if referral.employee_id.trim().is_empty() {
            errors.push(MSG_REFERRER_ID);
        }
        if !is_email(&referral.email) {
            errors.push(MSG_REFERRER_EMAIL);
        }
    }

    if let Some(cover_letter) = &form.cover_letter {
        if !has_cover_letter_extension(cover_letter) {
            errors.push(MSG_COVER_LETTER_TYPE);
        }
    }

    errors.into_iter().map(str::to_string).collect()
}

/// A form that passed every rule, with the required parts unwrapped.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedForm {
    pub(crate) form: ApplicationForm,
    pub(crate) years_experience: f64,
    pub(crate) resume: UploadedFile,
}

pub fn validate(mut form: ApplicationForm) -> Result<ValidatedForm, ValidationErrors> {
    let errors = check(&form);
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    match (form.years_experience, form.resume.take()) {
        (Some(years_experience), Some(resume)) => Ok(ValidatedForm {
            form,
            years_experience,
            resume,
        }),
        (years, resume) => {
            let mut errors = Vec::new();
            if years.is_none() {
                errors.push(MSG_EXPERIENCE.to_string());
            }
            if resume.is_none() {
                errors.push(MSG_RESUME_MISSING.to_string());
            }
            Err(ValidationErrors(errors))
        }
    }
}
