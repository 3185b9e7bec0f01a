use crate::infra::{build_intake_service, read_upload};
use clap::Args;
use job_intake::config::AppConfig;
use job_intake::error::AppError;
use job_intake::intake::{ApplicationForm, ReferralInput, SubmissionError, SubmissionReceipt};
use job_intake::telemetry;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct SubmitArgs {
    /// Applicant full name
    #[arg(long, default_value = "")]
    pub(crate) full_name: String,
    /// Applicant email address
    #[arg(long, default_value = "")]
    pub(crate) email: String,
    #[arg(long, default_value = "")]
    pub(crate) phone: String,
    /// Position applied for
    #[arg(long, default_value = "")]
    pub(crate) position: String,
    #[arg(long)]
    pub(crate) years_experience: Option<f64>,
    #[arg(long, default_value = "")]
    pub(crate) expected_salary: String,
    #[arg(long, default_value = "")]
    pub(crate) location: String,
    #[arg(long, default_value = "")]
    pub(crate) linkedin: String,
    /// Cover letter text or other notes for the recruiting team
    #[arg(long, default_value = "")]
    pub(crate) notes: String,
    /// Resume path; must be a PDF
    #[arg(long)]
    pub(crate) resume: Option<PathBuf>,
    /// Optional cover letter file (pdf, doc, docx)
    #[arg(long)]
    pub(crate) cover_letter: Option<PathBuf>,
    /// The applicant was referred by an employee
    #[arg(long)]
    pub(crate) referred: bool,
    #[arg(long, default_value = "")]
    pub(crate) referrer_name: String,
    #[arg(long, default_value = "")]
    pub(crate) referrer_employee_id: String,
    #[arg(long, default_value = "")]
    pub(crate) referrer_email: String,
    /// Consent to processing of the application data
    #[arg(long)]
    pub(crate) consent: bool,
}

impl SubmitArgs {
    fn into_form(self) -> Result<ApplicationForm, AppError> {
        let resume = self
            .resume
            .as_deref()
            .map(|path| read_upload(path, None))
            .transpose()?;
        let cover_letter = self
            .cover_letter
            .as_deref()
            .map(|path| read_upload(path, None))
            .transpose()?;

        Ok(ApplicationForm {
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            position: self.position,
            years_experience: self.years_experience,
            expected_salary: self.expected_salary,
            location: self.location,
            linkedin: self.linkedin,
            notes: self.notes,
            resume,
            cover_letter,
            referral: ReferralInput {
                referred: self.referred,
                name: self.referrer_name,
                employee_id: self.referrer_employee_id,
                email: self.referrer_email,
            },
            consent: self.consent,
        })
    }
}

pub(crate) fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry, config.environment)?;

    let service = build_intake_service(&config)?;
    let form = args.into_form()?;

    match service.submit(form) {
        Ok(receipt) => {
            render_receipt(&receipt, &config.portal.app_title);
            Ok(())
        }
        Err(SubmissionError::Rejected(errors)) => {
            println!("Application not submitted:");
            for message in errors.messages() {
                println!("- {message}");
            }
            Err(SubmissionError::Rejected(errors).into())
        }
        Err(other) => Err(other.into()),
    }
}

fn render_receipt(receipt: &SubmissionReceipt, app_title: &str) {
    let record = &receipt.record;
    println!("{app_title}");
    println!("Application submitted! Your ID is {}.", record.application_id);
    let mut notice = String::from(
        "A confirmation email has been sent to you. HR has also been notified.",
    );
    if record.referred == "Yes" {
        notice.push_str(" The referring employee was notified as well.");
    }
    println!("{notice}");

    match serde_json::to_string_pretty(record) {
        Ok(json) => println!("\nSubmission receipt:\n{json}"),
        Err(err) => println!("\nSubmission receipt unavailable: {err}"),
    }
}
