//! Plain-text bodies and subjects for the three intake notices.

use std::fmt::{self, Display};

use super::domain::SubmissionRecord;

pub struct ApplicantConfirmation<'a> {
    pub record: &'a SubmissionRecord,
    pub from_name: &'a str,
}

impl ApplicantConfirmation<'_> {
    pub fn subject(&self) -> String {
        format!(
            "Application Submitted Successfully - {}",
            self.record.application_id
        )
    }
}

impl Display for ApplicantConfirmation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        writeln!(f, "Hi {},", record.full_name)?;
        writeln!(f)?;
        writeln!(
            f,
            "Thanks for applying for the {} role. We've received your application (ID: {}).",
            record.position, record.application_id
        )?;
        writeln!(f, "Our team will review it and get back to you.")?;
        writeln!(f)?;
        writeln!(f, "Best,")?;
        write!(f, "{}", self.from_name)
    }
}

/// Recruiting copy listing every field in a fixed order.
pub struct HrNotification<'a> {
    pub record: &'a SubmissionRecord,
}

impl HrNotification<'_> {
    pub fn subject(&self) -> String {
        format!(
            "[New Application] {} - {} - {}",
            self.record.full_name, self.record.position, self.record.application_id
        )
    }

    pub fn lines(&self) -> Vec<String> {
        let record = self.record;
        let mut lines = vec![
            format!("Application ID: {}", record.application_id),
            format!("Submitted (UTC): {}", record.timestamp_iso()),
            format!("Name: {}", record.full_name),
            format!("Email: {}", record.email),
            format!("Phone: {}", record.phone),
            format!("Position: {}", record.position),
            format!("Experience (yrs): {:.1}", record.years_experience),
            format!("Expected Salary: {}", record.expected_salary),
            format!("Location: {}", record.location),
            format!("LinkedIn: {}", record.linkedin),
            format!("Referred: {}", record.referred_label()),
        ];
        if record.referred {
            lines.push(format!("Referrer Name: {}", record.referrer.name));
            lines.push(format!("Referrer Emp ID: {}", record.referrer.employee_id));
            lines.push(format!("Referrer Email: {}", record.referrer.email));
        }
        lines.push(format!("Resume: {}", record.resume.filename));
        if let Some(cover_letter) = &record.cover_letter {
            lines.push(format!("Cover Letter File: {}", cover_letter.filename));
        }
        if !record.notes.is_empty() {
            lines.push(String::new());
            lines.push("Cover Letter:".to_string());
            lines.push(record.notes.clone());
        }
        lines
    }
}

impl Display for HrNotification<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

pub struct ReferrerNotice<'a> {
    pub record: &'a SubmissionRecord,
    pub from_name: &'a str,
}

impl ReferrerNotice<'_> {
    pub fn subject(&self) -> String {
        format!(
            "You Referred an Applicant - {} for {} ({})",
            self.record.full_name, self.record.position, self.record.application_id
        )
    }
}

impl Display for ReferrerNotice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.record;
        writeln!(f, "Hello {},", record.referrer.name)?;
        writeln!(f)?;
        writeln!(
            f,
            "This is to notify you that {} has submitted an application for the {} role and listed you as a referrer.",
            record.full_name, record.position
        )?;
        writeln!(f, "Application ID: {}", record.application_id)?;
        writeln!(f)?;
        writeln!(f, "Best,")?;
        write!(f, "{}", self.from_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::domain::{ApplicationId, Attachment, Referrer};
    use chrono::{TimeZone, Utc};

    fn record() -> SubmissionRecord {
        SubmissionRecord {
            application_id: ApplicationId("APP-1740821400".to_string()),
            submitted_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: "+44 20 0000".to_string(),
            position: "Engineer".to_string(),
            years_experience: 5.0,
            expected_salary: "120000".to_string(),
            location: "London".to_string(),
            linkedin: String::new(),
            notes: String::new(),
            referred: false,
            referrer: Referrer::default(),
            resume: Attachment {
                filename: "APP-1740821400_Ada_Lovelace.pdf".to_string(),
                bytes: Vec::new(),
            },
            cover_letter: None,
        }
    }

    #[test]
    fn applicant_confirmation_mentions_id_and_sender() {
        let record = record();
        let template = ApplicantConfirmation {
            record: &record,
            from_name: "Recruiting Team",
        };
        assert_eq!(
            template.subject(),
            "Application Submitted Successfully - APP-1740821400"
        );
        let body = template.to_string();
        assert!(body.starts_with("Hi Ada Lovelace,"));
        assert!(body.contains("(ID: APP-1740821400)"));
        assert!(body.ends_with("Best,\nRecruiting Team"));
    }

    #[test]
    fn hr_notification_lists_fields_in_fixed_order() {
        let record = record();
        let lines = HrNotification { record: &record }.lines();
        let labels: Vec<&str> = lines
            .iter()
            .map(|line| line.split(':').next().unwrap_or_default())
            .collect();
        assert_eq!(
            labels,
            vec![
                "Application ID",
                "Submitted (UTC)",
                "Name",
                "Email",
                "Phone",
                "Position",
                "Experience (yrs)",
                "Expected Salary",
                "Location",
                "LinkedIn",
                "Referred",
                "Resume",
            ]
        );
        assert_eq!(lines[1], "Submitted (UTC): 2025-03-01T09:30:00Z");
        assert_eq!(lines[6], "Experience (yrs): 5.0");
        assert_eq!(lines[10], "Referred: No");
    }

    #[test]
    fn hr_notification_appends_referrer_and_notes() {
        let mut record = record();
        record.referred = true;
        record.referrer = Referrer {
            name: "Grace Hopper".to_string(),
            employee_id: "E-42".to_string(),
            email: "grace@example.com".to_string(),
        };
        record.notes = "Happy to relocate.".to_string();
        record.cover_letter = Some(Attachment {
            filename: "letter.pdf".to_string(),
            bytes: Vec::new(),
        });

        let template = HrNotification { record: &record };
        assert_eq!(
            template.subject(),
            "[New Application] Ada Lovelace - Engineer - APP-1740821400"
        );
        let body = template.to_string();
        assert!(body.contains(
            "Referred: Yes\nReferrer Name: Grace Hopper\nReferrer Emp ID: E-42\nReferrer Email: grace@example.com\n"
        ));
        assert!(body.contains("Cover Letter File: letter.pdf"));
        assert!(body.ends_with("\n\nCover Letter:\nHappy to relocate."));
    }

    #[test]
    fn referrer_notice_greets_the_referrer() {
        let mut record = record();
        record.referred = true;
        record.referrer.name = "Grace Hopper".to_string();
        let template = ReferrerNotice {
            record: &record,
            from_name: "Recruiting Team",
        };
        assert_eq!(
            template.subject(),
            "You Referred an Applicant - Ada Lovelace for Engineer (APP-1740821400)"
        );
        let body = template.to_string();
        assert!(body.starts_with("Hello Grace Hopper,"));
        assert!(body.contains("Application ID: APP-1740821400"));
    }
}
