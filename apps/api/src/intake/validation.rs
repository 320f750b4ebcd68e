use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const REQUIRED: &str = "This field is required.";

/// Raw urlencoded form body. Every field is optional here so that a
/// missing field becomes a validation message instead of a 422 from the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JobDetailsForm {
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub hirer_name: Option<String>,
    pub hirer_gender: Option<String>,
    pub job_description: Option<String>,
    pub company_overview: Option<String>,
    pub relevant_experience: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HirerGender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl HirerGender {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" | "unknown" => Some(HirerGender::Unknown),
            "male" => Some(HirerGender::Male),
            "female" => Some(HirerGender::Female),
            _ => None,
        }
    }

    /// Courtesy title used in the cover letter salutation.
    pub fn salutation(&self) -> &'static str {
        match self {
            HirerGender::Male => "Mr.",
            HirerGender::Female | HirerGender::Unknown => "Ms.",
        }
    }
}

/// Validated job-application details. All strings are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobDetails {
    pub job_title: String,
    pub company_name: String,
    /// Empty when not provided.
    pub hirer_name: String,
    pub hirer_gender: HirerGender,
    pub job_description: String,
    pub company_overview: String,
    /// Empty when not provided.
    pub relevant_experience: String,
}

fn markup_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[<>{}]").expect("static regex is valid"))
}

fn person_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z\s'-]+$").expect("static regex is valid"))
}

fn trimmed(value: &Option<String>) -> String {
    value.as_deref().unwrap_or_default().trim().to_string()
}

/// Required text with a character-count range. Returns the first failure for the field.
fn check_required(
    value: &str,
    min: usize,
    max: usize,
    length_message: &str,
) -> Result<(), String> {
    if value.is_empty() {
        return Err(REQUIRED.to_string());
    }
    let len = value.chars().count();
    if len < min || len > max {
        return Err(length_message.to_string());
    }
    Ok(())
}

impl JobDetailsForm {
    /// Validates every field and returns either clean details or the full
    /// list of `"<field>: <message>"` errors.
    pub fn validate(&self) -> Result<JobDetails, Vec<String>> {
        let mut errors = Vec::new();
        let mut fail = |field: &str, message: String| errors.push(format!("{field}: {message}"));

        let job_title = trimmed(&self.job_title);
        if let Err(e) = check_required(
            &job_title,
            3,
            100,
            "Job title must be between 3 and 100 characters",
        ) {
            fail("job_title", e);
        }
        if !job_title.is_empty() && markup_chars().is_match(&job_title) {
            fail("job_title", "Job title contains invalid characters".to_string());
        }

        let company_name = trimmed(&self.company_name);
        if let Err(e) = check_required(
            &company_name,
            2,
            100,
            "Company name must be between 2 and 100 characters",
        ) {
            fail("company_name", e);
        }
        if !company_name.is_empty() && markup_chars().is_match(&company_name) {
            fail(
                "company_name",
                "Company name contains invalid characters".to_string(),
            );
        }

        let hirer_name = trimmed(&self.hirer_name);
        if !hirer_name.is_empty() && !person_name().is_match(&hirer_name) {
            fail(
                "hirer_name",
                "Hirer name can only contain letters, spaces, hyphens, and apostrophes"
                    .to_string(),
            );
        }

        let hirer_gender = match HirerGender::parse(&trimmed(&self.hirer_gender)) {
            Some(gender) => gender,
            None => {
                fail("hirer_gender", "Not a valid choice.".to_string());
                HirerGender::Unknown
            }
        };

        let job_description = trimmed(&self.job_description);
        if let Err(e) = check_required(
            &job_description,
            100,
            5000,
            "Job description must be between 100 and 5000 characters",
        ) {
            fail("job_description", e);
        }

        let company_overview = trimmed(&self.company_overview);
        if let Err(e) = check_required(
            &company_overview,
            50,
            2000,
            "Company overview must be between 50 and 2000 characters",
        ) {
            fail("company_overview", e);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(JobDetails {
            job_title,
            company_name,
            hirer_name,
            hirer_gender,
            job_description,
            company_overview,
            relevant_experience: trimmed(&self.relevant_experience),
        })
    }
}
