use clap::ValueEnum;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Worker,
    Employer,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Worker => "worker",
            AccountType::Employer => "employer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Draft,
    Active,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Shortlisted,
    Rejected,
    Accepted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Accepted => "accepted",
        }
    }
}

macro_rules! impl_text_enum {
    ($ty:ty, [$(($variant:path, $text:literal)),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($variant),)+
                    other => Err(format!("unknown value '{other}'")),
                }
            }
        }

        impl ToSql for $ty {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $ty {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|_| FromSqlError::InvalidType)
            }
        }
    };
}

impl_text_enum!(
    AccountType,
    [(AccountType::Worker, "worker"), (AccountType::Employer, "employer")]
);
impl_text_enum!(
    JobStatus,
    [
        (JobStatus::Draft, "draft"),
        (JobStatus::Active, "active"),
        (JobStatus::Closed, "closed"),
    ]
);
impl_text_enum!(
    ApplicationStatus,
    [
        (ApplicationStatus::Pending, "pending"),
        (ApplicationStatus::Reviewing, "reviewing"),
        (ApplicationStatus::Shortlisted, "shortlisted"),
        (ApplicationStatus::Rejected, "rejected"),
        (ApplicationStatus::Accepted, "accepted"),
    ]
);

/// Account record plus the full (optional) profile. Fields left untouched by
/// a profile save keep their stored values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub password: String, // plaintext, compared exactly at login
    pub full_name: String,
    pub account_type: AccountType,
    // Employer registration fields
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
    // Worker registration fields
    pub skills: Option<String>, // comma-separated, as entered
    pub experience: Option<String>,
    // Profile fields
    pub phone: Option<String>,
    pub location: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub employment_type: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub education: Option<String>,
    pub school: Option<String>,
    pub degree: Option<String>,
    pub work_location: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_period: Option<String>,
    pub open_to_work: bool,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub website: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// What registration collects. Everything else on `User` starts empty and is
/// filled in through profile edits.
#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub account_type: AccountType,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
}

/// Partial profile save. `None` preserves the stored value, `Some` overwrites.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub headline: Option<String>,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub employment_type: Option<String>,
    pub skills: Option<String>,
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub education: Option<String>,
    pub school: Option<String>,
    pub degree: Option<String>,
    pub work_location: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    pub salary_period: Option<String>,
    pub open_to_work: Option<bool>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub portfolio: Option<String>,
    pub website: Option<String>,
    pub company_name: Option<String>,
    pub company_size: Option<String>,
    pub industry: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.headline.is_none()
            && self.bio.is_none()
            && self.experience.is_none()
            && self.employment_type.is_none()
            && self.skills.is_none()
            && self.job_title.is_none()
            && self.company.is_none()
            && self.education.is_none()
            && self.school.is_none()
            && self.degree.is_none()
            && self.work_location.is_none()
            && self.salary_min.is_none()
            && self.salary_max.is_none()
            && self.salary_period.is_none()
            && self.open_to_work.is_none()
            && self.linkedin.is_none()
            && self.github.is_none()
            && self.portfolio.is_none()
            && self.website.is_none()
            && self.company_name.is_none()
            && self.company_size.is_none()
            && self.industry.is_none()
    }
}

/// Logged-in identity. Serialized to a small JSON file in one of two scopes
/// depending on the "remember me" choice at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub full_name: String,
    pub account_type: AccountType,
    pub company_name: Option<String>,
    pub login_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub employer_email: String,
    pub employer_name: String,
    pub company_name: String,
    pub job_title: String,
    pub job_description: String,
    pub job_type: String,         // full-time, part-time, contract, freelance
    pub experience_level: String, // entry, mid, senior
    pub salary_min: f64,
    pub salary_max: f64,
    pub salary_period: String, // year, month, hour, project
    pub work_location: String, // remote, hybrid, onsite
    pub location: String,
    pub required_skills: Vec<String>,
    pub preferred_skills: Vec<String>,
    pub requirements: Option<String>,
    pub deadline: Option<String>,
    pub positions: i64,
    pub status: JobStatus,
    pub views: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub job_title: String,    // denormalized from the job at apply time
    pub company_name: String, // same
    pub employer_email: String,
    pub worker_email: String,
    pub worker_name: String,
    pub status: ApplicationStatus,
    pub applied_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: String,
    pub owner_email: String,
    pub title: String,
    pub description: String,
    pub technologies: Option<String>, // comma-separated
    pub link: Option<String>,
    pub image_url: Option<String>,
    pub featured: bool,
    pub item_type: String, // web, design, other
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Splits a comma-separated skills string, dropping empty entries.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_skills_trims_and_drops_empties() {
        assert_eq!(
            split_skills("Go, SQL, ,  Rust,"),
            vec!["Go".to_string(), "SQL".to_string(), "Rust".to_string()]
        );
        assert!(split_skills("").is_empty());
    }

    #[test]
    fn status_text_round_trips() {
        for s in [JobStatus::Draft, JobStatus::Active, JobStatus::Closed] {
            assert_eq!(s.as_str().parse::<JobStatus>().unwrap(), s);
        }
        for s in [
            ApplicationStatus::Pending,
            ApplicationStatus::Reviewing,
            ApplicationStatus::Shortlisted,
            ApplicationStatus::Rejected,
            ApplicationStatus::Accepted,
        ] {
            assert_eq!(s.as_str().parse::<ApplicationStatus>().unwrap(), s);
        }
        assert!("archived".parse::<JobStatus>().is_err());
    }

    #[test]
    fn session_serializes_with_original_field_names() {
        let session = Session {
            email: "w@example.com".into(),
            full_name: "Wren Doe".into(),
            account_type: AccountType::Worker,
            company_name: None,
            login_time: "2026-01-01T00:00:00Z".into(),
        };
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"fullName\""));
        assert!(json.contains("\"accountType\":\"worker\""));
        assert!(json.contains("\"loginTime\""));
    }
}
