//! Input validation rules. Each failure maps to `Error::Validation` with the
//! message the user sees.

use anyhow::Result;

use crate::error::Error;
use crate::models::AccountType;

pub fn validate_registration(
    account_type: AccountType,
    password: &str,
    confirm_password: &str,
    accept_terms: bool,
    skills: Option<&str>,
    experience: Option<&str>,
    company_name: Option<&str>,
    company_size: Option<&str>,
    industry: Option<&str>,
) -> Result<()> {
    if password.len() < 8 {
        return fail("Password must be at least 8 characters long");
    }
    if password != confirm_password {
        return fail("Passwords do not match");
    }
    if !accept_terms {
        return fail("Please agree to the Terms of Service and Privacy Policy");
    }
    match account_type {
        AccountType::Worker => {
            if is_blank(skills) || is_blank(experience) {
                return fail("Worker accounts require --skills and --experience");
            }
        }
        AccountType::Employer => {
            if is_blank(company_name) || is_blank(company_size) || is_blank(industry) {
                return fail(
                    "Employer accounts require --company-name, --company-size and --industry",
                );
            }
        }
    }
    Ok(())
}

pub fn validate_job_form(
    job_title: &str,
    job_description: &str,
    salary_min: f64,
    salary_max: f64,
) -> Result<()> {
    if job_title.trim().len() < 5 {
        return fail("Job title must be at least 5 characters long");
    }
    if job_description.trim().len() < 100 {
        return fail("Job description must be at least 100 characters long");
    }
    if salary_min < 0.0 || salary_max < 0.0 {
        return fail("Salary values must be positive");
    }
    if salary_min >= salary_max {
        return fail("Maximum salary must be greater than minimum salary");
    }
    Ok(())
}

/// Profile salary bounds are optional; only checked when both are present.
pub fn validate_salary_expectation(min: Option<f64>, max: Option<f64>) -> Result<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min >= max {
            return fail("Maximum salary must be greater than minimum salary");
        }
    }
    Ok(())
}

pub fn validate_portfolio_item(title: &str, description: &str) -> Result<()> {
    if title.trim().is_empty() {
        return fail("Please enter a project title");
    }
    let description = description.trim();
    if description.is_empty() {
        return fail("Please enter a project description");
    }
    if description.len() < 20 {
        return fail("Project description must be at least 20 characters");
    }
    if description.len() > 500 {
        return fail("Project description must be at most 500 characters");
    }
    Ok(())
}

fn fail(message: &str) -> Result<()> {
    Err(Error::Validation(message.to_string()).into())
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn worker_ok() -> Result<()> {
        validate_registration(
            AccountType::Worker,
            "hunter2hunter2",
            "hunter2hunter2",
            true,
            Some("Rust, SQL"),
            Some("5 years"),
            None,
            None,
            None,
        )
    }

    #[test]
    fn registration_happy_path() {
        assert!(worker_ok().is_ok());
    }

    #[test]
    fn registration_rejects_short_password() {
        let err = validate_registration(
            AccountType::Worker,
            "short",
            "short",
            true,
            Some("Rust"),
            Some("1 year"),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("at least 8 characters"));
    }

    #[test]
    fn registration_rejects_mismatched_passwords() {
        let err = validate_registration(
            AccountType::Worker,
            "password1",
            "password2",
            true,
            Some("Rust"),
            Some("1 year"),
            None,
            None,
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("do not match"));
    }

    #[test]
    fn registration_requires_terms_and_role_fields() {
        assert!(validate_registration(
            AccountType::Worker,
            "password1",
            "password1",
            false,
            Some("Rust"),
            Some("1 year"),
            None,
            None,
            None,
        )
        .is_err());

        assert!(validate_registration(
            AccountType::Employer,
            "password1",
            "password1",
            true,
            None,
            None,
            Some("Acme"),
            None, // missing size
            Some("Tech"),
        )
        .is_err());
    }

    #[test]
    fn job_form_bounds() {
        let long_desc = "d".repeat(100);
        assert!(validate_job_form("Backend Engineer", &long_desc, 100.0, 200.0).is_ok());
        assert!(validate_job_form("Dev", &long_desc, 100.0, 200.0).is_err());
        assert!(validate_job_form("Backend Engineer", "too short", 100.0, 200.0).is_err());
        assert!(validate_job_form("Backend Engineer", &long_desc, 200.0, 100.0).is_err());
        assert!(validate_job_form("Backend Engineer", &long_desc, 150.0, 150.0).is_err());
        assert!(validate_job_form("Backend Engineer", &long_desc, -1.0, 200.0).is_err());
    }

    #[test]
    fn salary_expectation_only_checked_when_both_present() {
        assert!(validate_salary_expectation(None, None).is_ok());
        assert!(validate_salary_expectation(Some(100.0), None).is_ok());
        assert!(validate_salary_expectation(Some(100.0), Some(200.0)).is_ok());
        assert!(validate_salary_expectation(Some(200.0), Some(100.0)).is_err());
    }

    #[test]
    fn portfolio_item_description_window() {
        assert!(validate_portfolio_item("Site", "A twenty character description.").is_ok());
        assert!(validate_portfolio_item("", "A twenty character description.").is_err());
        assert!(validate_portfolio_item("Site", "short").is_err());
        assert!(validate_portfolio_item("Site", &"x".repeat(501)).is_err());
    }
}
