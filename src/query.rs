//! Pure helpers over in-memory collections, applied search, then filter,
//! then sort. Linear scans are fine at the data volumes involved.

use clap::ValueEnum;
use std::collections::HashMap;

use crate::models::{Application, ApplicationStatus, Job, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JobSort {
    Newest,
    Oldest,
    SalaryHigh,
    SalaryLow,
}

/// Case-insensitive substring search across title, company, description and
/// required skills. An empty term keeps everything.
pub fn search_jobs(jobs: &[Job], term: &str) -> Vec<Job> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return jobs.to_vec();
    }
    jobs.iter()
        .filter(|job| {
            job.job_title.to_lowercase().contains(&term)
                || job.company_name.to_lowercase().contains(&term)
                || job.job_description.to_lowercase().contains(&term)
                || job
                    .required_skills
                    .iter()
                    .any(|skill| skill.to_lowercase().contains(&term))
        })
        .cloned()
        .collect()
}

pub fn filter_jobs_by_field(
    jobs: Vec<Job>,
    job_type: Option<&str>,
    work_location: Option<&str>,
    experience_level: Option<&str>,
) -> Vec<Job> {
    jobs.into_iter()
        .filter(|job| {
            job_type.is_none_or(|v| job.job_type == v)
                && work_location.is_none_or(|v| job.work_location == v)
                && experience_level.is_none_or(|v| job.experience_level == v)
        })
        .collect()
}

pub fn sort_jobs(jobs: &mut [Job], order: JobSort) {
    match order {
        JobSort::Newest => jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        JobSort::Oldest => jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        JobSort::SalaryHigh => jobs.sort_by(|a, b| {
            b.salary_max
                .partial_cmp(&a.salary_max)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        JobSort::SalaryLow => jobs.sort_by(|a, b| {
            a.salary_min
                .partial_cmp(&b.salary_min)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

pub fn filter_applications_by_status(
    apps: Vec<Application>,
    status: Option<ApplicationStatus>,
) -> Vec<Application> {
    match status {
        Some(status) => apps.into_iter().filter(|a| a.status == status).collect(),
        None => apps,
    }
}

pub fn sort_applications_newest(apps: &mut [Application]) {
    apps.sort_by(|a, b| b.applied_at.cmp(&a.applied_at));
}

pub fn jobs_by_id(jobs: Vec<Job>) -> HashMap<String, Job> {
    jobs.into_iter().map(|job| (job.id.clone(), job)).collect()
}

/// Employer-side candidate search: worker name, worker email, job title.
/// Applications whose job is gone are excluded from search results.
pub fn search_received_applications(
    apps: &[Application],
    jobs: &HashMap<String, Job>,
    term: &str,
) -> Vec<Application> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return apps.to_vec();
    }
    apps.iter()
        .filter(|app| {
            let Some(job) = jobs.get(&app.job_id) else {
                return false;
            };
            app.worker_name.to_lowercase().contains(&term)
                || app.worker_email.to_lowercase().contains(&term)
                || job.job_title.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

/// Worker-side search over their own applications: job title, company,
/// location of the underlying job.
pub fn search_worker_applications(
    apps: &[Application],
    jobs: &HashMap<String, Job>,
    term: &str,
) -> Vec<Application> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return apps.to_vec();
    }
    apps.iter()
        .filter(|app| {
            let Some(job) = jobs.get(&app.job_id) else {
                return false;
            };
            job.job_title.to_lowercase().contains(&term)
                || job.company_name.to_lowercase().contains(&term)
                || job.location.to_lowercase().contains(&term)
        })
        .cloned()
        .collect()
}

pub fn search_portfolio<'a>(
    items: &'a [crate::models::PortfolioItem],
    term: &str,
) -> Vec<&'a crate::models::PortfolioItem> {
    let term = term.trim().to_lowercase();
    items
        .iter()
        .filter(|item| {
            term.is_empty()
                || item.title.to_lowercase().contains(&term)
                || item.description.to_lowercase().contains(&term)
                || item
                    .technologies
                    .as_deref()
                    .is_some_and(|t| t.to_lowercase().contains(&term))
        })
        .collect()
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ApplicationCounts {
    pub total: usize,
    pub pending: usize,
    pub reviewing: usize,
    pub shortlisted: usize,
    pub rejected: usize,
    pub accepted: usize,
}

pub fn application_counts(apps: &[Application]) -> ApplicationCounts {
    let mut counts = ApplicationCounts {
        total: apps.len(),
        ..Default::default()
    };
    for app in apps {
        match app.status {
            ApplicationStatus::Pending => counts.pending += 1,
            ApplicationStatus::Reviewing => counts.reviewing += 1,
            ApplicationStatus::Shortlisted => counts.shortlisted += 1,
            ApplicationStatus::Rejected => counts.rejected += 1,
            ApplicationStatus::Accepted => counts.accepted += 1,
        }
    }
    counts
}

/// Company name when set, otherwise the first word of the full name.
pub fn display_name(company_name: Option<&str>, full_name: &str) -> String {
    match company_name {
        Some(company) if !company.trim().is_empty() => company.to_string(),
        _ => full_name
            .split_whitespace()
            .next()
            .unwrap_or(full_name)
            .to_string(),
    }
}

/// Profile completion over the 13-field heuristic; the three link fields
/// count as one.
pub fn profile_completion(user: &User) -> u32 {
    let has_link = [&user.linkedin, &user.github, &user.portfolio]
        .iter()
        .any(|v| filled(v.as_deref()));
    let fields = [
        filled(Some(&user.full_name)),
        filled(Some(&user.email)),
        filled(user.phone.as_deref()),
        filled(user.location.as_deref()),
        filled(user.headline.as_deref()),
        filled(user.bio.as_deref()),
        filled(user.experience.as_deref()),
        filled(user.skills.as_deref()),
        filled(user.job_title.as_deref()),
        filled(user.company.as_deref()),
        filled(user.education.as_deref()),
        filled(user.work_location.as_deref()),
        has_link,
    ];
    let done = fields.iter().filter(|f| **f).count();
    ((done as f64 / fields.len() as f64) * 100.0).round() as u32
}

fn filled(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// "Today", "Yesterday", then day/week/month buckets. Unparseable input is
/// shown as-is.
pub fn format_relative(timestamp: &str) -> String {
    let Ok(then) = chrono::DateTime::parse_from_rfc3339(timestamp) else {
        return timestamp.to_string();
    };
    let days = chrono::Utc::now()
        .signed_duration_since(then.with_timezone(&chrono::Utc))
        .num_days()
        .abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{days} days ago"),
        7..=29 => format!("{} weeks ago", days / 7),
        _ => format!("{} months ago", days / 30),
    }
}

/// "$120,000 - $180,000/year" style range.
pub fn format_salary(min: f64, max: f64, period: &str) -> String {
    let suffix = match period {
        "year" | "month" | "hour" | "project" => format!("/{period}"),
        _ => String::new(),
    };
    format!(
        "${} - ${}{}",
        group_thousands(min),
        group_thousands(max),
        suffix
    )
}

fn group_thousands(value: f64) -> String {
    let n = value.round() as i64;
    let digits = n.abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 { format!("-{out}") } else { out }
}
