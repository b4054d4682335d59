mod db;
mod error;
mod models;
mod query;
mod session;
mod status;
mod validate;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use db::{Database, new_record_id};
use error::Error;
use models::{
    AccountType, Application, ApplicationStatus, Job, JobStatus, PortfolioItem, ProfileUpdate,
    Registration, Session, split_skills,
};
use query::JobSort;
use session::{SessionStore, require_role};

#[derive(Parser)]
#[command(name = "verihire")]
#[command(about = "Local job board - register, post, browse, apply, and track")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Create a worker or employer account
    Register {
        #[arg(long)]
        full_name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        confirm_password: String,

        /// worker or employer
        #[arg(long, value_enum)]
        account_type: AccountType,

        /// Comma-separated skills (workers)
        #[arg(long)]
        skills: Option<String>,

        /// Experience summary (workers)
        #[arg(long)]
        experience: Option<String>,

        #[arg(long)]
        company_name: Option<String>,

        #[arg(long)]
        company_size: Option<String>,

        #[arg(long)]
        industry: Option<String>,

        /// Agree to the Terms of Service and Privacy Policy
        #[arg(long)]
        accept_terms: bool,
    },

    /// Log in
    Login {
        email: String,

        #[arg(long)]
        password: String,

        /// Keep the session across restarts
        #[arg(long)]
        remember: bool,
    },

    /// Log out (clears both session scopes)
    Logout,

    /// Show the current session
    Whoami,

    /// Manage your job postings (employers)
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Browse active jobs (workers)
    Browse {
        /// Search term matched against title, company, description, skills
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by job type (full-time, part-time, contract, freelance)
        #[arg(long)]
        job_type: Option<String>,

        /// Filter by work location (remote, hybrid, onsite)
        #[arg(long)]
        work_location: Option<String>,

        /// Filter by experience level (entry, mid, senior)
        #[arg(long)]
        experience: Option<String>,

        #[arg(long, value_enum, default_value = "newest")]
        sort: JobSort,
    },

    /// View a job posting (workers)
    Show {
        /// Job ID
        job_id: String,
    },

    /// Apply to a job (workers)
    Apply {
        /// Job ID
        job_id: String,
    },

    /// Track applications
    Applications {
        #[command(subcommand)]
        command: ApplicationCommands,
    },

    /// View or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Manage your portfolio (workers)
    Portfolio {
        #[command(subcommand)]
        command: PortfolioCommands,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// Post a new job (or save a draft)
    Post {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        #[arg(long, default_value = "full-time")]
        job_type: String,

        #[arg(long, default_value = "mid")]
        experience_level: String,

        #[arg(long)]
        salary_min: f64,

        #[arg(long)]
        salary_max: f64,

        #[arg(long, default_value = "year")]
        salary_period: String,

        #[arg(long, default_value = "onsite")]
        work_location: String,

        #[arg(long)]
        location: String,

        /// Comma-separated required skills
        #[arg(long)]
        required_skills: String,

        /// Comma-separated preferred skills
        #[arg(long)]
        preferred_skills: Option<String>,

        #[arg(long)]
        requirements: Option<String>,

        /// Application deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        #[arg(long, default_value = "1")]
        positions: i64,

        /// Save as draft instead of publishing
        #[arg(long)]
        draft: bool,
    },

    /// List your jobs
    List {
        /// Filter by status (draft, active, closed)
        #[arg(short, long, value_enum)]
        status: Option<JobStatus>,
    },

    /// Show one of your jobs, with its applications
    Show {
        /// Job ID
        id: String,
    },

    /// Publish a draft
    Publish { id: String },

    /// Close an active job
    Close { id: String },

    /// Reopen a closed job
    Reopen { id: String },

    /// Delete a job permanently
    Delete { id: String },
}

#[derive(Subcommand)]
enum ApplicationCommands {
    /// List your applications (workers)
    Mine {
        /// Filter by status (pending, reviewing, shortlisted, rejected, accepted)
        #[arg(long, value_enum)]
        status: Option<ApplicationStatus>,

        /// Search by job title, company, or location
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Withdraw one of your applications (workers)
    Withdraw {
        /// Application ID
        id: String,
    },

    /// List applications received for your jobs (employers)
    Received {
        /// Filter by job ID
        #[arg(long)]
        job: Option<String>,

        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<ApplicationStatus>,

        /// Search by candidate name, email, or job title
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Move an application through the review flow (employers)
    SetStatus {
        /// Application ID
        id: String,

        /// New status
        #[arg(value_enum)]
        status: ApplicationStatus,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile and its completion
    Show,

    /// Save profile fields; anything not passed keeps its stored value
    Edit {
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        headline: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        experience: Option<String>,
        #[arg(long)]
        employment_type: Option<String>,
        #[arg(long)]
        skills: Option<String>,
        #[arg(long)]
        job_title: Option<String>,
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        education: Option<String>,
        #[arg(long)]
        school: Option<String>,
        #[arg(long)]
        degree: Option<String>,
        #[arg(long)]
        work_location: Option<String>,
        #[arg(long)]
        salary_min: Option<f64>,
        #[arg(long)]
        salary_max: Option<f64>,
        #[arg(long)]
        salary_period: Option<String>,
        #[arg(long)]
        open_to_work: Option<bool>,
        #[arg(long)]
        linkedin: Option<String>,
        #[arg(long)]
        github: Option<String>,
        #[arg(long)]
        portfolio: Option<String>,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        company_name: Option<String>,
        #[arg(long)]
        company_size: Option<String>,
        #[arg(long)]
        industry: Option<String>,
    },
}

#[derive(Subcommand)]
enum PortfolioCommands {
    /// List your projects
    List {
        /// Search by title, description, or technologies
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Add a project
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// Comma-separated technologies
        #[arg(long)]
        technologies: Option<String>,

        #[arg(long)]
        link: Option<String>,

        #[arg(long)]
        image_url: Option<String>,

        #[arg(long)]
        featured: bool,

        /// web, design, or other
        #[arg(long, default_value = "web")]
        item_type: String,
    },

    /// Edit a project; anything not passed keeps its stored value
    Edit {
        /// Project ID
        id: String,

        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        technologies: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        featured: Option<bool>,
        #[arg(long)]
        item_type: Option<String>,
    },

    /// Delete a project
    Delete {
        /// Project ID
        id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Database::open()?;
    let sessions = SessionStore::open()?;

    match cli.command {
        Commands::Init => {
            db.init()?;
            println!("Database initialized at {}", db.path().display());
            let accounts = db.count_users()?;
            if accounts > 0 {
                println!("{accounts} existing account(s) kept");
            }
        }

        Commands::Register {
            full_name,
            email,
            password,
            confirm_password,
            account_type,
            skills,
            experience,
            company_name,
            company_size,
            industry,
            accept_terms,
        } => {
            db.ensure_initialized()?;
            validate::validate_registration(
                account_type,
                &password,
                &confirm_password,
                accept_terms,
                skills.as_deref(),
                experience.as_deref(),
                company_name.as_deref(),
                company_size.as_deref(),
                industry.as_deref(),
            )?;
            db.create_user(&Registration {
                full_name,
                email: email.clone(),
                password,
                account_type,
                skills,
                experience,
                company_name,
                company_size,
                industry,
            })?;
            println!("Account created successfully. Log in with 'verihire login {email}'.");
        }

        Commands::Login {
            email,
            password,
            remember,
        } => {
            db.ensure_initialized()?;
            let session = sessions.login(&db, &email, &password, remember)?;
            println!(
                "Logged in as {} ({})",
                query::display_name(session.company_name.as_deref(), &session.full_name),
                session.account_type
            );
        }

        Commands::Logout => {
            sessions.logout()?;
            println!("Logged out successfully");
        }

        Commands::Whoami => match sessions.current()? {
            Some(session) => {
                println!("Email: {}", session.email);
                println!("Name: {}", session.full_name);
                println!("Account type: {}", session.account_type);
                if let Some(company) = &session.company_name {
                    println!("Company: {company}");
                }
                println!("Logged in: {}", query::format_relative(&session.login_time));
            }
            None => println!("Not logged in."),
        },

        Commands::Job { command } => {
            db.ensure_initialized()?;
            let session = sessions.require_login()?;
            require_role(&session, AccountType::Employer)?;
            handle_job(&db, &session, command)?;
        }

        Commands::Browse {
            search,
            job_type,
            work_location,
            experience,
            sort,
        } => {
            db.ensure_initialized()?;
            let session = sessions.require_login()?;
            require_role(&session, AccountType::Worker)?;

            let active = db.list_jobs(None, Some(JobStatus::Active))?;
            let mut jobs = query::search_jobs(&active, search.as_deref().unwrap_or(""));
            jobs = query::filter_jobs_by_field(
                jobs,
                job_type.as_deref(),
                work_location.as_deref(),
                experience.as_deref(),
            );
            query::sort_jobs(&mut jobs, sort);

            if jobs.is_empty() {
                println!("No jobs found");
            } else {
                println!(
                    "{} job{} found",
                    jobs.len(),
                    if jobs.len() == 1 { "" } else { "s" }
                );
                println!(
                    "{:<26} {:<26} {:<18} {:<26} {:<10} {}",
                    "ID", "TITLE", "COMPANY", "SALARY", "POSTED", "APPLIED"
                );
                println!("{}", "-".repeat(116));
                for job in &jobs {
                    let applied = if db.has_applied(&job.id, &session.email)? {
                        "applied"
                    } else {
                        ""
                    };
                    println!(
                        "{:<26} {:<26} {:<18} {:<26} {:<10} {}",
                        truncate(&job.id, 24),
                        truncate(&job.job_title, 24),
                        truncate(&job.company_name, 16),
                        query::format_salary(job.salary_min, job.salary_max, &job.salary_period),
                        query::format_relative(&job.created_at),
                        applied
                    );
                }
            }
        }

        Commands::Show { job_id } => {
            db.ensure_initialized()?;
            let session = sessions.require_login()?;
            require_role(&session, AccountType::Worker)?;

            let job = db
                .get_job(&job_id)?
                .ok_or_else(|| Error::JobNotFound(job_id.clone()))?;
            db.record_job_view(&job.id)?;
            print_job_detail(&job);
            if db.has_applied(&job.id, &session.email)? {
                println!("\nYou have already applied to this job.");
            } else if job.status == JobStatus::Active {
                println!("\nApply with 'verihire apply {}'", job.id);
            }
        }

        Commands::Apply { job_id } => {
            db.ensure_initialized()?;
            let session = sessions.require_login()?;
            require_role(&session, AccountType::Worker)?;

            let job = db
                .get_job(&job_id)?
                .ok_or_else(|| Error::JobNotFound(job_id.clone()))?;
            if job.status != JobStatus::Active {
                return Err(
                    Error::Validation("This job is not accepting applications".into()).into(),
                );
            }
            if db.has_applied(&job.id, &session.email)? {
                return Err(Error::AlreadyApplied.into());
            }

            let application = Application {
                id: new_record_id("app"),
                job_id: job.id.clone(),
                job_title: job.job_title.clone(),
                company_name: job.company_name.clone(),
                employer_email: job.employer_email.clone(),
                worker_email: session.email.clone(),
                worker_name: session.full_name.clone(),
                status: ApplicationStatus::Pending,
                applied_at: Utc::now().to_rfc3339(),
            };
            db.insert_application(&application)?;
            println!(
                "Application submitted for '{}' at {} (ID: {})",
                job.job_title, job.company_name, application.id
            );
        }

        Commands::Applications { command } => {
            db.ensure_initialized()?;
            let session = sessions.require_login()?;
            handle_applications(&db, &session, command)?;
        }

        Commands::Profile { command } => {
            db.ensure_initialized()?;
            let session = sessions.require_login()?;
            handle_profile(&db, &sessions, session, command)?;
        }

        Commands::Portfolio { command } => {
            db.ensure_initialized()?;
            let session = sessions.require_login()?;
            require_role(&session, AccountType::Worker)?;
            handle_portfolio(&db, &session, command)?;
        }
    }

    Ok(())
}

fn handle_job(db: &Database, session: &Session, command: JobCommands) -> Result<()> {
    match command {
        JobCommands::Post {
            title,
            description,
            job_type,
            experience_level,
            salary_min,
            salary_max,
            salary_period,
            work_location,
            location,
            required_skills,
            preferred_skills,
            requirements,
            deadline,
            positions,
            draft,
        } => {
            validate::validate_job_form(&title, &description, salary_min, salary_max)?;
            let job = Job {
                id: new_record_id("job"),
                employer_email: session.email.clone(),
                employer_name: session.full_name.clone(),
                company_name: session
                    .company_name
                    .clone()
                    .unwrap_or_else(|| session.full_name.clone()),
                job_title: title,
                job_description: description,
                job_type,
                experience_level,
                salary_min,
                salary_max,
                salary_period,
                work_location,
                location,
                required_skills: split_skills(&required_skills),
                preferred_skills: preferred_skills.as_deref().map(split_skills).unwrap_or_default(),
                requirements,
                deadline,
                positions,
                status: if draft { JobStatus::Draft } else { JobStatus::Active },
                views: 0,
                created_at: Utc::now().to_rfc3339(),
            };
            db.insert_job(&job)?;
            if draft {
                println!("Job saved as draft (ID: {})", job.id);
            } else {
                println!("Job posted successfully (ID: {})", job.id);
            }
        }

        JobCommands::List { status } => {
            let all = db.list_jobs(Some(session.email.as_str()), None)?;
            let active = all.iter().filter(|j| j.status == JobStatus::Active).count();
            let draft = all.iter().filter(|j| j.status == JobStatus::Draft).count();
            let closed = all.iter().filter(|j| j.status == JobStatus::Closed).count();
            println!(
                "{} total | {} active | {} draft | {} closed",
                all.len(),
                active,
                draft,
                closed
            );

            let jobs: Vec<&Job> = match status {
                Some(status) => all.iter().filter(|j| j.status == status).collect(),
                None => all.iter().collect(),
            };
            if jobs.is_empty() {
                println!("No jobs with this status");
                return Ok(());
            }
            println!(
                "{:<26} {:<10} {:<26} {:<6} {:<6} {}",
                "ID", "STATUS", "TITLE", "APPS", "VIEWS", "POSTED"
            );
            println!("{}", "-".repeat(92));
            for job in jobs {
                let apps = db.list_applications_for_job(&job.id)?.len();
                println!(
                    "{:<26} {:<10} {:<26} {:<6} {:<6} {}",
                    truncate(&job.id, 24),
                    job.status,
                    truncate(&job.job_title, 24),
                    apps,
                    job.views,
                    query::format_relative(&job.created_at)
                );
            }
        }

        JobCommands::Show { id } => {
            let job = owned_job(db, session, &id)?;
            print_job_detail(&job);
            let apps = db.list_applications_for_job(&job.id)?;
            let counts = query::application_counts(&apps);
            println!(
                "\nApplications: {} total | {} pending | {} reviewing | {} shortlisted",
                counts.total, counts.pending, counts.reviewing, counts.shortlisted
            );
            for app in &apps {
                println!(
                    "  {} - {} <{}> ({}, {})",
                    app.id,
                    app.worker_name,
                    app.worker_email,
                    app.status,
                    query::format_relative(&app.applied_at)
                );
            }
        }

        JobCommands::Publish { id } => {
            owned_job(db, session, &id)?;
            db.set_job_status(&id, JobStatus::Active)?;
            println!("Job published successfully");
        }

        JobCommands::Close { id } => {
            owned_job(db, session, &id)?;
            db.set_job_status(&id, JobStatus::Closed)?;
            println!("Job closed successfully (reopen with 'verihire job reopen {id}')");
        }

        JobCommands::Reopen { id } => {
            owned_job(db, session, &id)?;
            db.set_job_status(&id, JobStatus::Active)?;
            println!("Job reopened successfully");
        }

        JobCommands::Delete { id } => {
            owned_job(db, session, &id)?;
            db.delete_job(&id)?;
            println!("Job deleted successfully");
        }
    }
    Ok(())
}

fn handle_applications(
    db: &Database,
    session: &Session,
    command: ApplicationCommands,
) -> Result<()> {
    match command {
        ApplicationCommands::Mine { status, search } => {
            require_role(session, AccountType::Worker)?;
            let all = db.list_applications_for_worker(&session.email)?;
            let counts = query::application_counts(&all);
            println!(
                "{} total | {} pending | {} reviewing | {} shortlisted | {} rejected",
                counts.total, counts.pending, counts.reviewing, counts.shortlisted, counts.rejected
            );

            let jobs = query::jobs_by_id(db.list_jobs(None, None)?);
            let mut apps = match search.as_deref() {
                Some(term) => query::search_worker_applications(&all, &jobs, term),
                None => all,
            };
            apps = query::filter_applications_by_status(apps, status);
            query::sort_applications_newest(&mut apps);

            if apps.is_empty() {
                println!("No applications found.");
                return Ok(());
            }
            println!(
                "{:<26} {:<12} {:<26} {:<18} {}",
                "ID", "STATUS", "JOB", "COMPANY", "APPLIED"
            );
            println!("{}", "-".repeat(94));
            for app in &apps {
                match jobs.get(&app.job_id) {
                    Some(job) => println!(
                        "{:<26} {:<12} {:<26} {:<18} {}",
                        truncate(&app.id, 24),
                        app.status,
                        truncate(&job.job_title, 24),
                        truncate(&job.company_name, 16),
                        query::format_relative(&app.applied_at)
                    ),
                    // the job was deleted out from under this application
                    None => println!(
                        "{:<26} {:<12} {:<26} {:<18} withdraw to remove",
                        truncate(&app.id, 24),
                        app.status,
                        "(job not found)",
                        truncate(&app.company_name, 16),
                    ),
                }
            }
        }

        ApplicationCommands::Withdraw { id } => {
            require_role(session, AccountType::Worker)?;
            let app = db
                .get_application(&id)?
                .filter(|app| app.worker_email == session.email)
                .ok_or_else(|| Error::ApplicationNotFound(id.clone()))?;
            db.delete_application(&app.id)?;
            println!("Application withdrawn successfully");
        }

        ApplicationCommands::Received {
            job,
            status,
            search,
        } => {
            require_role(session, AccountType::Employer)?;
            let all = db.list_applications_for_employer(&session.email)?;
            let counts = query::application_counts(&all);
            println!(
                "{} total | {} pending | {} reviewing | {} shortlisted",
                counts.total, counts.pending, counts.reviewing, counts.shortlisted
            );

            let jobs = query::jobs_by_id(db.list_jobs(Some(session.email.as_str()), None)?);
            let mut apps = match search.as_deref() {
                Some(term) => query::search_received_applications(&all, &jobs, term),
                None => all,
            };
            if let Some(job_id) = job.as_deref() {
                apps.retain(|app| app.job_id == job_id);
            }
            apps = query::filter_applications_by_status(apps, status);
            query::sort_applications_newest(&mut apps);

            if apps.is_empty() {
                println!("No applications match your filters");
                return Ok(());
            }
            println!(
                "{:<26} {:<12} {:<20} {:<24} {:<26} {}",
                "ID", "STATUS", "CANDIDATE", "EMAIL", "JOB", "APPLIED"
            );
            println!("{}", "-".repeat(120));
            for app in &apps {
                let job_title = jobs
                    .get(&app.job_id)
                    .map(|j| j.job_title.as_str())
                    .unwrap_or("(job not found)");
                println!(
                    "{:<26} {:<12} {:<20} {:<24} {:<26} {}",
                    truncate(&app.id, 24),
                    app.status,
                    truncate(&app.worker_name, 18),
                    truncate(&app.worker_email, 22),
                    truncate(job_title, 24),
                    query::format_relative(&app.applied_at)
                );
            }
        }

        ApplicationCommands::SetStatus { id, status } => {
            require_role(session, AccountType::Employer)?;
            db.get_application(&id)?
                .filter(|app| app.employer_email == session.email)
                .ok_or_else(|| Error::ApplicationNotFound(id.clone()))?;
            let app = db.set_application_status(&id, status)?;
            println!(
                "Application from {} moved to '{}'",
                app.worker_name, app.status
            );
        }
    }
    Ok(())
}

fn handle_profile(
    db: &Database,
    sessions: &SessionStore,
    session: Session,
    command: ProfileCommands,
) -> Result<()> {
    match command {
        ProfileCommands::Show => {
            let user = db
                .get_user(&session.email)?
                .ok_or_else(|| anyhow::anyhow!("No account found for {}", session.email))?;
            println!("{} ({})", user.full_name, user.account_type);
            println!("Email: {}", user.email);
            let fields: [(&str, Option<&str>); 18] = [
                ("Company", user.company_name.as_deref()),
                ("Company size", user.company_size.as_deref()),
                ("Industry", user.industry.as_deref()),
                ("Phone", user.phone.as_deref()),
                ("Location", user.location.as_deref()),
                ("Headline", user.headline.as_deref()),
                ("Bio", user.bio.as_deref()),
                ("Experience", user.experience.as_deref()),
                ("Skills", user.skills.as_deref()),
                ("Current title", user.job_title.as_deref()),
                ("Current company", user.company.as_deref()),
                ("Education", user.education.as_deref()),
                ("School", user.school.as_deref()),
                ("Degree", user.degree.as_deref()),
                ("Preferred location", user.work_location.as_deref()),
                ("LinkedIn", user.linkedin.as_deref()),
                ("GitHub", user.github.as_deref()),
                ("Website", user.website.as_deref()),
            ];
            for (label, value) in fields {
                if let Some(value) = value {
                    if !value.trim().is_empty() {
                        println!("{label}: {value}");
                    }
                }
            }
            if let (Some(min), Some(max)) = (user.salary_min, user.salary_max) {
                println!(
                    "Expected salary: {}",
                    query::format_salary(min, max, user.salary_period.as_deref().unwrap_or(""))
                );
            }
            if user.open_to_work {
                println!("Open to work: yes");
            }
            if user.account_type == AccountType::Worker {
                println!("Profile completion: {}%", query::profile_completion(&user));
            }
        }

        ProfileCommands::Edit {
            full_name,
            phone,
            location,
            headline,
            bio,
            experience,
            employment_type,
            skills,
            job_title,
            company,
            education,
            school,
            degree,
            work_location,
            salary_min,
            salary_max,
            salary_period,
            open_to_work,
            linkedin,
            github,
            portfolio,
            website,
            company_name,
            company_size,
            industry,
        } => {
            validate::validate_salary_expectation(salary_min, salary_max)?;
            let update = ProfileUpdate {
                full_name,
                phone,
                location,
                headline,
                bio,
                experience,
                employment_type,
                skills,
                job_title,
                company,
                education,
                school,
                degree,
                work_location,
                salary_min,
                salary_max,
                salary_period,
                open_to_work,
                linkedin,
                github,
                portfolio,
                website,
                company_name,
                company_size,
                industry,
            };
            if update.is_empty() {
                println!("Nothing to save.");
                return Ok(());
            }
            let user = db.update_profile(&session.email, &update)?;

            // keep the stored session's display identity in sync
            if user.full_name != session.full_name || user.company_name != session.company_name {
                let mut refreshed = session;
                refreshed.full_name = user.full_name.clone();
                refreshed.company_name = user.company_name.clone();
                sessions.refresh(&refreshed)?;
            }
            println!("Profile saved successfully");
            if user.account_type == AccountType::Worker {
                println!("Profile completion: {}%", query::profile_completion(&user));
            }
        }
    }
    Ok(())
}

fn handle_portfolio(db: &Database, session: &Session, command: PortfolioCommands) -> Result<()> {
    match command {
        PortfolioCommands::List { search } => {
            let items = db.list_portfolio(&session.email)?;
            let featured = items.iter().filter(|i| i.featured).count();
            let views: i64 = items.iter().map(|i| i.views).sum();
            println!(
                "{} project{} | {} featured | {} views",
                items.len(),
                if items.len() == 1 { "" } else { "s" },
                featured,
                views
            );

            let shown = query::search_portfolio(&items, search.as_deref().unwrap_or(""));
            if shown.is_empty() {
                println!("No projects match your search");
                return Ok(());
            }
            println!(
                "{:<30} {:<24} {:<8} {:<10} {}",
                "ID", "TITLE", "TYPE", "FEATURED", "UPDATED"
            );
            println!("{}", "-".repeat(86));
            for item in shown {
                println!(
                    "{:<30} {:<24} {:<8} {:<10} {}",
                    truncate(&item.id, 28),
                    truncate(&item.title, 22),
                    item.item_type,
                    if item.featured { "yes" } else { "" },
                    query::format_relative(&item.updated_at)
                );
            }
        }

        PortfolioCommands::Add {
            title,
            description,
            technologies,
            link,
            image_url,
            featured,
            item_type,
        } => {
            validate::validate_portfolio_item(&title, &description)?;
            let now = Utc::now().to_rfc3339();
            let item = PortfolioItem {
                id: new_record_id("project"),
                owner_email: session.email.clone(),
                title,
                description,
                technologies,
                link,
                image_url,
                featured,
                item_type,
                views: 0,
                created_at: now.clone(),
                updated_at: now,
            };
            db.upsert_portfolio_item(&item)?;
            println!("Project added successfully (ID: {})", item.id);
        }

        PortfolioCommands::Edit {
            id,
            title,
            description,
            technologies,
            link,
            image_url,
            featured,
            item_type,
        } => {
            let mut item = owned_project(db, session, &id)?;
            if let Some(title) = title {
                item.title = title;
            }
            if let Some(description) = description {
                item.description = description;
            }
            if let Some(technologies) = technologies {
                item.technologies = Some(technologies);
            }
            if let Some(link) = link {
                item.link = Some(link);
            }
            if let Some(image_url) = image_url {
                item.image_url = Some(image_url);
            }
            if let Some(featured) = featured {
                item.featured = featured;
            }
            if let Some(item_type) = item_type {
                item.item_type = item_type;
            }
            validate::validate_portfolio_item(&item.title, &item.description)?;
            item.updated_at = Utc::now().to_rfc3339();
            db.upsert_portfolio_item(&item)?;
            println!("Project updated successfully");
        }

        PortfolioCommands::Delete { id } => {
            owned_project(db, session, &id)?;
            db.delete_portfolio_item(&id)?;
            println!("Project deleted successfully");
        }
    }
    Ok(())
}

/// Loads a job and checks it belongs to the caller. Someone else's job is
/// reported as not found rather than as a permission error.
fn owned_job(db: &Database, session: &Session, id: &str) -> Result<Job> {
    db.get_job(id)?
        .filter(|job| job.employer_email == session.email)
        .ok_or_else(|| Error::JobNotFound(id.to_string()).into())
}

fn owned_project(db: &Database, session: &Session, id: &str) -> Result<PortfolioItem> {
    db.get_portfolio_item(id)?
        .filter(|item| item.owner_email == session.email)
        .ok_or_else(|| Error::ProjectNotFound(id.to_string()).into())
}

fn print_job_detail(job: &Job) {
    println!("{} at {}", job.job_title, job.company_name);
    println!("ID: {}", job.id);
    println!("Status: {}", job.status);
    println!(
        "Salary: {}",
        query::format_salary(job.salary_min, job.salary_max, &job.salary_period)
    );
    println!(
        "Location: {} ({}) | {} | {} level",
        job.location, job.work_location, job.job_type, job.experience_level
    );
    if !job.required_skills.is_empty() {
        println!("Required skills: {}", job.required_skills.join(", "));
    }
    if !job.preferred_skills.is_empty() {
        println!("Preferred skills: {}", job.preferred_skills.join(", "));
    }
    if let Some(deadline) = &job.deadline {
        println!("Deadline: {deadline}");
    }
    if job.positions > 1 {
        println!("Positions: {}", job.positions);
    }
    println!(
        "Posted {} | {} views",
        query::format_relative(&job.created_at),
        job.views
    );
    println!("\n{}", job.job_description);
    if let Some(requirements) = &job.requirements {
        println!("\nRequirements:\n{requirements}");
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
