use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Error;
use crate::models::{
    Application, ApplicationStatus, Job, JobStatus, PortfolioItem, ProfileUpdate, Registration,
    User,
};
use crate::status;

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open() -> Result<Self> {
        let path = Self::default_path()?;
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        debug!(path = %path.display(), "opened database");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn default_path() -> Result<PathBuf> {
        // XDG data directory or fallback to the working directory
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "verihire") {
            Ok(proj_dirs.data_dir().join("verihire.db"))
        } else {
            Ok(PathBuf::from("verihire.db"))
        }
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                email TEXT PRIMARY KEY,
                password TEXT NOT NULL,
                full_name TEXT NOT NULL,
                account_type TEXT NOT NULL CHECK (account_type IN ('worker', 'employer')),
                company_name TEXT,
                company_size TEXT,
                industry TEXT,
                skills TEXT,
                experience TEXT,
                phone TEXT,
                location TEXT,
                headline TEXT,
                bio TEXT,
                employment_type TEXT,
                job_title TEXT,
                company TEXT,
                education TEXT,
                school TEXT,
                degree TEXT,
                work_location TEXT,
                salary_min REAL,
                salary_max REAL,
                salary_period TEXT,
                open_to_work INTEGER NOT NULL DEFAULT 0,
                linkedin TEXT,
                github TEXT,
                portfolio TEXT,
                website TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                employer_email TEXT NOT NULL REFERENCES users(email),
                employer_name TEXT NOT NULL,
                company_name TEXT NOT NULL,
                job_title TEXT NOT NULL,
                job_description TEXT NOT NULL,
                job_type TEXT NOT NULL,
                experience_level TEXT NOT NULL,
                salary_min REAL NOT NULL,
                salary_max REAL NOT NULL,
                salary_period TEXT NOT NULL,
                work_location TEXT NOT NULL,
                location TEXT NOT NULL,
                required_skills TEXT NOT NULL DEFAULT '[]',
                preferred_skills TEXT NOT NULL DEFAULT '[]',
                requirements TEXT,
                deadline TEXT,
                positions INTEGER NOT NULL DEFAULT 1,
                status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('draft', 'active', 'closed')),
                views INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS applications (
                id TEXT PRIMARY KEY,
                job_id TEXT NOT NULL,
                job_title TEXT NOT NULL,
                company_name TEXT NOT NULL,
                employer_email TEXT NOT NULL,
                worker_email TEXT NOT NULL REFERENCES users(email),
                worker_name TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (status IN ('pending', 'reviewing', 'shortlisted', 'rejected', 'accepted')),
                applied_at TEXT NOT NULL,
                UNIQUE (job_id, worker_email)
            );

            CREATE TABLE IF NOT EXISTS portfolio_items (
                id TEXT PRIMARY KEY,
                owner_email TEXT NOT NULL REFERENCES users(email),
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                technologies TEXT,
                link TEXT,
                image_url TEXT,
                featured INTEGER NOT NULL DEFAULT 0,
                item_type TEXT NOT NULL DEFAULT 'web',
                views INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_jobs_employer ON jobs(employer_email);
            CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
            CREATE INDEX IF NOT EXISTS idx_applications_worker ON applications(worker_email);
            CREATE INDEX IF NOT EXISTS idx_applications_employer ON applications(employer_email);
            CREATE INDEX IF NOT EXISTS idx_applications_job ON applications(job_id);
            CREATE INDEX IF NOT EXISTS idx_portfolio_owner ON portfolio_items(owner_email);
            "#,
        )?;
        Ok(())
    }

    pub fn ensure_initialized(&self) -> Result<()> {
        let tables: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='users'",
            [],
            |row| row.get(0),
        )?;
        if tables == 0 {
            return Err(anyhow!("Database not initialized. Run 'verihire init' first."));
        }
        Ok(())
    }

    // --- User operations ---

    pub fn create_user(&self, reg: &Registration) -> Result<()> {
        if self.get_user(&reg.email)?.is_some() {
            return Err(Error::EmailTaken.into());
        }
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO users (email, password, full_name, account_type,
                                company_name, company_size, industry, skills, experience,
                                created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
            params![
                reg.email,
                reg.password,
                reg.full_name,
                reg.account_type,
                reg.company_name,
                reg.company_size,
                reg.industry,
                reg.skills,
                reg.experience,
                now,
            ],
        )?;
        debug!(email = %reg.email, account_type = %reg.account_type, "registered user");
        Ok(())
    }

    pub fn get_user(&self, email: &str) -> Result<Option<User>> {
        self.conn
            .query_row(
                "SELECT * FROM users WHERE email = ?1",
                [email],
                Self::row_to_user,
            )
            .optional()
            .context("Failed to load user")
    }

    pub fn count_users(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Merge-saves a profile: provided fields overwrite, the rest keep their
    /// stored values.
    pub fn update_profile(&self, email: &str, update: &ProfileUpdate) -> Result<User> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE users SET
                full_name = COALESCE(?2, full_name),
                phone = COALESCE(?3, phone),
                location = COALESCE(?4, location),
                headline = COALESCE(?5, headline),
                bio = COALESCE(?6, bio),
                experience = COALESCE(?7, experience),
                employment_type = COALESCE(?8, employment_type),
                skills = COALESCE(?9, skills),
                job_title = COALESCE(?10, job_title),
                company = COALESCE(?11, company),
                education = COALESCE(?12, education),
                school = COALESCE(?13, school),
                degree = COALESCE(?14, degree),
                work_location = COALESCE(?15, work_location),
                salary_min = COALESCE(?16, salary_min),
                salary_max = COALESCE(?17, salary_max),
                salary_period = COALESCE(?18, salary_period),
                open_to_work = COALESCE(?19, open_to_work),
                linkedin = COALESCE(?20, linkedin),
                github = COALESCE(?21, github),
                portfolio = COALESCE(?22, portfolio),
                website = COALESCE(?23, website),
                company_name = COALESCE(?24, company_name),
                company_size = COALESCE(?25, company_size),
                industry = COALESCE(?26, industry),
                updated_at = ?27
             WHERE email = ?1",
            params![
                email,
                update.full_name,
                update.phone,
                update.location,
                update.headline,
                update.bio,
                update.experience,
                update.employment_type,
                update.skills,
                update.job_title,
                update.company,
                update.education,
                update.school,
                update.degree,
                update.work_location,
                update.salary_min,
                update.salary_max,
                update.salary_period,
                update.open_to_work,
                update.linkedin,
                update.github,
                update.portfolio,
                update.website,
                update.company_name,
                update.company_size,
                update.industry,
                now,
            ],
        )?;
        if changed == 0 {
            return Err(anyhow!("No account found for {email}"));
        }
        self.get_user(email)?
            .ok_or_else(|| anyhow!("No account found for {email}"))
    }

    fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            email: row.get("email")?,
            password: row.get("password")?,
            full_name: row.get("full_name")?,
            account_type: row.get("account_type")?,
            company_name: row.get("company_name")?,
            company_size: row.get("company_size")?,
            industry: row.get("industry")?,
            skills: row.get("skills")?,
            experience: row.get("experience")?,
            phone: row.get("phone")?,
            location: row.get("location")?,
            headline: row.get("headline")?,
            bio: row.get("bio")?,
            employment_type: row.get("employment_type")?,
            job_title: row.get("job_title")?,
            company: row.get("company")?,
            education: row.get("education")?,
            school: row.get("school")?,
            degree: row.get("degree")?,
            work_location: row.get("work_location")?,
            salary_min: row.get("salary_min")?,
            salary_max: row.get("salary_max")?,
            salary_period: row.get("salary_period")?,
            open_to_work: row.get("open_to_work")?,
            linkedin: row.get("linkedin")?,
            github: row.get("github")?,
            portfolio: row.get("portfolio")?,
            website: row.get("website")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    // --- Job operations ---

    pub fn insert_job(&self, job: &Job) -> Result<()> {
        self.conn.execute(
            "INSERT INTO jobs (id, employer_email, employer_name, company_name,
                               job_title, job_description, job_type, experience_level,
                               salary_min, salary_max, salary_period,
                               work_location, location,
                               required_skills, preferred_skills, requirements,
                               deadline, positions, status, views, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                     ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
            params![
                job.id,
                job.employer_email,
                job.employer_name,
                job.company_name,
                job.job_title,
                job.job_description,
                job.job_type,
                job.experience_level,
                job.salary_min,
                job.salary_max,
                job.salary_period,
                job.work_location,
                job.location,
                serde_json::to_string(&job.required_skills)?,
                serde_json::to_string(&job.preferred_skills)?,
                job.requirements,
                job.deadline,
                job.positions,
                job.status,
                job.views,
                job.created_at,
            ],
        )?;
        debug!(id = %job.id, status = %job.status, "inserted job");
        Ok(())
    }

    pub fn get_job(&self, id: &str) -> Result<Option<Job>> {
        self.conn
            .query_row("SELECT * FROM jobs WHERE id = ?1", [id], Self::row_to_job)
            .optional()
            .context("Failed to load job")
    }

    pub fn list_jobs(
        &self,
        employer_email: Option<&str>,
        status: Option<JobStatus>,
    ) -> Result<Vec<Job>> {
        let mut sql = String::from("SELECT * FROM jobs WHERE 1=1");
        if employer_email.is_some() {
            sql.push_str(" AND employer_email = :employer");
        }
        if status.is_some() {
            sql.push_str(" AND status = :status");
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut bindings: Vec<(&str, &dyn rusqlite::ToSql)> = Vec::new();
        if let Some(employer) = employer_email.as_ref() {
            bindings.push((":employer", employer));
        }
        if let Some(status) = status.as_ref() {
            bindings.push((":status", status));
        }
        let rows = stmt.query_map(bindings.as_slice(), Self::row_to_job)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list jobs")
    }

    /// Validated status change; anything outside the transition table is an
    /// `InvalidTransition` error. Returns the refreshed record.
    pub fn set_job_status(&self, id: &str, to: JobStatus) -> Result<Job> {
        let job = self
            .get_job(id)?
            .ok_or_else(|| Error::JobNotFound(id.to_string()))?;
        if !status::job_transition_allowed(job.status, to) {
            return Err(Error::InvalidTransition {
                entity: "job",
                from: job.status.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        self.conn
            .execute("UPDATE jobs SET status = ?1 WHERE id = ?2", params![to, id])?;
        self.get_job(id)?
            .ok_or_else(|| Error::JobNotFound(id.to_string()).into())
    }

    pub fn record_job_view(&self, id: &str) -> Result<()> {
        self.conn
            .execute("UPDATE jobs SET views = views + 1 WHERE id = ?1", [id])?;
        Ok(())
    }

    pub fn delete_job(&self, id: &str) -> Result<()> {
        let removed = self.conn.execute("DELETE FROM jobs WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(Error::JobNotFound(id.to_string()).into());
        }
        // Applications pointing at the deleted job stay behind as orphans;
        // listings render them as "job not found" and offer withdrawal.
        Ok(())
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let required_raw: String = row.get("required_skills")?;
        let preferred_raw: String = row.get("preferred_skills")?;
        Ok(Job {
            id: row.get("id")?,
            employer_email: row.get("employer_email")?,
            employer_name: row.get("employer_name")?,
            company_name: row.get("company_name")?,
            job_title: row.get("job_title")?,
            job_description: row.get("job_description")?,
            job_type: row.get("job_type")?,
            experience_level: row.get("experience_level")?,
            salary_min: row.get("salary_min")?,
            salary_max: row.get("salary_max")?,
            salary_period: row.get("salary_period")?,
            work_location: row.get("work_location")?,
            location: row.get("location")?,
            required_skills: serde_json::from_str(&required_raw).unwrap_or_default(),
            preferred_skills: serde_json::from_str(&preferred_raw).unwrap_or_default(),
            requirements: row.get("requirements")?,
            deadline: row.get("deadline")?,
            positions: row.get("positions")?,
            status: row.get("status")?,
            views: row.get("views")?,
            created_at: row.get("created_at")?,
        })
    }

    // --- Application operations ---

    pub fn insert_application(&self, app: &Application) -> Result<()> {
        let result = self.conn.execute(
            "INSERT INTO applications (id, job_id, job_title, company_name,
                                       employer_email, worker_email, worker_name,
                                       status, applied_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                app.id,
                app.job_id,
                app.job_title,
                app.company_name,
                app.employer_email,
                app.worker_email,
                app.worker_name,
                app.status,
                app.applied_at,
            ],
        );
        match result {
            Ok(_) => {
                debug!(id = %app.id, job = %app.job_id, "inserted application");
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyApplied.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn has_applied(&self, job_id: &str, worker_email: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM applications WHERE job_id = ?1 AND worker_email = ?2",
            params![job_id, worker_email],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn get_application(&self, id: &str) -> Result<Option<Application>> {
        self.conn
            .query_row(
                "SELECT * FROM applications WHERE id = ?1",
                [id],
                Self::row_to_application,
            )
            .optional()
            .context("Failed to load application")
    }

    pub fn list_applications_for_worker(&self, worker_email: &str) -> Result<Vec<Application>> {
        self.list_applications("worker_email", worker_email)
    }

    pub fn list_applications_for_employer(&self, employer_email: &str) -> Result<Vec<Application>> {
        self.list_applications("employer_email", employer_email)
    }

    pub fn list_applications_for_job(&self, job_id: &str) -> Result<Vec<Application>> {
        self.list_applications("job_id", job_id)
    }

    fn list_applications(&self, column: &str, value: &str) -> Result<Vec<Application>> {
        let sql =
            format!("SELECT * FROM applications WHERE {column} = ?1 ORDER BY applied_at DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([value], Self::row_to_application)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list applications")
    }

    /// Validated status change over the review-flow transition table.
    pub fn set_application_status(&self, id: &str, to: ApplicationStatus) -> Result<Application> {
        let app = self
            .get_application(id)?
            .ok_or_else(|| Error::ApplicationNotFound(id.to_string()))?;
        if !status::application_transition_allowed(app.status, to) {
            return Err(Error::InvalidTransition {
                entity: "application",
                from: app.status.to_string(),
                to: to.to_string(),
            }
            .into());
        }
        self.conn.execute(
            "UPDATE applications SET status = ?1 WHERE id = ?2",
            params![to, id],
        )?;
        self.get_application(id)?
            .ok_or_else(|| Error::ApplicationNotFound(id.to_string()).into())
    }

    /// Withdrawal. Removes exactly the named record.
    pub fn delete_application(&self, id: &str) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(Error::ApplicationNotFound(id.to_string()).into());
        }
        Ok(())
    }

    fn row_to_application(row: &rusqlite::Row) -> rusqlite::Result<Application> {
        Ok(Application {
            id: row.get("id")?,
            job_id: row.get("job_id")?,
            job_title: row.get("job_title")?,
            company_name: row.get("company_name")?,
            employer_email: row.get("employer_email")?,
            worker_email: row.get("worker_email")?,
            worker_name: row.get("worker_name")?,
            status: row.get("status")?,
            applied_at: row.get("applied_at")?,
        })
    }

    // --- Portfolio operations ---

    /// Insert or keyed replace. On update the stored `created_at` and `views`
    /// are kept; everything else comes from the new value.
    pub fn upsert_portfolio_item(&self, item: &PortfolioItem) -> Result<()> {
        self.conn.execute(
            "INSERT INTO portfolio_items (id, owner_email, title, description,
                                          technologies, link, image_url, featured,
                                          item_type, views, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                technologies = excluded.technologies,
                link = excluded.link,
                image_url = excluded.image_url,
                featured = excluded.featured,
                item_type = excluded.item_type,
                updated_at = excluded.updated_at",
            params![
                item.id,
                item.owner_email,
                item.title,
                item.description,
                item.technologies,
                item.link,
                item.image_url,
                item.featured,
                item.item_type,
                item.views,
                item.created_at,
                item.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn get_portfolio_item(&self, id: &str) -> Result<Option<PortfolioItem>> {
        self.conn
            .query_row(
                "SELECT * FROM portfolio_items WHERE id = ?1",
                [id],
                Self::row_to_portfolio_item,
            )
            .optional()
            .context("Failed to load portfolio item")
    }

    pub fn list_portfolio(&self, owner_email: &str) -> Result<Vec<PortfolioItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM portfolio_items WHERE owner_email = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([owner_email], Self::row_to_portfolio_item)?;
        rows.collect::<Result<Vec<_>, _>>()
            .context("Failed to list portfolio")
    }

    pub fn delete_portfolio_item(&self, id: &str) -> Result<()> {
        let removed = self
            .conn
            .execute("DELETE FROM portfolio_items WHERE id = ?1", [id])?;
        if removed == 0 {
            return Err(Error::ProjectNotFound(id.to_string()).into());
        }
        Ok(())
    }

    fn row_to_portfolio_item(row: &rusqlite::Row) -> rusqlite::Result<PortfolioItem> {
        Ok(PortfolioItem {
            id: row.get("id")?,
            owner_email: row.get("owner_email")?,
            title: row.get("title")?,
            description: row.get("description")?,
            technologies: row.get("technologies")?,
            link: row.get("link")?,
            image_url: row.get("image_url")?,
            featured: row.get("featured")?,
            item_type: row.get("item_type")?,
            views: row.get("views")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }
}

/// Record id in the original scheme: prefix, millisecond timestamp, and a
/// 9-character base36 suffix.
pub fn new_record_id(prefix: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, split_skills};
    use tempfile::TempDir;

    fn test_db(dir: &TempDir) -> Database {
        let db = Database::open_at(&dir.path().join("verihire.db")).unwrap();
        db.init().unwrap();
        db
    }

    fn worker_reg(email: &str) -> Registration {
        Registration {
            full_name: "Wren Doe".into(),
            email: email.into(),
            password: "hunter2hunter2".into(),
            account_type: AccountType::Worker,
            skills: Some("Rust, SQL".into()),
            experience: Some("5 years".into()),
            company_name: None,
            company_size: None,
            industry: None,
        }
    }

    fn employer_reg(email: &str) -> Registration {
        Registration {
            full_name: "Eda Boss".into(),
            email: email.into(),
            password: "hunter2hunter2".into(),
            account_type: AccountType::Employer,
            skills: None,
            experience: None,
            company_name: Some("Acme".into()),
            company_size: Some("11-50".into()),
            industry: Some("Software".into()),
        }
    }

    fn sample_job(db: &Database, title: &str, skills: &str) -> Job {
        let job = Job {
            id: new_record_id("job"),
            employer_email: "boss@acme.test".into(),
            employer_name: "Eda Boss".into(),
            company_name: "Acme".into(),
            job_title: title.into(),
            job_description: "d".repeat(120),
            job_type: "full-time".into(),
            experience_level: "mid".into(),
            salary_min: 120_000.0,
            salary_max: 180_000.0,
            salary_period: "year".into(),
            work_location: "remote".into(),
            location: "Worldwide".into(),
            required_skills: split_skills(skills),
            preferred_skills: vec![],
            requirements: None,
            deadline: None,
            positions: 1,
            status: JobStatus::Active,
            views: 0,
            created_at: Utc::now().to_rfc3339(),
        };
        db.insert_job(&job).unwrap();
        job
    }

    fn apply(db: &Database, job: &Job, worker_email: &str) -> Application {
        let app = Application {
            id: new_record_id("app"),
            job_id: job.id.clone(),
            job_title: job.job_title.clone(),
            company_name: job.company_name.clone(),
            employer_email: job.employer_email.clone(),
            worker_email: worker_email.into(),
            worker_name: "Wren Doe".into(),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now().to_rfc3339(),
        };
        db.insert_application(&app).unwrap();
        app
    }

    #[test]
    fn duplicate_email_registration_leaves_users_unchanged() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&worker_reg("w@example.test")).unwrap();
        assert_eq!(db.count_users().unwrap(), 1);

        let mut again = employer_reg("w@example.test");
        again.full_name = "Impostor".into();
        let err = db.create_user(&again).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::EmailTaken));
        assert_eq!(db.count_users().unwrap(), 1);
        let stored = db.get_user("w@example.test").unwrap().unwrap();
        assert_eq!(stored.full_name, "Wren Doe");
    }

    #[test]
    fn profile_update_merges_fields() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&worker_reg("w@example.test")).unwrap();

        let update = ProfileUpdate {
            headline: Some("Systems engineer".into()),
            location: Some("Lisbon".into()),
            open_to_work: Some(true),
            ..Default::default()
        };
        let user = db.update_profile("w@example.test", &update).unwrap();
        assert_eq!(user.headline.as_deref(), Some("Systems engineer"));
        assert!(user.open_to_work);
        // untouched registration fields survive
        assert_eq!(user.skills.as_deref(), Some("Rust, SQL"));
        assert_eq!(user.full_name, "Wren Doe");

        // a second partial save keeps the first one's fields
        let user = db
            .update_profile(
                "w@example.test",
                &ProfileUpdate {
                    bio: Some("I build storage engines.".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(user.headline.as_deref(), Some("Systems engineer"));
        assert_eq!(user.bio.as_deref(), Some("I build storage engines."));
    }

    #[test]
    fn apply_creates_one_pending_record() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&employer_reg("boss@acme.test")).unwrap();
        db.create_user(&worker_reg("w@example.test")).unwrap();
        let job = sample_job(&db, "Backend Engineer", "Go, SQL");

        assert!(!db.has_applied(&job.id, "w@example.test").unwrap());
        apply(&db, &job, "w@example.test");
        assert!(db.has_applied(&job.id, "w@example.test").unwrap());

        let apps = db.list_applications_for_worker("w@example.test").unwrap();
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].status, ApplicationStatus::Pending);
        assert_eq!(apps[0].job_id, job.id);
    }

    #[test]
    fn duplicate_application_is_rejected() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&employer_reg("boss@acme.test")).unwrap();
        db.create_user(&worker_reg("w@example.test")).unwrap();
        let job = sample_job(&db, "Backend Engineer", "Go, SQL");
        apply(&db, &job, "w@example.test");

        let dup = Application {
            id: new_record_id("app"),
            job_id: job.id.clone(),
            job_title: job.job_title.clone(),
            company_name: job.company_name.clone(),
            employer_email: job.employer_email.clone(),
            worker_email: "w@example.test".into(),
            worker_name: "Wren Doe".into(),
            status: ApplicationStatus::Pending,
            applied_at: Utc::now().to_rfc3339(),
        };
        let err = db.insert_application(&dup).unwrap_err();
        assert_eq!(err.downcast_ref::<Error>(), Some(&Error::AlreadyApplied));
        assert_eq!(
            db.list_applications_for_worker("w@example.test")
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn withdraw_removes_exactly_one_record() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&employer_reg("boss@acme.test")).unwrap();
        db.create_user(&worker_reg("w@example.test")).unwrap();
        db.create_user(&worker_reg("x@example.test")).unwrap();
        let first = sample_job(&db, "Backend Engineer", "Go, SQL");
        let second = sample_job(&db, "Designer", "Figma");

        apply(&db, &first, "x@example.test");
        apply(&db, &second, "x@example.test");
        let before: Vec<String> = db
            .list_applications_for_employer("boss@acme.test")
            .unwrap()
            .iter()
            .map(|a| a.id.clone())
            .collect();

        // apply then withdraw round-trips the collection
        let mine = apply(&db, &first, "w@example.test");
        db.delete_application(&mine.id).unwrap();

        let after: Vec<String> = db
            .list_applications_for_employer("boss@acme.test")
            .unwrap()
            .iter()
            .map(|a| a.id.clone())
            .collect();
        assert_eq!(before, after);

        let err = db.delete_application(&mine.id).unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::ApplicationNotFound(mine.id.clone()))
        );
    }

    #[test]
    fn close_then_reopen_touches_only_status() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&employer_reg("boss@acme.test")).unwrap();
        let job = sample_job(&db, "Backend Engineer", "Go, SQL");

        let closed = db.set_job_status(&job.id, JobStatus::Closed).unwrap();
        assert_eq!(closed.status, JobStatus::Closed);
        let reopened = db.set_job_status(&job.id, JobStatus::Active).unwrap();

        let mut expected = job.clone();
        expected.status = JobStatus::Active;
        assert_eq!(
            serde_json::to_value(&reopened).unwrap(),
            serde_json::to_value(&expected).unwrap()
        );
    }

    #[test]
    fn illegal_job_transition_is_rejected() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&employer_reg("boss@acme.test")).unwrap();
        let job = sample_job(&db, "Backend Engineer", "Go, SQL");

        let err = db.set_job_status(&job.id, JobStatus::Draft).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidTransition { entity: "job", .. })
        ));
        assert_eq!(db.get_job(&job.id).unwrap().unwrap().status, JobStatus::Active);
    }

    #[test]
    fn application_review_flow_is_enforced() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&employer_reg("boss@acme.test")).unwrap();
        db.create_user(&worker_reg("w@example.test")).unwrap();
        let job = sample_job(&db, "Backend Engineer", "Go, SQL");
        let app = apply(&db, &job, "w@example.test");

        // pending -> accepted skips the flow
        let err = db
            .set_application_status(&app.id, ApplicationStatus::Accepted)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidTransition { entity: "application", .. })
        ));

        let app = db
            .set_application_status(&app.id, ApplicationStatus::Reviewing)
            .unwrap();
        let app = db
            .set_application_status(&app.id, ApplicationStatus::Rejected)
            .unwrap();
        // restore
        let app = db
            .set_application_status(&app.id, ApplicationStatus::Pending)
            .unwrap();
        assert_eq!(app.status, ApplicationStatus::Pending);
    }

    #[test]
    fn deleting_a_job_leaves_applications_orphaned() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&employer_reg("boss@acme.test")).unwrap();
        db.create_user(&worker_reg("w@example.test")).unwrap();
        let job = sample_job(&db, "Backend Engineer", "Go, SQL");
        let app = apply(&db, &job, "w@example.test");

        db.delete_job(&job.id).unwrap();
        assert!(db.get_job(&job.id).unwrap().is_none());
        // the orphan is still listed and can be withdrawn
        let apps = db.list_applications_for_worker("w@example.test").unwrap();
        assert_eq!(apps.len(), 1);
        db.delete_application(&app.id).unwrap();
    }

    #[test]
    fn portfolio_upsert_preserves_created_at_and_views() {
        let dir = TempDir::new().unwrap();
        let db = test_db(&dir);
        db.create_user(&worker_reg("w@example.test")).unwrap();

        let item = PortfolioItem {
            id: new_record_id("project"),
            owner_email: "w@example.test".into(),
            title: "Storage engine".into(),
            description: "An LSM-tree storage engine in Rust.".into(),
            technologies: Some("Rust".into()),
            link: None,
            image_url: None,
            featured: false,
            item_type: "web".into(),
            views: 7,
            created_at: "2026-01-01T00:00:00+00:00".into(),
            updated_at: "2026-01-01T00:00:00+00:00".into(),
        };
        db.upsert_portfolio_item(&item).unwrap();

        let mut edited = item.clone();
        edited.title = "Storage engine (v2)".into();
        edited.featured = true;
        edited.views = 0; // ignored on update
        edited.created_at = "2026-02-02T00:00:00+00:00".into(); // ignored on update
        edited.updated_at = "2026-02-02T00:00:00+00:00".into();
        db.upsert_portfolio_item(&edited).unwrap();

        let stored = db.get_portfolio_item(&item.id).unwrap().unwrap();
        assert_eq!(stored.title, "Storage engine (v2)");
        assert!(stored.featured);
        assert_eq!(stored.views, 7);
        assert_eq!(stored.created_at, "2026-01-01T00:00:00+00:00");
        assert_eq!(stored.updated_at, "2026-02-02T00:00:00+00:00");

        db.delete_portfolio_item(&item.id).unwrap();
        assert!(db.list_portfolio("w@example.test").unwrap().is_empty());
    }

    #[test]
    fn record_ids_carry_prefix_and_are_unique() {
        let a = new_record_id("job");
        let b = new_record_id("job");
        assert!(a.starts_with("job_"));
        assert_ne!(a, b);
    }
}
