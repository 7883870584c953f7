// src/marketplace/repository.rs
use super::models::{
    Application, ApplicationDetails, ApplicationStatus, Job, JobStatus, User, UserRole,
};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::info;

fn encode_skills(skills: &[String]) -> Result<String> {
    serde_json::to_string(skills).context("Failed to encode skills")
}

fn decode_skills(raw: &str) -> Result<Vec<String>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw).with_context(|| format!("Invalid skills column: {}", raw))
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    company: Option<String>,
    skills: String,
    telegram_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            role: row.role.parse()?,
            skills: decode_skills(&row.skills)?,
            id: row.id,
            name: row.name,
            email: row.email,
            company: row.company,
            telegram_id: row.telegram_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    client_id: String,
    title: String,
    description: String,
    skills: String,
    budget: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = anyhow::Error;

    fn try_from(row: JobRow) -> Result<Self> {
        Ok(Job {
            skills: decode_skills(&row.skills)?,
            status: row.status.parse()?,
            id: row.id,
            client_id: row.client_id,
            title: row.title,
            description: row.description,
            budget: row.budget,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicationRow {
    id: String,
    job_id: String,
    freelancer_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = anyhow::Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        Ok(Application {
            status: row.status.parse()?,
            id: row.id,
            job_id: row.job_id,
            freelancer_id: row.freelancer_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ApplicationDetailsRow {
    id: String,
    job_id: String,
    freelancer_id: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    job_title: String,
    job_budget: f64,
    freelancer_name: String,
    freelancer_skills: String,
}

impl TryFrom<ApplicationDetailsRow> for ApplicationDetails {
    type Error = anyhow::Error;

    fn try_from(row: ApplicationDetailsRow) -> Result<Self> {
        Ok(ApplicationDetails {
            freelancer_skills: decode_skills(&row.freelancer_skills)?,
            application: Application {
                status: row.status.parse()?,
                id: row.id,
                job_id: row.job_id,
                freelancer_id: row.freelancer_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            job_title: row.job_title,
            job_budget: row.job_budget,
            freelancer_name: row.freelancer_name,
        })
    }
}

fn collect<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = anyhow::Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, company, skills, telegram_id, created_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Email lookups ignore case.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, company, skills, telegram_id, created_at
            FROM users
            WHERE lower(email) = lower(?)
            "#,
        )
        .bind(email.trim())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, company, skills, telegram_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.company)
        .bind(encode_skills(&user.skills)?)
        .bind(&user.telegram_id)
        .bind(user.created_at)
        .execute(self.pool)
        .await?;

        info!("Created {} account: {}", user.role.as_str(), user.email);
        Ok(())
    }

    pub async fn update_skills(&self, id: &str, skills: &[String]) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET skills = ? WHERE id = ?")
            .bind(encode_skills(skills)?)
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list_by_role(&self, role: UserRole) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, role, company, skills, telegram_id, created_at
            FROM users
            WHERE role = ?
            ORDER BY name ASC
            "#,
        )
        .bind(role.as_str())
        .fetch_all(self.pool)
        .await?;

        collect(rows)
    }
}

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs (id, client_id, title, description, skills, budget, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.client_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(encode_skills(&job.skills)?)
        .bind(job.budget)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .execute(self.pool)
        .await?;

        info!("Stored job {} for client {}", job.id, job.client_id);
        Ok(())
    }

    /// Insert, or overwrite the job with the same id. Returns true when a job was replaced.
    pub async fn upsert(&self, job: &Job) -> Result<bool> {
        let existed = self.find_by_id(&job.id).await?.is_some();

        sqlx::query(
            r#"
            INSERT INTO jobs (id, client_id, title, description, skills, budget, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                client_id = excluded.client_id,
                title = excluded.title,
                description = excluded.description,
                skills = excluded.skills,
                budget = excluded.budget,
                status = excluded.status,
                created_at = excluded.created_at
            "#,
        )
        .bind(&job.id)
        .bind(&job.client_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(encode_skills(&job.skills)?)
        .bind(job.budget)
        .bind(job.status.as_str())
        .bind(job.created_at)
        .execute(self.pool)
        .await?;

        Ok(existed)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, client_id, title, description, skills, budget, status, created_at
            FROM jobs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Job::try_from).transpose()
    }

    pub async fn list_by_status(&self, status: JobStatus) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, client_id, title, description, skills, budget, status, created_at
            FROM jobs
            WHERE status = ?
            "#,
        )
        .bind(status.as_str())
        .fetch_all(self.pool)
        .await?;

        collect(rows)
    }

    pub async fn list_by_client(&self, client_id: &str) -> Result<Vec<Job>> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, client_id, title, description, skills, budget, status, created_at
            FROM jobs
            WHERE client_id = ?
            "#,
        )
        .bind(client_id)
        .fetch_all(self.pool)
        .await?;

        let mut jobs: Vec<Job> = collect(rows)?;
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(jobs)
    }

    pub async fn update_status(&self, id: &str, status: JobStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE jobs SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(self.pool)
            .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            info!("Job {} is now {}", id, status.as_str());
        }
        Ok(updated)
    }
}

const APPLICATION_DETAILS_QUERY: &str = r#"
    SELECT a.id, a.job_id, a.freelancer_id, a.status, a.created_at, a.updated_at,
           j.title AS job_title, j.budget AS job_budget,
           u.name AS freelancer_name, u.skills AS freelancer_skills
    FROM applications a
    JOIN jobs j ON j.id = a.job_id
    JOIN users u ON u.id = a.freelancer_id
"#;

pub struct ApplicationRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ApplicationRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, application: &Application) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO applications (id, job_id, freelancer_id, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&application.id)
        .bind(&application.job_id)
        .bind(&application.freelancer_id)
        .bind(application.status.as_str())
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(self.pool)
        .await?;

        info!(
            "Freelancer {} applied to job {}",
            application.freelancer_id, application.job_id
        );
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, job_id, freelancer_id, status, created_at, updated_at
            FROM applications
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Application::try_from).transpose()
    }

    pub async fn find_for(&self, job_id: &str, freelancer_id: &str) -> Result<Option<Application>> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT id, job_id, freelancer_id, status, created_at, updated_at
            FROM applications
            WHERE job_id = ? AND freelancer_id = ?
            "#,
        )
        .bind(job_id)
        .bind(freelancer_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Application::try_from).transpose()
    }

    pub async fn list_for_freelancer(&self, freelancer_id: &str) -> Result<Vec<ApplicationDetails>> {
        let query = format!("{} WHERE a.freelancer_id = ?", APPLICATION_DETAILS_QUERY);
        let rows = sqlx::query_as::<_, ApplicationDetailsRow>(&query)
            .bind(freelancer_id)
            .fetch_all(self.pool)
            .await?;

        let mut details: Vec<ApplicationDetails> = collect(rows)?;
        details.sort_by(|a, b| b.application.created_at.cmp(&a.application.created_at));
        Ok(details)
    }

    pub async fn list_for_job(&self, job_id: &str) -> Result<Vec<ApplicationDetails>> {
        let query = format!("{} WHERE a.job_id = ?", APPLICATION_DETAILS_QUERY);
        let rows = sqlx::query_as::<_, ApplicationDetailsRow>(&query)
            .bind(job_id)
            .fetch_all(self.pool)
            .await?;

        let mut details: Vec<ApplicationDetails> = collect(rows)?;
        details.sort_by(|a, b| a.application.created_at.cmp(&b.application.created_at));
        Ok(details)
    }

    pub async fn update_status(&self, id: &str, status: ApplicationStatus) -> Result<bool> {
        let result = sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        let updated = result.rows_affected() > 0;
        if updated {
            info!("Application {} moved to {}", id, status.as_str());
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConfig;
    use crate::marketplace::models::new_id;

    fn user(name: &str, role: UserRole) -> User {
        User {
            id: new_id("user"),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            company: None,
            skills: vec!["Rust".to_string()],
            telegram_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_user_round_trip_through_store() {
        let db = DatabaseConfig::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().unwrap());

        let ada = user("Ada", UserRole::Freelancer);
        repo.create(&ada).await.unwrap();

        let found = repo.find_by_email("ADA@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, ada.id);
        assert_eq!(found.skills, vec!["Rust"]);

        let skills = vec!["Rust".to_string(), "Go".to_string()];
        assert!(repo.update_skills(&ada.id, &skills).await.unwrap());
        let updated = repo.find_by_id(&ada.id).await.unwrap().unwrap();
        assert_eq!(updated.skills, skills);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_by_store() {
        let db = DatabaseConfig::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool().unwrap());

        repo.create(&user("Ada", UserRole::Freelancer)).await.unwrap();
        assert!(repo.create(&user("Ada", UserRole::Client)).await.is_err());
    }

    #[tokio::test]
    async fn test_job_upsert_reports_replacement() {
        let db = DatabaseConfig::in_memory().await.unwrap();
        let repo = JobRepository::new(db.pool().unwrap());

        let mut job = Job {
            id: "job_sheet_1".to_string(),
            client_id: "client_1".to_string(),
            title: "Logo".to_string(),
            description: "New logo".to_string(),
            skills: vec!["Figma".to_string()],
            budget: 250.0,
            status: JobStatus::Open,
            created_at: Utc::now(),
        };
        assert!(!repo.upsert(&job).await.unwrap());

        job.budget = 400.0;
        assert!(repo.upsert(&job).await.unwrap());
        let stored = repo.find_by_id("job_sheet_1").await.unwrap().unwrap();
        assert_eq!(stored.budget, 400.0);
        assert_eq!(repo.list_by_status(JobStatus::Open).await.unwrap().len(), 1);
    }
}
