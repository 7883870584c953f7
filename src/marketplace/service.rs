// src/marketplace/service.rs
use super::filter::JobFilter;
use super::matching::{rank_freelancers, FreelancerMatch, MAX_MATCHES};
use super::models::{
    clean_skills, new_id, Application, ApplicationDetails, ApplicationStatus, Job,
    JobStatus, JobValidationError, NewJob, NewUser, User, UserRole,
};
use super::repository::{ApplicationRepository, JobRepository, UserRepository};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum MarketplaceError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Forbidden(String),
    #[error("{message}")]
    Conflict { code: &'static str, message: String },
    #[error(transparent)]
    Validation(#[from] JobValidationError),
    #[error("{0}")]
    InvalidInput(String),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl MarketplaceError {
    pub fn code(&self) -> String {
        match self {
            MarketplaceError::NotFound(entity) => format!("{}_NOT_FOUND", entity.to_uppercase()),
            MarketplaceError::Forbidden(_) => "FORBIDDEN".to_string(),
            MarketplaceError::Conflict { code, .. } => code.to_string(),
            MarketplaceError::Validation(_) | MarketplaceError::InvalidInput(_) => {
                "VALIDATION_ERROR".to_string()
            }
            MarketplaceError::Storage(_) => "DATABASE_ERROR".to_string(),
        }
    }
}

pub type MarketResult<T> = Result<T, MarketplaceError>;

#[derive(Debug, Serialize)]
pub struct ApplicationOverview {
    pub applications: Vec<ApplicationDetails>,
    pub counts: BTreeMap<String, usize>,
}

/// Job board operations on behalf of an explicit user.
pub struct MarketplaceService<'a> {
    users: UserRepository<'a>,
    jobs: JobRepository<'a>,
    applications: ApplicationRepository<'a>,
}

impl<'a> MarketplaceService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
            jobs: JobRepository::new(pool),
            applications: ApplicationRepository::new(pool),
        }
    }

    pub async fn signup(&self, new_user: NewUser) -> MarketResult<User> {
        let email = new_user.email.trim().to_lowercase();
        let name = new_user.name.trim().to_string();

        if email.is_empty() || !email.contains('@') {
            return Err(MarketplaceError::InvalidInput(
                "A valid email address is required".to_string(),
            ));
        }
        if name.is_empty() {
            return Err(MarketplaceError::InvalidInput("Name is required".to_string()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            warn!("Signup rejected, email already registered: {}", email);
            return Err(user_exists());
        }

        let user = User {
            id: new_id("user"),
            name,
            email,
            role: new_user.role,
            company: optional_text(new_user.company),
            skills: Vec::new(),
            telegram_id: optional_text(new_user.telegram_id),
            created_at: Utc::now(),
        };
        match self.users.create(&user).await {
            Ok(()) => Ok(user),
            Err(e) if is_unique_violation(&e) => {
                warn!("Signup lost a race, email already registered: {}", user.email);
                Err(user_exists())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn login(&self, email: &str) -> MarketResult<User> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(MarketplaceError::NotFound("User"))?;

        info!("User {} logged in as {}", user.email, user.role.as_str());
        Ok(user)
    }

    pub async fn user(&self, id: &str) -> MarketResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::NotFound("User"))
    }

    pub async fn update_skills(&self, user: &User, skills: &[String]) -> MarketResult<User> {
        let skills = clean_skills(skills);
        if !self.users.update_skills(&user.id, &skills).await? {
            return Err(MarketplaceError::NotFound("User"));
        }
        info!("User {} now lists {} skills", user.email, skills.len());
        self.user(&user.id).await
    }

    pub async fn post_job(&self, client: &User, new_job: NewJob) -> MarketResult<Job> {
        require_role(client, UserRole::Client, "Only clients can post jobs")?;
        new_job.validate()?;

        let job = new_job.into_job(&client.id);
        self.jobs.insert(&job).await?;
        Ok(job)
    }

    pub async fn search_jobs(&self, filter: &JobFilter) -> MarketResult<Vec<Job>> {
        let open = self.jobs.list_by_status(JobStatus::Open).await?;
        Ok(filter.apply(open))
    }

    pub async fn job(&self, id: &str) -> MarketResult<Job> {
        self.jobs
            .find_by_id(id)
            .await?
            .ok_or(MarketplaceError::NotFound("Job"))
    }

    pub async fn client_jobs(&self, client: &User) -> MarketResult<Vec<Job>> {
        require_role(client, UserRole::Client, "Only clients have posted jobs")?;
        Ok(self.jobs.list_by_client(&client.id).await?)
    }

    pub async fn set_job_status(
        &self,
        owner: &User,
        job_id: &str,
        status: JobStatus,
    ) -> MarketResult<Job> {
        let mut job = self.owned_job(owner, job_id).await?;
        self.jobs.update_status(&job.id, status).await?;
        job.status = status;
        Ok(job)
    }

    /// Insert or overwrite by id. Returns true when an existing job was replaced.
    pub async fn import_job(&self, job: &Job) -> MarketResult<bool> {
        Ok(self.jobs.upsert(job).await?)
    }

    pub async fn apply(&self, freelancer: &User, job_id: &str) -> MarketResult<Application> {
        require_role(
            freelancer,
            UserRole::Freelancer,
            "Only freelancers can apply to jobs",
        )?;

        let job = self.job(job_id).await?;
        if job.status != JobStatus::Open {
            return Err(MarketplaceError::Conflict {
                code: "JOB_CLOSED",
                message: "This job is no longer accepting applications".to_string(),
            });
        }

        if self.applications.find_for(&job.id, &freelancer.id).await?.is_some() {
            return Err(already_applied());
        }

        let now = Utc::now();
        let application = Application {
            id: new_id("app"),
            job_id: job.id,
            freelancer_id: freelancer.id.clone(),
            status: ApplicationStatus::Applied,
            created_at: now,
            updated_at: now,
        };
        match self.applications.insert(&application).await {
            Ok(()) => Ok(application),
            Err(e) if is_unique_violation(&e) => Err(already_applied()),
            Err(e) => Err(e.into()),
        }
    }

    /// The freelancer's applications, optionally narrowed to one status.
    /// Counts always cover every application.
    pub async fn freelancer_applications(
        &self,
        freelancer: &User,
        status: Option<ApplicationStatus>,
    ) -> MarketResult<ApplicationOverview> {
        require_role(
            freelancer,
            UserRole::Freelancer,
            "Only freelancers have applications",
        )?;

        let all = self.applications.list_for_freelancer(&freelancer.id).await?;

        let mut counts: BTreeMap<String, usize> = ApplicationStatus::ALL
            .iter()
            .map(|s| (s.as_str().to_string(), 0))
            .collect();
        for details in &all {
            *counts
                .entry(details.application.status.as_str().to_string())
                .or_default() += 1;
        }

        let applications = all
            .into_iter()
            .filter(|d| status.map_or(true, |s| d.application.status == s))
            .collect();

        Ok(ApplicationOverview {
            applications,
            counts,
        })
    }

    pub async fn job_applications(
        &self,
        owner: &User,
        job_id: &str,
    ) -> MarketResult<Vec<ApplicationDetails>> {
        let job = self.owned_job(owner, job_id).await?;
        Ok(self.applications.list_for_job(&job.id).await?)
    }

    pub async fn set_application_status(
        &self,
        owner: &User,
        application_id: &str,
        status: ApplicationStatus,
    ) -> MarketResult<Application> {
        let mut application = self
            .applications
            .find_by_id(application_id)
            .await?
            .ok_or(MarketplaceError::NotFound("Application"))?;

        self.owned_job(owner, &application.job_id).await?;
        self.applications
            .update_status(&application.id, status)
            .await?;

        application.status = status;
        application.updated_at = Utc::now();
        Ok(application)
    }

    pub async fn matches(&self, owner: &User, job_id: &str) -> MarketResult<Vec<FreelancerMatch>> {
        let job = self.owned_job(owner, job_id).await?;
        let freelancers = self.users.list_by_role(UserRole::Freelancer).await?;
        Ok(rank_freelancers(&job, &freelancers, MAX_MATCHES))
    }

    async fn owned_job(&self, owner: &User, job_id: &str) -> MarketResult<Job> {
        let job = self.job(job_id).await?;
        if job.client_id != owner.id {
            warn!("User {} tried to manage job {} they do not own", owner.email, job.id);
            return Err(MarketplaceError::Forbidden(
                "Only the client who posted this job can manage it".to_string(),
            ));
        }
        Ok(job)
    }
}

fn user_exists() -> MarketplaceError {
    MarketplaceError::Conflict {
        code: "USER_EXISTS",
        message: "User already exists with this email".to_string(),
    }
}

fn already_applied() -> MarketplaceError {
    MarketplaceError::Conflict {
        code: "ALREADY_APPLIED",
        message: "You have already applied to this job".to_string(),
    }
}

/// True when a write failed on a UNIQUE or PRIMARY KEY constraint.
fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn require_role(user: &User, role: UserRole, message: &str) -> MarketResult<()> {
    if user.role == role {
        Ok(())
    } else {
        Err(MarketplaceError::Forbidden(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseConfig;

    async fn store() -> DatabaseConfig {
        DatabaseConfig::in_memory().await.unwrap()
    }

    fn new_user(name: &str, role: UserRole) -> NewUser {
        NewUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            role,
            company: None,
            telegram_id: None,
        }
    }

    fn new_job(skills: &[&str]) -> NewJob {
        NewJob {
            title: "Data pipeline".to_string(),
            description: "Nightly ETL jobs".to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            budget: 2000.0,
        }
    }

    #[tokio::test]
    async fn test_signup_rejects_duplicate_email() {
        let db = store().await;
        let service = MarketplaceService::new(db.pool().unwrap());

        service.signup(new_user("Ada", UserRole::Freelancer)).await.unwrap();
        let err = service
            .signup(new_user("Ada", UserRole::Client))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "USER_EXISTS");

        let missing = service.login("nobody@example.com").await.unwrap_err();
        assert_eq!(missing.code(), "USER_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_concurrent_signups_conflict_instead_of_failing() {
        let db = store().await;
        let service = MarketplaceService::new(db.pool().unwrap());

        let (first, second) = tokio::join!(
            service.signup(new_user("Ada", UserRole::Freelancer)),
            service.signup(new_user("Ada", UserRole::Client)),
        );
        let codes: Vec<String> = [first, second]
            .into_iter()
            .filter_map(|r| r.err().map(|e| e.code()))
            .collect();
        assert_eq!(codes, vec!["USER_EXISTS"]);
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_a_unique_violation() {
        let db = store().await;
        let pool = db.pool().unwrap();
        let service = MarketplaceService::new(pool);
        let ada = service.signup(new_user("Ada", UserRole::Freelancer)).await.unwrap();

        let err = UserRepository::new(pool).create(&ada).await.unwrap_err();
        assert!(is_unique_violation(&err));
        assert!(!is_unique_violation(&anyhow::anyhow!("disk full")));
    }

    #[tokio::test]
    async fn test_concurrent_applications_conflict_instead_of_failing() {
        let db = store().await;
        let service = MarketplaceService::new(db.pool().unwrap());

        let client = service.signup(new_user("Acme", UserRole::Client)).await.unwrap();
        let ada = service.signup(new_user("Ada", UserRole::Freelancer)).await.unwrap();
        let job = service.post_job(&client, new_job(&["Go"])).await.unwrap();

        let (first, second) = tokio::join!(service.apply(&ada, &job.id), service.apply(&ada, &job.id));
        let codes: Vec<String> = [first, second]
            .into_iter()
            .filter_map(|r| r.err().map(|e| e.code()))
            .collect();
        assert_eq!(codes, vec!["ALREADY_APPLIED"]);
    }

    #[tokio::test]
    async fn test_signup_keeps_telegram_id() {
        let db = store().await;
        let service = MarketplaceService::new(db.pool().unwrap());

        let mut ada = new_user("Ada", UserRole::Freelancer);
        ada.telegram_id = Some(" @ada_dev ".to_string());
        let user = service.signup(ada).await.unwrap();
        assert_eq!(user.telegram_id.as_deref(), Some("@ada_dev"));

        let stored = service.login("ada@example.com").await.unwrap();
        assert_eq!(stored.telegram_id.as_deref(), Some("@ada_dev"));
    }

    #[tokio::test]
    async fn test_only_clients_post_jobs() {
        let db = store().await;
        let service = MarketplaceService::new(db.pool().unwrap());

        let freelancer = service.signup(new_user("Ada", UserRole::Freelancer)).await.unwrap();
        let err = service.post_job(&freelancer, new_job(&["SQL"])).await.unwrap_err();
        assert!(matches!(err, MarketplaceError::Forbidden(_)));

        let client = service.signup(new_user("Acme", UserRole::Client)).await.unwrap();
        let err = service.post_job(&client, new_job(&[])).await.unwrap_err();
        assert!(matches!(
            err,
            MarketplaceError::Validation(JobValidationError::MissingSkills)
        ));
    }

    #[tokio::test]
    async fn test_application_lifecycle() {
        let db = store().await;
        let service = MarketplaceService::new(db.pool().unwrap());

        let client = service.signup(new_user("Acme", UserRole::Client)).await.unwrap();
        let other = service.signup(new_user("Globex", UserRole::Client)).await.unwrap();
        let freelancer = service.signup(new_user("Ada", UserRole::Freelancer)).await.unwrap();

        let job = service.post_job(&client, new_job(&["Python"])).await.unwrap();
        let application = service.apply(&freelancer, &job.id).await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Applied);

        let again = service.apply(&freelancer, &job.id).await.unwrap_err();
        assert_eq!(again.code(), "ALREADY_APPLIED");

        let forbidden = service
            .set_application_status(&other, &application.id, ApplicationStatus::Accepted)
            .await
            .unwrap_err();
        assert_eq!(forbidden.code(), "FORBIDDEN");

        service
            .set_application_status(&client, &application.id, ApplicationStatus::Interview)
            .await
            .unwrap();

        let overview = service
            .freelancer_applications(&freelancer, Some(ApplicationStatus::Applied))
            .await
            .unwrap();
        assert!(overview.applications.is_empty());
        assert_eq!(overview.counts["interview"], 1);
        assert_eq!(overview.counts["applied"], 0);

        let for_job = service.job_applications(&client, &job.id).await.unwrap();
        assert_eq!(for_job.len(), 1);
        assert_eq!(for_job[0].freelancer_name, "Ada");
    }

    #[tokio::test]
    async fn test_closed_jobs_refuse_applications() {
        let db = store().await;
        let service = MarketplaceService::new(db.pool().unwrap());

        let client = service.signup(new_user("Acme", UserRole::Client)).await.unwrap();
        let freelancer = service.signup(new_user("Ada", UserRole::Freelancer)).await.unwrap();
        let job = service.post_job(&client, new_job(&["Go"])).await.unwrap();

        service
            .set_job_status(&client, &job.id, JobStatus::Closed)
            .await
            .unwrap();
        let err = service.apply(&freelancer, &job.id).await.unwrap_err();
        assert_eq!(err.code(), "JOB_CLOSED");
        assert!(service
            .search_jobs(&JobFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_matches_use_stored_skills() {
        let db = store().await;
        let service = MarketplaceService::new(db.pool().unwrap());

        let client = service.signup(new_user("Acme", UserRole::Client)).await.unwrap();
        let ada = service.signup(new_user("Ada", UserRole::Freelancer)).await.unwrap();
        let bob = service.signup(new_user("Bob", UserRole::Freelancer)).await.unwrap();
        service
            .update_skills(&ada, &["python".to_string(), "SQL".to_string()])
            .await
            .unwrap();
        service.update_skills(&bob, &["Figma".to_string()]).await.unwrap();

        let job = service.post_job(&client, new_job(&["Python", "SQL"])).await.unwrap();
        let matches = service.matches(&client, &job.id).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "Ada");
        assert_eq!(matches[0].match_score, 1.0);
    }
}
