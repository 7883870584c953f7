// src/marketplace/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Freelancer,
    Client,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Freelancer => "freelancer",
            UserRole::Client => "client",
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "freelancer" => Ok(UserRole::Freelancer),
            "client" => Ok(UserRole::Client),
            other => anyhow::bail!("Unknown user role: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Open => "open",
            JobStatus::Closed => "closed",
        }
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" => Ok(JobStatus::Open),
            "closed" => Ok(JobStatus::Closed),
            other => anyhow::bail!("Unknown job status: {}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl FromStr for ApplicationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "applied" => Ok(ApplicationStatus::Applied),
            "interview" => Ok(ApplicationStatus::Interview),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            other => anyhow::bail!("Unknown application status: {}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub company: Option<String>,
    pub skills: Vec<String>,
    pub telegram_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub telegram_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub client_id: String,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub budget: f64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub budget: f64,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum JobValidationError {
    #[error("Job title is required")]
    MissingTitle,
    #[error("Job description is required")]
    MissingDescription,
    #[error("Please select at least one required skill")]
    MissingSkills,
    #[error("Please enter a valid budget amount")]
    InvalidBudget,
}

fn check_job_fields(
    title: &str,
    description: &str,
    skills: &[String],
    budget: f64,
) -> Result<(), JobValidationError> {
    if title.trim().is_empty() {
        return Err(JobValidationError::MissingTitle);
    }
    if description.trim().is_empty() {
        return Err(JobValidationError::MissingDescription);
    }
    if !skills.iter().any(|s| !s.trim().is_empty()) {
        return Err(JobValidationError::MissingSkills);
    }
    if !budget.is_finite() || budget <= 0.0 {
        return Err(JobValidationError::InvalidBudget);
    }
    Ok(())
}

impl Job {
    /// Same rules as a posted job, for rows that arrive from elsewhere.
    pub fn validate(&self) -> Result<(), JobValidationError> {
        check_job_fields(&self.title, &self.description, &self.skills, self.budget)
    }
}

impl NewJob {
    pub fn validate(&self) -> Result<(), JobValidationError> {
        check_job_fields(&self.title, &self.description, &self.skills, self.budget)
    }

    pub fn into_job(self, client_id: &str) -> Job {
        Job {
            id: new_id("job"),
            client_id: client_id.to_string(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            skills: clean_skills(&self.skills),
            budget: self.budget,
            status: JobStatus::Open,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: String,
    pub job_id: String,
    pub freelancer_id: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Application joined with the job it targets and the freelancer who sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDetails {
    #[serde(flatten)]
    pub application: Application,
    pub job_title: String,
    pub job_budget: f64,
    pub freelancer_name: String,
    pub freelancer_skills: Vec<String>,
}

pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Trimmed, non-empty skills with case-insensitive duplicates removed.
pub fn clean_skills(skills: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for skill in skills.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        if !cleaned.iter().any(|c| c.eq_ignore_ascii_case(skill)) {
            cleaned.push(skill.to_string());
        }
    }
    cleaned
}
