// src/marketplace/mod.rs
//! Accounts, job board, applications and freelancer matching on top of SQLite.

pub mod filter;
pub mod import;
pub mod matching;
pub mod models;
pub mod repository;
pub mod service;

pub use filter::{JobFilter, JobSort};
pub use import::{import_jobs, ImportSummary};
pub use matching::{rank_freelancers, FreelancerMatch};
pub use models::{
    Application, ApplicationDetails, ApplicationStatus, Job, JobStatus, JobValidationError,
    NewJob, NewUser, User, UserRole,
};
pub use repository::{ApplicationRepository, JobRepository, UserRepository};
pub use service::{ApplicationOverview, MarketResult, MarketplaceError, MarketplaceService};
