pub mod analysis_handlers;
pub mod application_handlers;
pub mod auth_handlers;
pub mod job_handlers;
pub mod system_handlers;

pub use analysis_handlers::*;
pub use application_handlers::*;
pub use auth_handlers::*;
pub use job_handlers::*;
pub use system_handlers::*;

use crate::analysis::AnalysisError;
use crate::database::DatabaseConfig;
use crate::marketplace::MarketplaceError;
use crate::web::types::{ApiError, StandardErrorResponse};
use rocket::http::Status;
use sqlx::SqlitePool;
use tracing::error;

pub(crate) fn database_pool(
    db_config: &DatabaseConfig,
    conversation_id: Option<String>,
) -> Result<&SqlitePool, ApiError> {
    db_config.pool().map_err(|e| {
        error!("Database connection failed: {}", e);
        StandardErrorResponse::new(
            "Database connection failed".to_string(),
            "DATABASE_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
            conversation_id,
        )
        .with_status(Status::InternalServerError)
    })
}

pub(crate) fn analysis_error(e: AnalysisError, conversation_id: Option<String>) -> ApiError {
    StandardErrorResponse::new(
        e.to_string(),
        "INVALID_INPUT".to_string(),
        vec![
            "Provide a bio or free text description".to_string(),
            "Or provide both a skill list and an experience description".to_string(),
        ],
        conversation_id,
    )
    .with_status(Status::BadRequest)
}

pub(crate) fn validation_error(
    message: String,
    suggestion: &str,
    conversation_id: Option<String>,
) -> ApiError {
    StandardErrorResponse::new(
        message,
        "VALIDATION_ERROR".to_string(),
        vec![suggestion.to_string()],
        conversation_id,
    )
    .with_status(Status::BadRequest)
}

pub(crate) fn marketplace_error(e: MarketplaceError, conversation_id: Option<String>) -> ApiError {
    let code = e.code();
    let (status, suggestions) = match &e {
        MarketplaceError::NotFound(_) => (
            Status::NotFound,
            vec!["Check the identifier and try again".to_string()],
        ),
        MarketplaceError::Forbidden(_) => (
            Status::Forbidden,
            vec!["Sign in with the account that owns this resource".to_string()],
        ),
        MarketplaceError::Conflict { .. } => (Status::Conflict, Vec::new()),
        MarketplaceError::Validation(_) | MarketplaceError::InvalidInput(_) => (
            Status::BadRequest,
            vec!["Fix the highlighted field and submit again".to_string()],
        ),
        MarketplaceError::Storage(inner) => {
            error!("Storage failure: {:#}", inner);
            return StandardErrorResponse::new(
                "Database error occurred".to_string(),
                code,
                vec!["Try again in a few moments".to_string()],
                conversation_id,
            )
            .with_status(Status::InternalServerError);
        }
    };

    StandardErrorResponse::new(e.to_string(), code, suggestions, conversation_id)
        .with_status(status)
}
