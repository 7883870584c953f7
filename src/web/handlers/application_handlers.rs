// src/web/handlers/application_handlers.rs
use super::{database_pool, marketplace_error, validation_error};
use crate::auth::Session;
use crate::database::DatabaseConfig;
use crate::marketplace::{
    Application, ApplicationDetails, ApplicationOverview, ApplicationStatus, MarketplaceService,
};
use crate::web::types::{
    ActionResponse, ApiResult, ApplicationStatusRequest, DataResponse, StandardRequest,
    WithConversationId,
};
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub async fn apply_handler(
    job_id: &str,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Application>> {
    let pool = database_pool(db_config, None)?;
    let application = MarketplaceService::new(pool)
        .apply(session.user(), job_id)
        .await
        .map_err(|e| marketplace_error(e, None))?;

    info!("{} applied to job {}", session.email(), job_id);

    Ok(Json(DataResponse::success(
        "Application submitted".to_string(),
        application,
        None,
    )))
}

pub async fn my_applications_handler(
    status: Option<String>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<ApplicationOverview>> {
    let status = match status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<ApplicationStatus>().map_err(|e| {
            validation_error(
                e.to_string(),
                "Use applied, interview, accepted or rejected",
                None,
            )
        })?),
        None => None,
    };

    let pool = database_pool(db_config, None)?;
    let overview = MarketplaceService::new(pool)
        .freelancer_applications(session.user(), status)
        .await
        .map_err(|e| marketplace_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("{} applications", overview.applications.len()),
        overview,
        None,
    )))
}

pub async fn job_applications_handler(
    job_id: &str,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Vec<ApplicationDetails>>> {
    let pool = database_pool(db_config, None)?;
    let applications = MarketplaceService::new(pool)
        .job_applications(session.user(), job_id)
        .await
        .map_err(|e| marketplace_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("{} applications received", applications.len()),
        applications,
        None,
    )))
}

pub async fn update_application_status_handler(
    id: &str,
    request: Json<StandardRequest<ApplicationStatusRequest>>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<ActionResponse> {
    let conversation_id = request.conversation_id();
    let pool = database_pool(db_config, conversation_id.clone())?;

    let application = MarketplaceService::new(pool)
        .set_application_status(session.user(), id, request.data.status)
        .await
        .map_err(|e| marketplace_error(e, conversation_id.clone()))?;

    info!(
        "{} moved application {} to {}",
        session.email(),
        application.id,
        application.status.as_str()
    );

    Ok(Json(ActionResponse::success(
        format!("Application is now {}", application.status.as_str()),
        "application_status_updated".to_string(),
        conversation_id,
    )))
}
