// src/web/handlers/job_handlers.rs
use super::{database_pool, marketplace_error, validation_error};
use crate::auth::Session;
use crate::database::DatabaseConfig;
use crate::marketplace::{FreelancerMatch, Job, JobFilter, JobSort, MarketplaceService, NewJob};
use crate::web::types::{
    ActionResponse, ApiResult, DataResponse, JobStatusRequest, StandardRequest,
    WithConversationId,
};
use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

pub struct JobQuery {
    pub search: Option<String>,
    pub skills: Option<String>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub sort: Option<String>,
}

pub async fn create_job_handler(
    request: Json<StandardRequest<NewJob>>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Job>> {
    let conversation_id = request.conversation_id();
    let pool = database_pool(db_config, conversation_id.clone())?;
    let request = request.into_inner();

    let job = MarketplaceService::new(pool)
        .post_job(session.user(), request.data)
        .await
        .map_err(|e| marketplace_error(e, conversation_id.clone()))?;

    info!("{} posted job {} ({})", session.email(), job.id, job.title);

    Ok(Json(DataResponse::success(
        "Job posted successfully".to_string(),
        job,
        conversation_id,
    )))
}

pub async fn list_jobs_handler(
    query: JobQuery,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Vec<Job>>> {
    let pool = database_pool(db_config, None)?;

    let sort = match query.sort.as_deref() {
        Some(raw) => raw.parse::<JobSort>().map_err(|e| {
            validation_error(e.to_string(), "Use newest, budget-high or budget-low", None)
        })?,
        None => JobSort::default(),
    };

    let filter = JobFilter {
        search: query.search,
        skills: query
            .skills
            .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_default(),
        min_budget: query.min_budget,
        max_budget: query.max_budget,
        sort,
    };

    let jobs = MarketplaceService::new(pool)
        .search_jobs(&filter)
        .await
        .map_err(|e| marketplace_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("{} open jobs", jobs.len()),
        jobs,
        None,
    )))
}

pub async fn get_job_handler(
    id: &str,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Job>> {
    let pool = database_pool(db_config, None)?;
    let job = MarketplaceService::new(pool)
        .job(id)
        .await
        .map_err(|e| marketplace_error(e, None))?;

    Ok(Json(DataResponse::success(job.title.clone(), job, None)))
}

pub async fn my_jobs_handler(
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Vec<Job>>> {
    let pool = database_pool(db_config, None)?;
    let jobs = MarketplaceService::new(pool)
        .client_jobs(session.user())
        .await
        .map_err(|e| marketplace_error(e, None))?;

    Ok(Json(DataResponse::success(
        format!("You have posted {} jobs", jobs.len()),
        jobs,
        None,
    )))
}

pub async fn update_job_status_handler(
    id: &str,
    request: Json<StandardRequest<JobStatusRequest>>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<ActionResponse> {
    let conversation_id = request.conversation_id();
    let pool = database_pool(db_config, conversation_id.clone())?;

    let job = MarketplaceService::new(pool)
        .set_job_status(session.user(), id, request.data.status)
        .await
        .map_err(|e| marketplace_error(e, conversation_id.clone()))?;

    Ok(Json(
        ActionResponse::success(
            format!("Job '{}' is now {}", job.title, job.status.as_str()),
            "job_status_updated".to_string(),
            conversation_id,
        )
        .with_next_actions(vec![format!("Review applications for {}", job.id)]),
    ))
}

pub async fn job_matches_handler(
    id: &str,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Vec<FreelancerMatch>>> {
    let pool = database_pool(db_config, None)?;
    let matches = MarketplaceService::new(pool)
        .matches(session.user(), id)
        .await
        .map_err(|e| marketplace_error(e, None))?;

    info!("Found {} freelancer matches for job {}", matches.len(), id);

    Ok(Json(DataResponse::success(
        format!("Found {} matching freelancers", matches.len()),
        matches,
        None,
    )))
}
