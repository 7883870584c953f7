// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use crate::analysis::{AnalysisInput, AnalyzerSet, ProfileSummaryInput};
use crate::auth::{auth_failure, OptionalSession, Session, SessionConfig};
use crate::database::DatabaseConfig;
use crate::marketplace::{
    Application, ApplicationDetails, ApplicationOverview, FreelancerMatch, Job, NewJob, User,
};
use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{
    catchers, get, options, patch, post, put, routes, Build, Request, Response, Rocket, State,
};
use tracing::info;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, PUT, PATCH, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// Analysis

#[post("/ai/analyze?<profile>", data = "<request>")]
pub async fn analyze(
    request: Json<StandardRequest<AnalysisInput>>,
    profile: Option<String>,
    analyzers: &State<AnalyzerSet>,
) -> ApiResult<DataResponse<AnalysisData>> {
    handlers::analyze_handler(request, profile, analyzers).await
}

#[post("/ai/analyze/skills", data = "<request>")]
pub async fn analyze_skills(
    request: Json<StandardRequest<SkillsReportRequest>>,
    analyzers: &State<AnalyzerSet>,
) -> ApiResult<DataResponse<SkillsReportData>> {
    handlers::skills_report_handler(request, analyzers).await
}

#[post("/ai/analyze/summary", data = "<request>")]
pub async fn analyze_summary(
    request: Json<StandardRequest<ProfileSummaryInput>>,
    analyzers: &State<AnalyzerSet>,
) -> ApiResult<DataResponse<ProfileSummaryData>> {
    handlers::profile_summary_handler(request, analyzers).await
}

// Accounts

#[post("/auth/signup", data = "<request>")]
pub async fn signup(
    request: Json<StandardRequest<SignupRequest>>,
    session_config: &State<SessionConfig>,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<SessionData>> {
    handlers::signup_handler(request, session_config, db_config).await
}

#[post("/auth/login", data = "<request>")]
pub async fn login(
    request: Json<StandardRequest<LoginRequest>>,
    session_config: &State<SessionConfig>,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<SessionData>> {
    handlers::login_handler(request, session_config, db_config).await
}

#[get("/me")]
pub async fn get_current_user(session: Session) -> Json<DataResponse<User>> {
    handlers::get_current_user_handler(session).await
}

#[put("/me/skills", data = "<request>")]
pub async fn update_skills(
    request: Json<StandardRequest<UpdateSkillsRequest>>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<User>> {
    handlers::update_skills_handler(request, session, db_config).await
}

// Job board

#[post("/jobs", data = "<request>")]
pub async fn create_job(
    request: Json<StandardRequest<NewJob>>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Job>> {
    handlers::create_job_handler(request, session, db_config).await
}

#[get("/jobs?<search>&<skills>&<min_budget>&<max_budget>&<sort>")]
pub async fn list_jobs(
    search: Option<String>,
    skills: Option<String>,
    min_budget: Option<f64>,
    max_budget: Option<f64>,
    sort: Option<String>,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Vec<Job>>> {
    let query = handlers::JobQuery {
        search,
        skills,
        min_budget,
        max_budget,
        sort,
    };
    handlers::list_jobs_handler(query, db_config).await
}

#[get("/jobs/mine")]
pub async fn my_jobs(
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Vec<Job>>> {
    handlers::my_jobs_handler(session, db_config).await
}

#[get("/jobs/<id>")]
pub async fn get_job(id: &str, db_config: &State<DatabaseConfig>) -> ApiResult<DataResponse<Job>> {
    handlers::get_job_handler(id, db_config).await
}

#[patch("/jobs/<id>/status", data = "<request>")]
pub async fn update_job_status(
    id: &str,
    request: Json<StandardRequest<JobStatusRequest>>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<ActionResponse> {
    handlers::update_job_status_handler(id, request, session, db_config).await
}

#[get("/jobs/<id>/matches")]
pub async fn job_matches(
    id: &str,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Vec<FreelancerMatch>>> {
    handlers::job_matches_handler(id, session, db_config).await
}

// Applications

#[post("/jobs/<id>/apply")]
pub async fn apply(
    id: &str,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Application>> {
    handlers::apply_handler(id, session, db_config).await
}

#[get("/jobs/<id>/applications")]
pub async fn job_applications(
    id: &str,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<Vec<ApplicationDetails>>> {
    handlers::job_applications_handler(id, session, db_config).await
}

#[get("/applications?<status>")]
pub async fn my_applications(
    status: Option<String>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<ApplicationOverview>> {
    handlers::my_applications_handler(status, session, db_config).await
}

#[patch("/applications/<id>", data = "<request>")]
pub async fn update_application_status(
    id: &str,
    request: Json<StandardRequest<ApplicationStatusRequest>>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<ActionResponse> {
    handlers::update_application_status_handler(id, request, session, db_config).await
}

#[get("/health")]
pub async fn health(auth: OptionalSession) -> Json<&'static str> {
    handlers::health_handler(auth).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(401)]
pub fn unauthorized(req: &Request) -> Json<StandardErrorResponse> {
    let message = auth_failure(req)
        .map(|e| e.message())
        .unwrap_or("Authentication required");

    Json(StandardErrorResponse::new(
        message.to_string(),
        "AUTHORIZATION_ERROR".to_string(),
        vec![
            "Sign in and send the session token as a Bearer token".to_string(),
            "Sign in again if your session has expired".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
        None,
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body could not be understood".to_string(),
        "INVALID_INPUT".to_string(),
        vec![
            "Check field names and value types".to_string(),
            "Use one of the documented values for enumerated fields".to_string(),
        ],
        None,
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
        None,
    ))
}

/// Assemble the API without launching it.
pub fn build_rocket(
    analyzers: AnalyzerSet,
    session_config: SessionConfig,
    db_config: DatabaseConfig,
) -> Rocket<Build> {
    rocket::build()
        .attach(Cors)
        .manage(analyzers)
        .manage(session_config)
        .manage(db_config)
        .register(
            "/api",
            catchers![bad_request, unauthorized, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                analyze,
                analyze_skills,
                analyze_summary,
                signup,
                login,
                get_current_user,
                update_skills,
                create_job,
                list_jobs,
                my_jobs,
                get_job,
                update_job_status,
                job_matches,
                apply,
                job_applications,
                my_applications,
                update_application_status,
                health,
                options,
            ],
        )
}

pub async fn start_web_server(
    analyzers: AnalyzerSet,
    session_config: SessionConfig,
    db_config: DatabaseConfig,
    port: u16,
) -> Result<()> {
    info!("Starting freelance-match API server");
    info!("Database: {}", db_config.database_path.display());
    info!("Server: http://0.0.0.0:{}", port);

    let figment = rocket::Config::figment()
        .merge(("port", port))
        .merge(("address", "0.0.0.0"));

    build_rocket(analyzers, session_config, db_config)
        .configure(figment)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Server stopped with an error: {}", e))?;

    Ok(())
}
