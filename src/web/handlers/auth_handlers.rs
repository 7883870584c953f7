// src/web/handlers/auth_handlers.rs
use super::{database_pool, marketplace_error};
use crate::auth::{issue_token, Session, SessionConfig};
use crate::database::DatabaseConfig;
use crate::marketplace::{MarketplaceService, NewUser, User};
use crate::web::types::{
    ApiError, ApiResult, DataResponse, LoginRequest, SessionData, SignupRequest,
    StandardErrorResponse, StandardRequest, UpdateSkillsRequest, WithConversationId,
};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

fn session_data(
    user: User,
    session_config: &SessionConfig,
    conversation_id: Option<String>,
) -> Result<SessionData, ApiError> {
    match issue_token(&user, session_config) {
        Ok(token) => Ok(SessionData { token, user }),
        Err(e) => {
            error!("Failed to sign session token for {}: {}", user.email, e);
            Err(StandardErrorResponse::new(
                "Could not start a session".to_string(),
                "SESSION_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
                conversation_id,
            )
            .with_status(Status::InternalServerError))
        }
    }
}

pub async fn signup_handler(
    request: Json<StandardRequest<SignupRequest>>,
    session_config: &State<SessionConfig>,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<SessionData>> {
    let conversation_id = request.conversation_id();
    let pool = database_pool(db_config, conversation_id.clone())?;
    let request = request.into_inner();

    let new_user = NewUser {
        name: request.data.name,
        email: request.data.email,
        role: request.data.role,
        company: request.data.company,
        telegram_id: request.data.telegram_id,
    };

    let user = MarketplaceService::new(pool)
        .signup(new_user)
        .await
        .map_err(|e| marketplace_error(e, conversation_id.clone()))?;

    info!("New {} account: {}", user.role.as_str(), user.email);

    let message = format!("Welcome, {}", user.name);
    let data = session_data(user, session_config, conversation_id.clone())?;
    Ok(Json(DataResponse::success(message, data, conversation_id)))
}

pub async fn login_handler(
    request: Json<StandardRequest<LoginRequest>>,
    session_config: &State<SessionConfig>,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<SessionData>> {
    let conversation_id = request.conversation_id();
    let pool = database_pool(db_config, conversation_id.clone())?;

    let user = MarketplaceService::new(pool)
        .login(&request.data.email)
        .await
        .map_err(|e| marketplace_error(e, conversation_id.clone()))?;

    let message = format!("Signed in as {}", user.email);
    let data = session_data(user, session_config, conversation_id.clone())?;
    Ok(Json(DataResponse::success(message, data, conversation_id)))
}

pub async fn get_current_user_handler(session: Session) -> Json<DataResponse<User>> {
    let message = format!("Signed in as {}", session.email());
    Json(DataResponse::success(message, session.user, None))
}

pub async fn update_skills_handler(
    request: Json<StandardRequest<UpdateSkillsRequest>>,
    session: Session,
    db_config: &State<DatabaseConfig>,
) -> ApiResult<DataResponse<User>> {
    let conversation_id = request.conversation_id();
    let pool = database_pool(db_config, conversation_id.clone())?;

    let user = MarketplaceService::new(pool)
        .update_skills(session.user(), &request.data.skills)
        .await
        .map_err(|e| marketplace_error(e, conversation_id.clone()))?;

    Ok(Json(DataResponse::success(
        format!("Profile now lists {} skills", user.skills.len()),
        user,
        conversation_id,
    )))
}
