// src/web/handlers/system_handlers.rs
use crate::auth::OptionalSession;

use rocket::serde::json::Json;
use tracing::info;

pub async fn health_handler(auth: OptionalSession) -> Json<&'static str> {
    if let Some(session) = auth.session {
        info!(
            "Health check by signed in user: {} ({})",
            session.email(),
            session.user().role.as_str()
        );
    } else {
        info!("Health check by anonymous user");
    }
    Json("OK")
}
