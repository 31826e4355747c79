use actix_web::{HttpResponse, web};
use sqlx::SqlitePool;
use tracing::instrument;

use crate::error::AppError;
use crate::models::{MessageResponse, RegisterReq};
use crate::service::registration::{self, RegistrationOutcome};

/// Register a caregiver and a new kid, or link to an existing kid
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterReq,
    responses(
        (status = 200, description = "Registered or linked", body = MessageResponse, example = json!({
            "message": "Registration successful",
            "family_code": "1a2b3c4d"
        })),
        (status = 400, description = "Missing caregiver or kid information"),
        (status = 404, description = "Family code or room not found")
    ),
    tag = "Registration"
)]
#[instrument(name = "register", skip(pool, payload))]
pub async fn register(
    pool: web::Data<SqlitePool>,
    payload: web::Json<RegisterReq>,
) -> Result<HttpResponse, AppError> {
    let response = match registration::register(&pool, &payload).await? {
        RegistrationOutcome::Linked { .. } => MessageResponse::new("Linked to existing kid"),
        RegistrationOutcome::Registered { family_code, .. } => MessageResponse {
            message: "Registration successful".to_string(),
            family_code: Some(family_code),
        },
    };

    Ok(HttpResponse::Ok().json(response))
}
