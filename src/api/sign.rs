use actix_web::{HttpResponse, web};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::error::AppError;
use crate::models::{MessageResponse, SignReq};
use crate::service::sign;
use crate::utils::room_cache::RoomCache;

/// Sign kids in to or out of a room
#[utoipa::path(
    post,
    path = "/sign",
    request_body = SignReq,
    responses(
        (status = 200, description = "Events recorded", body = MessageResponse, example = json!({
            "message": "Bo signed in to Saplings"
        })),
        (status = 400, description = "Invalid request data"),
        (status = 403, description = "Caregiver is not linked to a kid"),
        (status = 404, description = "Room, caregiver or matching kids not found")
    ),
    tag = "Sign"
)]
#[instrument(name = "sign", skip(pool, rooms, payload), fields(room_id = ?payload.room_id, action = ?payload.action))]
pub async fn sign(
    pool: web::Data<SqlitePool>,
    rooms: web::Data<RoomCache>,
    payload: web::Json<SignReq>,
) -> Result<HttpResponse, AppError> {
    let signed = sign::sign(&pool, &rooms, &payload, Utc::now().naive_utc()).await?;

    let message = signed
        .iter()
        .map(|kid| kid.summary())
        .collect::<Vec<_>>()
        .join("; ");

    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}
