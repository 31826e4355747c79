use actix_web::{HttpResponse, web};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::service::rooms;

/// List rooms
#[utoipa::path(
    get,
    path = "/rooms",
    responses(
        (status = 200, description = "All rooms", body = [crate::model::room::Room]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Rooms"
)]
pub async fn list_rooms(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let rooms = rooms::list_rooms(&pool).await?;
    Ok(HttpResponse::Ok().json(rooms))
}
