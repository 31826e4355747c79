use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::service::kids;
use crate::utils::room_cache::RoomCache;

#[derive(Debug, Deserialize)]
pub struct KidsQuery {
    pub contact_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KidsForRoomQuery {
    pub contact_number: Option<String>,
    pub room_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

/// Kids linked to a caregiver
#[utoipa::path(
    get,
    path = "/kids",
    params(
        ("contact_number", Query, description = "Caregiver contact number")
    ),
    responses(
        (status = 200, description = "Caregiver's kids", body = [kids::CaregiverKid]),
        (status = 400, description = "Missing contact number"),
        (status = 404, description = "Caregiver not found")
    ),
    tag = "Kids"
)]
pub async fn list_kids(
    pool: web::Data<SqlitePool>,
    query: web::Query<KidsQuery>,
) -> Result<HttpResponse, AppError> {
    let contact = query.contact_number.as_deref().unwrap_or_default();
    let kids = kids::kids_for_caregiver(&pool, contact).await?;
    Ok(HttpResponse::Ok().json(kids))
}

/// A caregiver's kids in one room, with today's last action
#[utoipa::path(
    get,
    path = "/kids-for-room",
    params(
        ("contact_number", Query, description = "Caregiver contact number"),
        ("room_id", Query, description = "Room id"),
        ("date", Query, description = "Day to inspect (YYYY-MM-DD), defaults to today")
    ),
    responses(
        (status = 200, description = "Kids with last action", body = [kids::RoomKidStatus]),
        (status = 400, description = "Missing contact number or room"),
        (status = 404, description = "Caregiver or room not found")
    ),
    tag = "Kids"
)]
pub async fn kids_for_room(
    pool: web::Data<SqlitePool>,
    rooms: web::Data<RoomCache>,
    query: web::Query<KidsForRoomQuery>,
) -> Result<HttpResponse, AppError> {
    let room_id = query
        .room_id
        .ok_or_else(|| AppError::validation("Missing room"))?;
    let contact = query.contact_number.as_deref().unwrap_or_default();
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let kids = kids::kids_for_room(&pool, &rooms, contact, room_id, date).await?;
    Ok(HttpResponse::Ok().json(kids))
}
