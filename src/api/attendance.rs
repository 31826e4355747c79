use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::instrument;

use crate::auth::auth::AuthTeacher;
use crate::error::AppError;
use crate::service::attendance;

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

impl DateQuery {
    fn day(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Kids currently signed in to a room
#[utoipa::path(
    get,
    path = "/attendance/{room_id}",
    params(
        ("room_id", Path, description = "Room id"),
        ("date", Query, description = "Day to inspect (YYYY-MM-DD), defaults to today")
    ),
    responses(
        (status = 200, description = "Present kids", body = [attendance::AttendanceEntry]),
        (status = 400, description = "Malformed room id or date"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "room_attendance", skip(auth, pool, path, query), fields(teacher = %auth.username))]
pub async fn room_attendance(
    auth: AuthTeacher,
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let present = attendance::current_attendance(&pool, path.into_inner(), query.day()).await?;
    Ok(HttpResponse::Ok().json(present))
}

/// Present kids for every room
#[utoipa::path(
    get,
    path = "/attendance",
    params(
        ("date", Query, description = "Day to inspect (YYYY-MM-DD), defaults to today")
    ),
    responses(
        (status = 200, description = "Attendance per room", body = [attendance::RoomAttendance]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "Attendance"
)]
#[instrument(name = "attendance_snapshot", skip(auth, pool, query), fields(teacher = %auth.username))]
pub async fn attendance_snapshot(
    auth: AuthTeacher,
    pool: web::Data<SqlitePool>,
    query: web::Query<DateQuery>,
) -> Result<HttpResponse, AppError> {
    let snapshot = attendance::room_attendance_snapshot(&pool, query.day()).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}
