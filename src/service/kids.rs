use chrono::NaiveDate;
use serde::Serialize;
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::sign_event::{SignAction, SignEvent};
use crate::service::attendance::{day_bounds, derive_kid_states};
use crate::utils::room_cache::RoomCache;

#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
pub struct CaregiverKid {
    pub id: i64,
    pub name: String,
    pub room_id: Option<i64>,
    pub room_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomKidStatus {
    pub id: i64,
    pub name: String,
    pub room_name: String,
    /// Latest action today, `null` if the kid has not been signed yet
    pub last_action: Option<SignAction>,
}

async fn caregiver_id(pool: &SqlitePool, contact: &str) -> AppResult<i64> {
    let contact = contact.trim();
    if contact.is_empty() {
        return Err(AppError::validation("Missing contact number"));
    }

    sqlx::query_scalar::<_, i64>("SELECT id FROM caregivers WHERE contact_number = ?")
        .bind(contact)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("Caregiver not found"))
}

/// All kids linked to the caregiver with their room.
pub async fn kids_for_caregiver(pool: &SqlitePool, contact: &str) -> AppResult<Vec<CaregiverKid>> {
    let caregiver_id = caregiver_id(pool, contact).await?;

    let kids = sqlx::query_as::<_, CaregiverKid>(
        r#"
        SELECT k.id, k.name, k.room_id, r.name AS room_name
        FROM kids k
        JOIN kid_caregiver kc ON k.id = kc.kid_id
        LEFT JOIN rooms r ON r.id = k.room_id
        WHERE kc.caregiver_id = ?
        ORDER BY k.name, k.id
        "#,
    )
    .bind(caregiver_id)
    .fetch_all(pool)
    .await?;

    Ok(kids)
}

/// The caregiver's kids assigned to one room, with the day's last action.
pub async fn kids_for_room(
    pool: &SqlitePool,
    rooms: &RoomCache,
    contact: &str,
    room_id: i64,
    date: NaiveDate,
) -> AppResult<Vec<RoomKidStatus>> {
    let caregiver_id = caregiver_id(pool, contact).await?;
    let room = rooms
        .get(pool, room_id)
        .await?
        .ok_or_else(|| AppError::not_found("Room not found"))?;

    let kids = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT k.id, k.name
        FROM kids k
        JOIN kid_caregiver kc ON k.id = kc.kid_id
        WHERE kc.caregiver_id = ? AND k.room_id = ?
        ORDER BY k.name, k.id
        "#,
    )
    .bind(caregiver_id)
    .bind(room.id)
    .fetch_all(pool)
    .await?;

    let (start, end) = day_bounds(date);
    let events = sqlx::query_as::<_, SignEvent>(
        r#"
        SELECT e.id, e.kid_id, e.room_id, e.caregiver_id, e.action, e.timestamp
        FROM sign_events e
        JOIN kid_caregiver kc ON kc.kid_id = e.kid_id
        WHERE kc.caregiver_id = ? AND e.room_id = ?
          AND e.timestamp >= ? AND e.timestamp < ?
        "#,
    )
    .bind(caregiver_id)
    .bind(room.id)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    let states = derive_kid_states(&events);

    Ok(kids
        .into_iter()
        .map(|(id, name)| RoomKidStatus {
            last_action: states.get(&id).map(|s| s.latest.action),
            id,
            name,
            room_name: room.name.clone(),
        })
        .collect())
}
