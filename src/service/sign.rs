use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::model::sign_event::SignAction;
use crate::models::SignReq;
use crate::utils::room_cache::RoomCache;

/// A kid whose event was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedKid {
    pub kid_id: i64,
    pub kid_name: String,
    pub room_name: String,
    pub action: SignAction,
}

impl SignedKid {
    pub fn summary(&self) -> String {
        match self.action {
            SignAction::In => format!("{} signed in to {}", self.kid_name, self.room_name),
            SignAction::Out => format!("{} signed out of {}", self.kid_name, self.room_name),
        }
    }
}

#[derive(sqlx::FromRow)]
struct LinkedKid {
    id: i64,
    name: String,
    room_id: Option<i64>,
}

struct ValidSign {
    contact: String,
    room_id: i64,
    kid_ids: BTreeSet<i64>,
    action: SignAction,
}

fn validate(req: &SignReq) -> AppResult<ValidSign> {
    let invalid = || AppError::validation("Invalid request data");

    let contact = req
        .caregiver_contact
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(invalid)?;
    let room_id = req.room_id.ok_or_else(invalid)?;
    let action = req
        .action
        .as_deref()
        .and_then(|a| a.parse::<SignAction>().ok())
        .ok_or_else(invalid)?;

    let kid_ids: BTreeSet<i64> = req
        .kid_ids
        .iter()
        .flatten()
        .copied()
        .chain(req.kid_id)
        .collect();
    if kid_ids.is_empty() {
        return Err(invalid());
    }

    Ok(ValidSign {
        contact: contact.to_string(),
        room_id,
        kid_ids,
        action,
    })
}

/// Append one event per authorized kid assigned to the room.
///
/// Every kid must be linked to the caregiver; the first one that is not
/// rejects the whole batch and nothing is written. Kids assigned to another
/// room are skipped. All events of a batch commit together.
pub async fn sign(
    pool: &SqlitePool,
    rooms: &RoomCache,
    req: &SignReq,
    now: NaiveDateTime,
) -> AppResult<Vec<SignedKid>> {
    let req = validate(req)?;

    let room = rooms
        .get(pool, req.room_id)
        .await?
        .ok_or_else(|| AppError::not_found("Room not found"))?;

    let mut tx = pool.begin().await?;

    // Write first: under WAL a read snapshot cannot be upgraded to a writer.
    let caregiver_id = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE caregivers SET contact_number = contact_number
        WHERE contact_number = ?
        RETURNING id
        "#,
    )
    .bind(&req.contact)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Caregiver not found"))?;

    let mut authorized = Vec::with_capacity(req.kid_ids.len());
    for kid_id in &req.kid_ids {
        let kid = sqlx::query_as::<_, LinkedKid>(
            r#"
            SELECT k.id, k.name, k.room_id
            FROM kids k
            JOIN kid_caregiver kc ON kc.kid_id = k.id
            WHERE k.id = ? AND kc.caregiver_id = ?
            "#,
        )
        .bind(kid_id)
        .bind(caregiver_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            AppError::Forbidden(format!("Caregiver is not authorized for kid {kid_id}"))
        })?;

        authorized.push(kid);
    }

    let mut signed = Vec::new();
    for kid in authorized {
        if kid.room_id != Some(room.id) {
            debug!(kid_id = kid.id, room_id = room.id, "Kid not assigned to room, skipping");
            continue;
        }

        sqlx::query(
            r#"
            INSERT INTO sign_events (kid_id, room_id, caregiver_id, action, timestamp)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(kid.id)
        .bind(room.id)
        .bind(caregiver_id)
        .bind(req.action)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        signed.push(SignedKid {
            kid_id: kid.id,
            kid_name: kid.name,
            room_name: room.name.clone(),
            action: req.action,
        });
    }

    if signed.is_empty() {
        return Err(AppError::not_found("No kids found for this room"));
    }

    tx.commit().await?;
    info!(
        caregiver_id,
        room_id = room.id,
        action = %req.action,
        kids = signed.len(),
        "Sign events recorded"
    );
    Ok(signed)
}
