//! Attendance is never stored. Everything here is derived from the sign log
//! for one calendar day (UTC) by [`derive_kid_states`].

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::model::caregiver::Caregiver;
use crate::model::room::Room;
use crate::model::sign_event::{SignAction, SignEvent};

/// Reduced view of one kid's events on one day.
#[derive(Debug, Clone)]
pub struct KidState {
    pub latest: SignEvent,
    pub last_in: Option<SignEvent>,
    pub last_out: Option<SignEvent>,
}

impl KidState {
    pub fn is_present(&self) -> bool {
        self.latest.action == SignAction::In
    }
}

/// Later timestamp wins; equal timestamps fall back to the higher id.
fn is_later(candidate: &SignEvent, current: &SignEvent) -> bool {
    (candidate.timestamp, candidate.id) > (current.timestamp, current.id)
}

fn keep_latest(slot: &mut Option<SignEvent>, event: &SignEvent) {
    match slot {
        Some(current) if !is_later(event, current) => {}
        _ => *slot = Some(event.clone()),
    }
}

/// Per-kid latest event, latest `in` and latest `out`. Callers pass events
/// for a single room; input order does not matter.
pub fn derive_kid_states<'a>(
    events: impl IntoIterator<Item = &'a SignEvent>,
) -> BTreeMap<i64, KidState> {
    let mut states: BTreeMap<i64, KidState> = BTreeMap::new();

    for event in events {
        let state = states.entry(event.kid_id).or_insert_with(|| KidState {
            latest: event.clone(),
            last_in: None,
            last_out: None,
        });

        if is_later(event, &state.latest) {
            state.latest = event.clone();
        }
        match event.action {
            SignAction::In => keep_latest(&mut state.last_in, event),
            SignAction::Out => keep_latest(&mut state.last_out, event),
        }
    }

    states
}

/// `[start, end)` of the given day in stored timestamp terms
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(chrono::NaiveTime::MIN);
    (start, start + chrono::Duration::days(1))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CaregiverRef {
    #[schema(example = "Ann")]
    pub name: String,
    #[schema(example = "555-1000")]
    pub contact_number: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AttendanceEntry {
    /// Kid id
    pub id: i64,
    pub kid_name: String,
    pub last_action: SignAction,
    #[schema(value_type = String, format = "date-time")]
    pub signed_in_at: Option<NaiveDateTime>,
    pub signed_in_by: Option<CaregiverRef>,
    #[schema(value_type = String, format = "date-time")]
    pub signed_out_at: Option<NaiveDateTime>,
    pub signed_out_by: Option<CaregiverRef>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomAttendance {
    pub room_id: i64,
    pub room_name: String,
    pub kids: Vec<AttendanceEntry>,
}

#[derive(sqlx::FromRow)]
struct RoomKid {
    id: i64,
    name: String,
    room_id: i64,
}

async fn events_for_day(
    pool: &SqlitePool,
    room_id: Option<i64>,
    date: NaiveDate,
) -> AppResult<Vec<SignEvent>> {
    let (start, end) = day_bounds(date);

    const COLUMNS: &str = "SELECT id, kid_id, room_id, caregiver_id, action, timestamp FROM sign_events";

    let events = match room_id {
        Some(room_id) => {
            let sql = format!("{COLUMNS} WHERE room_id = ? AND timestamp >= ? AND timestamp < ?");
            sqlx::query_as::<_, SignEvent>(&sql)
                .bind(room_id)
                .bind(start)
                .bind(end)
                .fetch_all(pool)
                .await?
        }
        None => {
            let sql = format!("{COLUMNS} WHERE timestamp >= ? AND timestamp < ?");
            sqlx::query_as::<_, SignEvent>(&sql)
                .bind(start)
                .bind(end)
                .fetch_all(pool)
                .await?
        }
    };

    Ok(events)
}

async fn caregivers_by_id(
    pool: &SqlitePool,
    events: &[SignEvent],
) -> AppResult<HashMap<i64, CaregiverRef>> {
    let mut ids: Vec<i64> = events.iter().filter_map(|e| e.caregiver_id).collect();
    ids.sort_unstable();
    ids.dedup();

    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT id, name, contact_number FROM caregivers WHERE id IN ({})",
        placeholders
    );
    let mut query = sqlx::query_as::<_, Caregiver>(&sql);
    for id in &ids {
        query = query.bind(id);
    }

    Ok(query
        .fetch_all(pool)
        .await?
        .into_iter()
        .map(|c| {
            (
                c.id,
                CaregiverRef {
                    name: c.name,
                    contact_number: c.contact_number,
                },
            )
        })
        .collect())
}

fn present_entries(
    kids: &[RoomKid],
    room_id: i64,
    events: &[SignEvent],
    caregivers: &HashMap<i64, CaregiverRef>,
) -> Vec<AttendanceEntry> {
    let states = derive_kid_states(events.iter().filter(|e| e.room_id == room_id));
    let who = |event: &Option<SignEvent>| {
        event
            .as_ref()
            .and_then(|e| e.caregiver_id)
            .and_then(|id| caregivers.get(&id).cloned())
    };

    kids.iter()
        .filter(|kid| kid.room_id == room_id)
        .filter_map(|kid| {
            let state = states.get(&kid.id).filter(|s| s.is_present())?;
            Some(AttendanceEntry {
                id: kid.id,
                kid_name: kid.name.clone(),
                last_action: state.latest.action,
                signed_in_at: state.last_in.as_ref().map(|e| e.timestamp),
                signed_in_by: who(&state.last_in),
                signed_out_at: state.last_out.as_ref().map(|e| e.timestamp),
                signed_out_by: who(&state.last_out),
            })
        })
        .collect()
}

/// Kids assigned to `room_id` whose latest event on `date` is a sign-in.
pub async fn current_attendance(
    pool: &SqlitePool,
    room_id: i64,
    date: NaiveDate,
) -> AppResult<Vec<AttendanceEntry>> {
    let kids = sqlx::query_as::<_, RoomKid>(
        "SELECT id, name, room_id FROM kids WHERE room_id = ? ORDER BY name, id",
    )
    .bind(room_id)
    .fetch_all(pool)
    .await?;

    let events = events_for_day(pool, Some(room_id), date).await?;
    let caregivers = caregivers_by_id(pool, &events).await?;

    Ok(present_entries(&kids, room_id, &events, &caregivers))
}

/// [`current_attendance`] for every room, from one pass over the day's log.
pub async fn room_attendance_snapshot(
    pool: &SqlitePool,
    date: NaiveDate,
) -> AppResult<Vec<RoomAttendance>> {
    let rooms = sqlx::query_as::<_, Room>("SELECT id, name FROM rooms ORDER BY id")
        .fetch_all(pool)
        .await?;
    let kids = sqlx::query_as::<_, RoomKid>(
        "SELECT id, name, room_id FROM kids WHERE room_id IS NOT NULL ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    let events = events_for_day(pool, None, date).await?;
    let caregivers = caregivers_by_id(pool, &events).await?;

    Ok(rooms
        .into_iter()
        .map(|room| RoomAttendance {
            kids: present_entries(&kids, room.id, &events, &caregivers),
            room_id: room.id,
            room_name: room.name,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn event(id: i64, kid_id: i64, action: SignAction, timestamp: NaiveDateTime) -> SignEvent {
        SignEvent {
            id,
            kid_id,
            room_id: 2,
            caregiver_id: Some(1),
            action,
            timestamp,
        }
    }

    #[test]
    fn latest_event_decides_presence() {
        let events = vec![
            event(1, 10, SignAction::In, at(9, 0)),
            event(2, 10, SignAction::Out, at(11, 0)),
            event(3, 11, SignAction::In, at(9, 30)),
        ];

        let states = derive_kid_states(&events);
        assert!(!states[&10].is_present());
        assert!(states[&11].is_present());
        assert_eq!(states[&10].last_in.as_ref().unwrap().id, 1);
        assert_eq!(states[&10].last_out.as_ref().unwrap().id, 2);
    }

    #[test]
    fn older_in_inserted_later_does_not_flip_presence() {
        // id 2 was inserted after id 1 but carries an earlier timestamp
        let events = vec![
            event(1, 10, SignAction::Out, at(11, 0)),
            event(2, 10, SignAction::In, at(9, 0)),
        ];

        let states = derive_kid_states(&events);
        assert!(!states[&10].is_present());
        assert_eq!(states[&10].latest.id, 1);
    }

    #[test]
    fn equal_timestamps_break_ties_by_id() {
        let events = vec![
            event(5, 10, SignAction::In, at(9, 0)),
            event(4, 10, SignAction::Out, at(9, 0)),
        ];

        assert!(derive_kid_states(&events)[&10].is_present());
        assert_eq!(derive_kid_states(events.iter().rev())[&10].latest.id, 5);
    }

    #[test]
    fn day_bounds_cover_one_day() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());
        assert_eq!(start, at(0, 0));
        assert_eq!(end - start, chrono::Duration::days(1));
    }

    async fn insert_event(pool: &SqlitePool, kid_id: i64, room_id: i64, action: &str, ts: NaiveDateTime) {
        sqlx::query(
            "INSERT INTO sign_events (kid_id, room_id, caregiver_id, action, timestamp)
             VALUES (?, ?, 1, ?, ?)",
        )
        .bind(kid_id)
        .bind(room_id)
        .bind(action)
        .bind(ts)
        .execute(pool)
        .await
        .unwrap();
    }

    async fn setup(pool: &SqlitePool) {
        sqlx::query("INSERT INTO caregivers (id, name, contact_number) VALUES (1, 'Ann', '555-1000')")
            .execute(pool)
            .await
            .unwrap();
        for (id, name, room) in [(1, "Bo", 2), (2, "Cy", 2), (3, "Di", 3)] {
            sqlx::query("INSERT INTO kids (id, name, family_code, room_id) VALUES (?, ?, ?, ?)")
                .bind(id)
                .bind(name)
                .bind(format!("code000{id}"))
                .bind(room)
                .execute(pool)
                .await
                .unwrap();
        }
    }

    #[actix_web::test]
    async fn attendance_only_counts_the_requested_day() {
        let (_dir, pool) = init_test_db().await;
        setup(&pool).await;

        let yesterday = at(10, 0) - chrono::Duration::days(1);
        insert_event(&pool, 1, 2, "in", yesterday).await;
        insert_event(&pool, 2, 2, "in", at(9, 0)).await;

        let today = at(0, 0).date();
        let present = current_attendance(&pool, 2, today).await.unwrap();
        assert_eq!(present.len(), 1);
        assert_eq!(present[0].kid_name, "Cy");
        assert_eq!(present[0].signed_in_by.as_ref().unwrap().name, "Ann");
        assert!(present[0].signed_out_at.is_none());
    }

    #[actix_web::test]
    async fn attendance_uses_timestamp_order_from_the_store() {
        let (_dir, pool) = init_test_db().await;
        setup(&pool).await;

        insert_event(&pool, 1, 2, "out", at(11, 0)).await;
        insert_event(&pool, 1, 2, "in", at(9, 0)).await;

        let present = current_attendance(&pool, 2, at(0, 0).date()).await.unwrap();
        assert!(present.is_empty());
    }

    #[actix_web::test]
    async fn snapshot_groups_present_kids_by_room() {
        let (_dir, pool) = init_test_db().await;
        setup(&pool).await;

        insert_event(&pool, 1, 2, "in", at(9, 0)).await;
        insert_event(&pool, 3, 3, "in", at(9, 5)).await;
        insert_event(&pool, 3, 3, "out", at(12, 0)).await;
        insert_event(&pool, 3, 3, "in", at(12, 30)).await;

        let snapshot = room_attendance_snapshot(&pool, at(0, 0).date()).await.unwrap();
        assert_eq!(snapshot.len(), 3);

        let by_room: HashMap<i64, &RoomAttendance> =
            snapshot.iter().map(|r| (r.room_id, r)).collect();
        assert!(by_room[&1].kids.is_empty());
        assert_eq!(by_room[&2].kids.len(), 1);
        let di = &by_room[&3].kids[0];
        assert_eq!(di.kid_name, "Di");
        assert_eq!(di.signed_in_at, Some(at(12, 30)));
        assert_eq!(di.signed_out_at, Some(at(12, 0)));
    }
}
