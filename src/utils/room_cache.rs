use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use sqlx::SqlitePool;
use std::time::Duration;

use crate::model::room::Room;

/// Rooms by id. Rooms are seeded reference data, so entries only expire to
/// pick up a rename done directly in the database.
#[derive(Clone)]
pub struct RoomCache {
    rooms: Cache<i64, Room>,
}

impl Default for RoomCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomCache {
    pub fn new() -> Self {
        Self {
            rooms: Cache::builder()
                .max_capacity(1_000)
                .time_to_live(Duration::from_secs(3600))
                .build(),
        }
    }

    /// Cached room, falling back to the database. `None` if no such room.
    pub async fn get(&self, pool: &SqlitePool, room_id: i64) -> Result<Option<Room>, sqlx::Error> {
        if let Some(room) = self.rooms.get(&room_id).await {
            return Ok(Some(room));
        }

        let room = sqlx::query_as::<_, Room>("SELECT id, name FROM rooms WHERE id = ?")
            .bind(room_id)
            .fetch_optional(pool)
            .await?;

        if let Some(room) = &room {
            self.rooms.insert(room.id, room.clone()).await;
        }

        Ok(room)
    }

    /// Load every room into the cache
    pub async fn warmup(&self, pool: &SqlitePool) -> Result<usize> {
        let mut stream = sqlx::query_as::<_, Room>("SELECT id, name FROM rooms").fetch(pool);
        let mut total = 0;

        while let Some(row) = stream.next().await {
            let room = row?;
            self.rooms.insert(room.id, room).await;
            total += 1;
        }

        tracing::info!("Room cache warmup complete: {} rooms", total);
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    #[actix_web::test]
    async fn warmup_loads_seeded_rooms() {
        let (_dir, pool) = init_test_db().await;
        let cache = RoomCache::new();

        assert_eq!(cache.warmup(&pool).await.unwrap(), 3);
        let room = cache.get(&pool, 2).await.unwrap().unwrap();
        assert_eq!(room.name, "Saplings");
    }

    #[actix_web::test]
    async fn unknown_room_is_none() {
        let (_dir, pool) = init_test_db().await;
        let cache = RoomCache::new();

        assert!(cache.get(&pool, 99).await.unwrap().is_none());
    }
}
