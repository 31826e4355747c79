use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::model::room::Room;

pub async fn list_rooms(pool: &SqlitePool) -> AppResult<Vec<Room>> {
    let rooms = sqlx::query_as::<_, Room>("SELECT id, name FROM rooms ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(rooms)
}
