use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Kid {
    pub id: i64,
    pub name: String,
    pub family_code: String,
    pub room_id: Option<i64>,
}
