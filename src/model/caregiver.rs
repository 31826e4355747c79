use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Caregiver {
    pub id: i64,
    pub name: String,
    pub contact_number: String,
}
