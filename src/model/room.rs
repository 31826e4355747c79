use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Room {
    #[schema(example = 2)]
    pub id: i64,
    #[schema(example = "Saplings")]
    pub name: String,
}
