use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = "teacher")]
    pub username: String,
    pub password: String,
}

/// Session token payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub teacher_id: i64,
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}

/// Body of `POST /register`. Every field is optional on the wire so that
/// missing input surfaces as a validation error rather than a parse error.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Ann")]
    pub caregiver_name: Option<String>,
    #[schema(example = "555-1000")]
    pub caregiver_contact: Option<String>,
    #[schema(example = "Bo")]
    pub kid_name: Option<String>,
    #[schema(example = 2)]
    pub room_id: Option<i64>,
    /// Links to an already registered kid instead of creating one
    #[schema(example = "1a2b3c4d")]
    pub family_code: Option<String>,
}

/// Body of `POST /sign`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SignReq {
    #[schema(example = "555-1000")]
    pub caregiver_contact: Option<String>,
    #[schema(example = 2)]
    pub room_id: Option<i64>,
    #[schema(example = json!([1, 2]))]
    pub kid_ids: Option<Vec<i64>>,
    /// Single-kid form, merged into `kid_ids`
    pub kid_id: Option<i64>,
    #[schema(example = "in")]
    pub action: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family_code: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            family_code: None,
        }
    }
}
