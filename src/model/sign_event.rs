use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum SignAction {
    In,
    Out,
}

/// One row of the append-only sign log.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SignEvent {
    pub id: i64,
    pub kid_id: i64,
    pub room_id: i64,
    pub caregiver_id: Option<i64>,
    pub action: SignAction,
    pub timestamp: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_parses_lowercase_only() {
        assert_eq!("in".parse::<SignAction>().unwrap(), SignAction::In);
        assert_eq!("out".parse::<SignAction>().unwrap(), SignAction::Out);
        assert!("IN".parse::<SignAction>().is_err());
        assert!("later".parse::<SignAction>().is_err());
        assert_eq!(SignAction::Out.to_string(), "out");
    }
}
