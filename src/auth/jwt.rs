use std::time::{SystemTime, UNIX_EPOCH};

use crate::models::Claims;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or(0)
}

pub fn generate_session_token(
    teacher_id: i64,
    username: String,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = Claims {
        teacher_id,
        sub: username,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_with_same_secret() {
        let token = generate_session_token(7, "teacher".into(), "s3cret", 60).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.teacher_id, 7);
        assert_eq!(claims.sub, "teacher");
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_session_token(7, "teacher".into(), "s3cret", 60).unwrap();
        assert!(verify_token(&token, "different").is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let mut token = generate_session_token(7, "teacher".into(), "s3cret", 60).unwrap();
        token.push('x');
        assert!(verify_token(&token, "s3cret").is_err());
    }
}
