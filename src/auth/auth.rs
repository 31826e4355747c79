use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

pub const SESSION_COOKIE: &str = "session";

/// Teacher authenticated for the current request.
#[derive(Debug, Clone)]
pub struct AuthTeacher {
    pub teacher_id: i64,
    pub username: String,
}

/// Session cookie first, then `Authorization: Bearer`.
pub fn session_token(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string)
}

impl AuthTeacher {
    pub fn from_token(token: &str, config: &Config) -> Result<Self, AppError> {
        let claims = verify_token(token, &config.session_secret)
            .map_err(|_| AppError::Unauthorized("Invalid or expired session".into()))?;

        Ok(AuthTeacher {
            teacher_id: claims.teacher_id,
            username: claims.sub,
        })
    }
}

impl FromRequest for AuthTeacher {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Set by the auth middleware on protected scopes
        if let Some(teacher) = req.extensions().get::<AuthTeacher>() {
            return ready(Ok(teacher.clone()));
        }

        let token = match session_token(req) {
            Some(t) => t,
            None => return ready(Err(AppError::Unauthorized("Unauthorized".into()))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => return ready(Err(AppError::Internal("Config missing".into()))),
        };

        ready(AuthTeacher::from_token(&token, config))
    }
}
