use crate::{
    auth::{auth::SESSION_COOKIE, jwt::generate_session_token},
    config::Config,
    error::AppError,
    models::{LoginReqDto, MessageResponse},
    service::teachers,
};
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{HttpResponse, web};
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

fn session_cookie(config: &Config, value: String) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, value)
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::seconds(config.session_ttl as i64))
        .finish()
}

/// Teacher login; sets the session cookie
#[utoipa::path(
    post,
    path = "/teacher/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in, session cookie set", body = MessageResponse, example = json!({
            "message": "Login successful"
        })),
        (status = 400, description = "Missing credentials"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Teacher"
)]
#[instrument(
    name = "teacher_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    let teacher = teachers::authenticate(&pool, &user.username, &user.password).await?;

    debug!(teacher_id = teacher.id, "Generating session token");
    let token = generate_session_token(
        teacher.id,
        teacher.username,
        &config.session_secret,
        config.session_ttl,
    )
    .map_err(|e| AppError::Internal(format!("session token: {e}")))?;

    info!("Login successful");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&config, token))
        .json(MessageResponse::new("Login successful")))
}

/// Clear the session cookie. Always succeeds.
#[utoipa::path(
    post,
    path = "/teacher/logout",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    ),
    tag = "Teacher"
)]
pub async fn logout(config: web::Data<Config>) -> HttpResponse {
    let mut cookie = session_cookie(&config, String::new());
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(MessageResponse::new("Logged out"))
}
