use actix_web::{HttpResponse, web};

use crate::auth::auth::AuthTeacher;
use crate::config::Config;
use crate::error::AppError;
use crate::model::sign_event::SignAction;
use crate::service::qr::room_qr_page;

fn page(config: &Config, room_id: i64, action: Option<SignAction>) -> Result<HttpResponse, AppError> {
    let html = room_qr_page(&config.public_base_url, room_id, action)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html))
}

/// Printable QR code routing caregivers to the room's sign page
#[utoipa::path(
    get,
    path = "/qr/{room_id}",
    params(
        ("room_id", Path, description = "Room id")
    ),
    responses(
        (status = 200, description = "HTML page with the QR code", content_type = "text/html"),
        (status = 400, description = "Malformed room id"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "QR generation failed")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "QR"
)]
pub async fn room_qr(
    _auth: AuthTeacher,
    config: web::Data<Config>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    page(&config, path.into_inner(), None)
}

/// QR code that also preselects sign-in or sign-out
#[utoipa::path(
    get,
    path = "/qr/{room_id}/{action}",
    params(
        ("room_id", Path, description = "Room id"),
        ("action", Path, description = "`in` or `out`")
    ),
    responses(
        (status = 200, description = "HTML page with the QR code", content_type = "text/html"),
        (status = 400, description = "Malformed room id or action"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "QR generation failed")
    ),
    security(
        ("session_cookie" = [])
    ),
    tag = "QR"
)]
pub async fn room_action_qr(
    _auth: AuthTeacher,
    config: web::Data<Config>,
    path: web::Path<(i64, String)>,
) -> Result<HttpResponse, AppError> {
    let (room_id, action) = path.into_inner();
    let action = action
        .parse::<SignAction>()
        .map_err(|_| AppError::validation("Action must be 'in' or 'out'"))?;

    page(&config, room_id, Some(action))
}
