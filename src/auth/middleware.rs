use crate::auth::auth::{AuthTeacher, session_token};
use crate::config::Config;
use crate::error::AppError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

/// Rejects the request with 401 before any handler runs unless it carries a
/// valid teacher session.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?
        .clone();

    let teacher = match session_token(req.request()) {
        Some(token) => AuthTeacher::from_token(&token, &config),
        None => Err(AppError::Unauthorized("Unauthorized".into())),
    };

    match teacher {
        Ok(teacher) => {
            tracing::debug!(teacher = %teacher.username, path = %req.path(), "Session accepted");
            req.extensions_mut().insert(teacher);
            next.call(req).await
        }
        Err(e) => {
            let resp = e.error_response();
            Ok(req.into_response(resp))
        }
    }
}
