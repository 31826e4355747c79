use crate::{
    api::{attendance, kids, qr, register, rooms, sign},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

/// Malformed bodies, query strings and path segments are client errors.
fn extractor_configs(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid request body: {err}")).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid query string: {err}")).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::validation(format!("Invalid path: {err}")).into()
    }));
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    extractor_configs(cfg);

    // Caregiver-facing routes
    cfg.service(web::resource("/rooms").route(web::get().to(rooms::list_rooms)))
        .service(
            web::resource("/register")
                .wrap(build_limiter(config.rate_register_per_min))
                .route(web::post().to(register::register)),
        )
        .service(web::resource("/kids").route(web::get().to(kids::list_kids)))
        .service(web::resource("/kids-for-room").route(web::get().to(kids::kids_for_room)))
        .service(
            web::resource("/sign")
                .wrap(build_limiter(config.rate_sign_per_min))
                .route(web::post().to(sign::sign)),
        );

    // Teacher session
    cfg.service(
        web::scope("/teacher")
            .service(
                web::resource("/login")
                    .wrap(build_limiter(config.rate_login_per_min))
                    .route(web::post().to(handlers::login)),
            )
            .service(web::resource("/logout").route(web::post().to(handlers::logout))),
    );

    // Teacher-only routes
    cfg.service(
        web::scope("/attendance")
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(build_limiter(config.rate_teacher_per_min)) // rate limiting
            // /attendance
            .service(web::resource("").route(web::get().to(attendance::attendance_snapshot)))
            // /attendance/{room_id}
            .service(
                web::resource("/{room_id}").route(web::get().to(attendance::room_attendance)),
            ),
    )
    .service(
        web::scope("/qr")
            .wrap(from_fn(auth_middleware))
            .wrap(build_limiter(config.rate_teacher_per_min))
            // /qr/{room_id}
            .service(web::resource("/{room_id}").route(web::get().to(qr::room_qr)))
            // /qr/{room_id}/{action}
            .service(
                web::resource("/{room_id}/{action}").route(web::get().to(qr::room_action_qr)),
            ),
    );
}

// CAREGIVER
//  ├─ POST /register  -> family_code
//  └─ POST /sign      -> appends sign events

// TEACHER
//  ├─ POST /teacher/login   -> session cookie (signed token)
//  └─ GET  /attendance, /qr -> 401 without a valid session
