use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub session_secret: String,
    pub session_ttl: usize,
    pub cookie_secure: bool,

    /// Prefix of the URLs encoded into room QR codes
    pub public_base_url: String,

    pub seed_teacher_username: String,
    pub seed_teacher_password: Option<String>,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_sign_per_min: u32,
    pub rate_teacher_per_min: u32,

    pub log_dir: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    var_or(key, default)
        .parse()
        .with_context(|| format!("{key} is not a valid value"))
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:3000"),
            database_url: var_or("DATABASE_URL", "sqlite:sunday_school.db"),
            session_secret: env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?,
            session_ttl: parse_or("SESSION_TTL", "43200")?, // default 12 hours
            cookie_secure: parse_or("COOKIE_SECURE", "false")?,

            public_base_url: var_or("PUBLIC_BASE_URL", "http://localhost:3000"),

            seed_teacher_username: var_or("SEED_TEACHER_USERNAME", "teacher"),
            seed_teacher_password: env::var("SEED_TEACHER_PASSWORD")
                .ok()
                .filter(|p| !p.is_empty()),

            rate_login_per_min: parse_or("RATE_LOGIN_PER_MIN", "30")?,
            rate_register_per_min: parse_or("RATE_REGISTER_PER_MIN", "30")?,
            rate_sign_per_min: parse_or("RATE_SIGN_PER_MIN", "120")?,
            rate_teacher_per_min: parse_or("RATE_TEACHER_PER_MIN", "600")?,

            log_dir: var_or("LOG_DIR", "logs"),
        })
    }

    /// Config for tests and tools that never read the environment
    pub fn for_tests(database_url: &str) -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            database_url: database_url.to_string(),
            session_secret: "test-session-secret".to_string(),
            session_ttl: 3600,
            cookie_secure: false,
            public_base_url: "http://checkin.test".to_string(),
            seed_teacher_username: "teacher".to_string(),
            seed_teacher_password: Some("teacherpass".to_string()),
            rate_login_per_min: 1000,
            rate_register_per_min: 1000,
            rate_sign_per_min: 1000,
            rate_teacher_per_min: 1000,
            log_dir: "logs".to_string(),
        }
    }
}
