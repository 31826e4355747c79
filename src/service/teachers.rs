use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::model::teacher::TeacherSql;

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::Internal(format!("password hashing: {e}")))
}

fn require_credentials(username: &str, password: &str) -> AppResult<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(AppError::validation("Missing credentials"));
    }
    Ok(())
}

/// Teacher with matching credentials. Unknown user and wrong password are
/// indistinguishable to the caller.
pub async fn authenticate(pool: &SqlitePool, username: &str, password: &str) -> AppResult<TeacherSql> {
    require_credentials(username, password)?;

    let teacher = sqlx::query_as::<_, TeacherSql>(
        "SELECT id, username, password_hash FROM teachers WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(pool)
    .await?;

    let invalid = || AppError::Unauthorized("Invalid credentials".into());
    let teacher = match teacher {
        Some(t) => t,
        None => {
            debug!("Invalid credentials: teacher not found");
            return Err(invalid());
        }
    };

    if let Err(e) = verify_password(password, &teacher.password_hash) {
        debug!(error = %e, "Invalid credentials: password mismatch");
        return Err(invalid());
    }

    Ok(teacher)
}

pub async fn create_teacher(pool: &SqlitePool, username: &str, password: &str) -> AppResult<i64> {
    require_credentials(username, password)?;

    let result = sqlx::query_scalar::<_, i64>(
        "INSERT INTO teachers (username, password_hash) VALUES (?, ?) RETURNING id",
    )
    .bind(username.trim())
    .bind(hash(password)?)
    .fetch_one(pool)
    .await;

    match result {
        Ok(id) => {
            info!(username = username.trim(), "Teacher created");
            Ok(id)
        }
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            AppError::validation(format!("Teacher {} already exists", username.trim())),
        ),
        Err(e) => Err(e.into()),
    }
}

/// `false` if no such teacher
pub async fn update_password(pool: &SqlitePool, username: &str, password: &str) -> AppResult<bool> {
    require_credentials(username, password)?;

    let result = sqlx::query("UPDATE teachers SET password_hash = ? WHERE username = ?")
        .bind(hash(password)?)
        .bind(username.trim())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// `false` if no such teacher
pub async fn delete_teacher(pool: &SqlitePool, username: &str) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM teachers WHERE username = ?")
        .bind(username.trim())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
