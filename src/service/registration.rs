//! Caregiver and kid registration.
//!
//! A caregiver is keyed by contact number. Registering without a family code
//! creates a kid and hands back a fresh family code; registering with one
//! links the caregiver to the kid that already owns it.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::model::kid::Kid;
use crate::models::RegisterReq;

const FAMILY_CODE_BYTES: usize = 4;
const MAX_FAMILY_CODE_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Caregiver linked to an existing kid through its family code
    Linked { caregiver_id: i64, kid_id: i64 },
    /// New kid created under a new family code
    Registered {
        caregiver_id: i64,
        kid_id: i64,
        family_code: String,
    },
}

/// 8 lowercase hex characters from the OS random source.
pub fn generate_family_code() -> String {
    let mut bytes = [0u8; FAMILY_CODE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

enum Target<'a> {
    Existing { family_code: &'a str },
    New { kid_name: &'a str, room_id: i64 },
}

fn required(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn register(pool: &SqlitePool, req: &RegisterReq) -> AppResult<RegistrationOutcome> {
    let (Some(name), Some(contact)) = (
        required(&req.caregiver_name),
        required(&req.caregiver_contact),
    ) else {
        return Err(AppError::validation("Missing caregiver information"));
    };

    // Validate the new-kid branch before touching the database
    let target = match required(&req.family_code) {
        Some(code) => Target::Existing { family_code: code },
        None => Target::New {
            kid_name: required(&req.kid_name)
                .ok_or_else(|| AppError::validation("Missing kid name"))?,
            room_id: req
                .room_id
                .ok_or_else(|| AppError::validation("Missing room"))?,
        },
    };

    let mut tx = pool.begin().await?;
    let caregiver_id = upsert_caregiver(&mut tx, name, contact).await?;

    let outcome = match target {
        Target::Existing { family_code } => {
            let kid = sqlx::query_as::<_, Kid>(
                "SELECT id, name, family_code, room_id FROM kids WHERE family_code = ?",
            )
            .bind(family_code)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found("Family code not found"))?;

            link(&mut tx, kid.id, caregiver_id).await?;
            debug!(kid_id = kid.id, kid = %kid.name, "Linked caregiver to existing kid");
            RegistrationOutcome::Linked {
                caregiver_id,
                kid_id: kid.id,
            }
        }
        Target::New { kid_name, room_id } => {
            let room_exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = ?)")
                    .bind(room_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if !room_exists {
                return Err(AppError::not_found("Room not found"));
            }

            let (kid_id, family_code) = insert_kid(&mut tx, kid_name, room_id).await?;
            link(&mut tx, kid_id, caregiver_id).await?;
            RegistrationOutcome::Registered {
                caregiver_id,
                kid_id,
                family_code,
            }
        }
    };

    tx.commit().await?;
    info!(caregiver_id, outcome = ?outcome, "Registration stored");
    Ok(outcome)
}

async fn upsert_caregiver(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    contact: &str,
) -> AppResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO caregivers (name, contact_number) VALUES (?, ?)
        ON CONFLICT(contact_number) DO UPDATE SET name = excluded.name
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(contact)
    .fetch_one(&mut **tx)
    .await?;

    debug!(caregiver_id = id, "Caregiver upserted");
    Ok(id)
}

async fn insert_kid(
    tx: &mut Transaction<'_, Sqlite>,
    name: &str,
    room_id: i64,
) -> AppResult<(i64, String)> {
    for attempt in 1..=MAX_FAMILY_CODE_ATTEMPTS {
        let code = generate_family_code();

        let result = sqlx::query_scalar::<_, i64>(
            "INSERT INTO kids (name, family_code, room_id) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(&code)
        .bind(room_id)
        .fetch_one(&mut **tx)
        .await;

        match result {
            Ok(id) => return Ok((id, code)),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(attempt, "Family code collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Internal(
        "could not allocate a unique family code".into(),
    ))
}

async fn link(tx: &mut Transaction<'_, Sqlite>, kid_id: i64, caregiver_id: i64) -> AppResult<()> {
    sqlx::query("INSERT OR IGNORE INTO kid_caregiver (kid_id, caregiver_id) VALUES (?, ?)")
        .bind(kid_id)
        .bind(caregiver_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_test_db;

    fn new_kid(name: &str, contact: &str, kid: &str, room_id: i64) -> RegisterReq {
        RegisterReq {
            caregiver_name: Some(name.into()),
            caregiver_contact: Some(contact.into()),
            kid_name: Some(kid.into()),
            room_id: Some(room_id),
            family_code: None,
        }
    }

    fn link_req(name: &str, contact: &str, code: &str) -> RegisterReq {
        RegisterReq {
            caregiver_name: Some(name.into()),
            caregiver_contact: Some(contact.into()),
            family_code: Some(code.into()),
            ..Default::default()
        }
    }

    async fn count(pool: &SqlitePool, sql: &str) -> i64 {
        sqlx::query_scalar(sql).fetch_one(pool).await.unwrap()
    }

    #[test]
    fn family_code_is_eight_hex_chars() {
        let code = generate_family_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[actix_web::test]
    async fn new_registration_returns_family_code() {
        let (_dir, pool) = init_test_db().await;

        let outcome = register(&pool, &new_kid("Ann", "555-1000", "Bo", 2))
            .await
            .unwrap();

        let RegistrationOutcome::Registered {
            kid_id,
            family_code,
            ..
        } = outcome
        else {
            panic!("expected a new registration");
        };
        let (stored_code, room_id): (String, Option<i64>) =
            sqlx::query_as("SELECT family_code, room_id FROM kids WHERE id = ?")
                .bind(kid_id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(stored_code, family_code);
        assert_eq!(room_id, Some(2));
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM kid_caregiver").await, 1);
    }

    #[actix_web::test]
    async fn same_contact_updates_name_instead_of_duplicating() {
        let (_dir, pool) = init_test_db().await;

        register(&pool, &new_kid("Ann", "555-1000", "Bo", 2))
            .await
            .unwrap();
        register(&pool, &new_kid("Annie", "555-1000", "Cy", 1))
            .await
            .unwrap();

        assert_eq!(count(&pool, "SELECT COUNT(*) FROM caregivers").await, 1);
        let name: String =
            sqlx::query_scalar("SELECT name FROM caregivers WHERE contact_number = '555-1000'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(name, "Annie");
    }

    #[actix_web::test]
    async fn second_caregiver_links_by_family_code_idempotently() {
        let (_dir, pool) = init_test_db().await;

        let RegistrationOutcome::Registered {
            kid_id,
            family_code,
            ..
        } = register(&pool, &new_kid("Ann", "555-1000", "Bo", 2))
            .await
            .unwrap()
        else {
            panic!("expected a new registration");
        };

        for _ in 0..2 {
            let outcome = register(&pool, &link_req("Dan", "555-2000", &family_code))
                .await
                .unwrap();
            assert!(matches!(outcome, RegistrationOutcome::Linked { kid_id: k, .. } if k == kid_id));
        }

        assert_eq!(count(&pool, "SELECT COUNT(*) FROM kid_caregiver").await, 2);
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM kids").await, 1);
    }

    #[actix_web::test]
    async fn unknown_family_code_is_not_found_and_links_nothing() {
        let (_dir, pool) = init_test_db().await;

        let err = register(&pool, &link_req("Dan", "555-2000", "deadbeef"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM kid_caregiver").await, 0);
        // Whole registration rolled back, caregiver included
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM caregivers").await, 0);
    }

    #[actix_web::test]
    async fn missing_fields_are_validation_errors() {
        let (_dir, pool) = init_test_db().await;

        let mut req = new_kid("Ann", "  ", "Bo", 2);
        assert!(matches!(
            register(&pool, &req).await,
            Err(AppError::Validation(_))
        ));

        req = new_kid("Ann", "555-1000", "", 2);
        assert!(matches!(
            register(&pool, &req).await,
            Err(AppError::Validation(_))
        ));

        req = new_kid("Ann", "555-1000", "Bo", 2);
        req.room_id = None;
        assert!(matches!(
            register(&pool, &req).await,
            Err(AppError::Validation(_))
        ));
    }

    #[actix_web::test]
    async fn unknown_room_is_not_found() {
        let (_dir, pool) = init_test_db().await;

        let err = register(&pool, &new_kid("Ann", "555-1000", "Bo", 42))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(count(&pool, "SELECT COUNT(*) FROM kids").await, 0);
    }

    #[actix_web::test]
    async fn family_codes_stay_unique_over_many_registrations() {
        let (_dir, pool) = init_test_db().await;
        const KIDS: usize = 10_050;

        for i in 0..KIDS {
            register(&pool, &new_kid("Ann", "555-1000", &format!("Kid {i}"), 1))
                .await
                .unwrap();
        }

        assert_eq!(count(&pool, "SELECT COUNT(*) FROM kids").await, KIDS as i64);
        assert_eq!(
            count(&pool, "SELECT COUNT(DISTINCT family_code) FROM kids").await,
            KIDS as i64
        );
    }
}
