use sqlx::FromRow;

#[derive(FromRow)]
pub struct TeacherSql {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}
