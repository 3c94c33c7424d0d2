use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{models::User, utils::sql};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, user: &User) -> Result<User> {
        let user = sqlx::query_as::<_, User>(&sql(r#"
            INSERT INTO
                users (
                    id,
                    email,
                    password_hash,
                    name,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                email,
                password_hash,
                name,
                created_at,
                updated_at
        "#))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(r#"
            SELECT
                id,
                email,
                password_hash,
                name,
                created_at,
                updated_at
            FROM
                users
            WHERE
                email = ?
        "#))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&sql(r#"
            SELECT
                id,
                email,
                password_hash,
                name,
                created_at,
                updated_at
            FROM
                users
            WHERE
                id = ?
        "#))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(&sql(r#"
            SELECT
                COUNT(*)
            FROM
                users
            WHERE
                email = ?
        "#))
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        let updated_at = Utc::now();

        sqlx::query(&sql(r#"
            UPDATE users
            SET
                password_hash = ?,
                updated_at = ?
            WHERE
                id = ?
        "#))
        .bind(password_hash)
        .bind(updated_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
