use sqlx::PgPool;
use time::OffsetDateTime;

use crate::auth::repo_types::{ResetLink, User};

// Soft-deleted users are filtered out of every lookup; to the rest of the
// service a deleted row does not exist until restore flips the flag back.

impl User {
    pub async fn insert(
        db: &PgPool,
        full_name: &str,
        passhash: &str,
        phone: &str,
        email: &str,
        user_role: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (full_name, passhash, phone, email, user_role)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(full_name)
        .bind(passhash)
        .bind(phone)
        .bind(email)
        .bind(user_role)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn by_email(db: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, passhash, phone, email, user_role, deleted
            FROM users
            WHERE email = $1 AND deleted = FALSE
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn by_phone(db: &PgPool, phone: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, passhash, phone, email, user_role, deleted
            FROM users
            WHERE phone = $1 AND deleted = FALSE
            "#,
        )
        .bind(phone)
        .fetch_optional(db)
        .await
    }

    pub async fn by_id(db: &PgPool, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, full_name, passhash, phone, email, user_role, deleted
            FROM users
            WHERE id = $1 AND deleted = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn update_password(
        db: &PgPool,
        user_id: i64,
        passhash: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(r#"UPDATE users SET passhash = $1 WHERE id = $2"#)
            .bind(passhash)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_profile(
        db: &PgPool,
        full_name: &str,
        phone: &str,
        email: &str,
        user_id: i64,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE users SET full_name = $1, phone = $2, email = $3 WHERE id = $4"#,
        )
        .bind(full_name)
        .bind(phone)
        .bind(email)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn set_deleted(db: &PgPool, user_id: i64, deleted: bool) -> Result<(), sqlx::Error> {
        sqlx::query(r#"UPDATE users SET deleted = $1 WHERE id = $2"#)
            .bind(deleted)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(())
    }
}

impl ResetLink {
    pub async fn insert(
        db: &PgPool,
        link: &str,
        user_id: i64,
        expiration: OffsetDateTime,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO forget_password_info (link, user_id, expiration)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(link)
        .bind(user_id)
        .bind(expiration)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn by_link(db: &PgPool, link: &str) -> Result<Option<ResetLink>, sqlx::Error> {
        sqlx::query_as::<_, ResetLink>(
            r#"
            SELECT id, link, user_id, expiration
            FROM forget_password_info
            WHERE link = $1
            "#,
        )
        .bind(link)
        .fetch_optional(db)
        .await
    }

    pub async fn delete_by_id(db: &PgPool, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(r#"DELETE FROM forget_password_info WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}
