use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::claims::Role;
use crate::auth::repo_types::{PasswordResetToken, User};

const USER_COLUMNS: &str =
    "id, name, email, phone_number, password_hash, role, is_active, created_at";

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Uniqueness pre-check for registration. Returns the first colliding row
    /// so the handler can tell the caller which field is taken.
    pub async fn find_by_email_or_phone(
        db: &PgPool,
        email: &str,
        phone_number: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR phone_number = $2"
        ))
        .bind(email)
        .bind(phone_number)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        phone_number: &str,
        password_hash: &str,
        role: Role,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, phone_number, password_hash, role) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(name)
        .bind(email)
        .bind(phone_number)
        .bind(password_hash)
        .bind(role)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

}

impl PasswordResetToken {
    /// Replaces any outstanding tokens for the user with a fresh one. The
    /// delete and insert run in one transaction so a concurrent reset attempt
    /// never sees both the stale and the new token as live.
    pub async fn replace_for_user(
        db: &PgPool,
        user_id: Uuid,
        token_hash: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<PasswordResetToken> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let token = sqlx::query_as::<_, PasswordResetToken>(
            "INSERT INTO password_reset_tokens (user_id, token_hash, expires_at) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, token_hash, expires_at, used, created_at",
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(token)
    }

    /// Looks up a redeemable token row: matching hash, unused, unexpired.
    pub async fn find_valid(
        db: &PgPool,
        token_hash: &str,
    ) -> anyhow::Result<Option<PasswordResetToken>> {
        let token = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT id, user_id, token_hash, expires_at, used, created_at \
             FROM password_reset_tokens \
             WHERE token_hash = $1 AND used = FALSE AND expires_at > now()",
        )
        .bind(token_hash)
        .fetch_optional(db)
        .await?;
        Ok(token)
    }

    /// Redeems the token: overwrites the user's password hash and burns the
    /// token row in one transaction, so a token can never stay live after
    /// the password it authorized has changed.
    pub async fn redeem(
        db: &PgPool,
        token_id: Uuid,
        user_id: Uuid,
        new_password_hash: &str,
    ) -> anyhow::Result<()> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(new_password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE password_reset_tokens SET used = TRUE WHERE id = $1")
            .bind(token_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
