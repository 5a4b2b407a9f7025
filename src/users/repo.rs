use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User record in the database. The sole entity of the system.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    /// Short public identifier, `EP` + 5 digits, fixed at signup.
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Another user's user_id, validated at write time; no foreign key.
    pub referral_id: Option<String>,
    /// Whole currency units; reconciled against the direct-children count.
    pub total_earning: i64,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl User {
    /// Find a user by public user id.
    pub async fn find_by_user_id(db: &PgPool, user_id: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, user_id, full_name, email, mobile, password_hash,
                   referral_id, total_earning, status, created_at, updated_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Login lookup: the identifier may be a user id, an email, or a mobile
    /// number. All three are globally unique, so at most one row matches.
    pub async fn find_by_identifier(db: &PgPool, identifier: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, user_id, full_name, email, mobile, password_hash,
                   referral_id, total_earning, status, created_at, updated_at
            FROM users
            WHERE user_id = $1 OR email = $1 OR mobile = $1
            "#,
        )
        .bind(identifier)
        .fetch_optional(db)
        .await
    }

    pub async fn email_exists(db: &PgPool, email: &str) -> sqlx::Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(db)
            .await
    }

    pub async fn mobile_exists(db: &PgPool, mobile: &str) -> sqlx::Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE mobile = $1)")
            .bind(mobile)
            .fetch_one(db)
            .await
    }

    pub async fn user_id_exists(db: &PgPool, user_id: &str) -> sqlx::Result<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE user_id = $1)")
            .bind(user_id)
            .fetch_one(db)
            .await
    }

    /// Insert a new user. `total_earning` starts at zero; the referral bonus
    /// is credited to the referrer in a separate step.
    pub async fn create(
        db: &PgPool,
        user_id: &str,
        full_name: &str,
        email: &str,
        mobile: &str,
        password_hash: &str,
        referral_id: Option<&str>,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, full_name, email, mobile, password_hash, referral_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, full_name, email, mobile, password_hash,
                      referral_id, total_earning, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(email)
        .bind(mobile)
        .bind(password_hash)
        .bind(referral_id)
        .fetch_one(db)
        .await
    }

    /// Update mutable profile fields. Uniqueness of the new email/mobile
    /// against other rows is checked by the caller; the unique constraints
    /// still backstop a race.
    pub async fn update_profile(
        db: &PgPool,
        user_id: &str,
        full_name: &str,
        email: &str,
        mobile: &str,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = $2, email = $3, mobile = $4, updated_at = now()
            WHERE user_id = $1
            RETURNING id, user_id, full_name, email, mobile, password_hash,
                      referral_id, total_earning, status, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(full_name)
        .bind(email)
        .bind(mobile)
        .fetch_optional(db)
        .await
    }

    /// True when another row (not `user_id`) already holds this email.
    pub async fn email_taken_by_other(
        db: &PgPool,
        email: &str,
        user_id: &str,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND user_id <> $2)",
        )
        .bind(email)
        .bind(user_id)
        .fetch_one(db)
        .await
    }

    /// True when another row (not `user_id`) already holds this mobile.
    pub async fn mobile_taken_by_other(
        db: &PgPool,
        mobile: &str,
        user_id: &str,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE mobile = $1 AND user_id <> $2)",
        )
        .bind(mobile)
        .bind(user_id)
        .fetch_one(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_user() -> User {
        User {
            id: 1,
            user_id: "EP12345".into(),
            full_name: "Jane Doe".into(),
            email: "jane@x.com".into(),
            mobile: "9876543210".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            referral_id: None,
            total_earning: 0,
            status: "active".into(),
            created_at: datetime!(2026-01-01 00:00:00 UTC),
            updated_at: datetime!(2026-01-01 00:00:00 UTC),
        }
    }

    #[test]
    fn password_hash_never_serialized() {
        let json = serde_json::to_string(&sample_user()).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn wire_fields_are_camel_case() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert_eq!(json["userId"], "EP12345");
        assert_eq!(json["fullName"], "Jane Doe");
        assert_eq!(json["totalEarning"], 0);
        assert!(json["referralId"].is_null());
        assert!(json.get("user_id").is_none());
    }
}
