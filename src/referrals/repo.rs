use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

/// One direct referral, as shown on the referrer's dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReferralChild {
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Stored versus computed earnings for one user, as seen by the
/// reconciliation pass.
#[derive(Debug, Clone, FromRow)]
pub struct EarningDrift {
    pub user_id: String,
    pub current_earning: i64,
    pub expected_earning: i64,
}

impl EarningDrift {
    pub fn is_drifted(&self) -> bool {
        self.current_earning != self.expected_earning
    }
}

/// Additive bonus credit to the referrer. Called best-effort after the signup
/// insert; not atomic with it.
pub async fn credit_bonus(db: &PgPool, referrer_user_id: &str, amount: i64) -> sqlx::Result<()> {
    let result = sqlx::query(
        "UPDATE users SET total_earning = total_earning + $1, updated_at = now() \
         WHERE user_id = $2",
    )
    .bind(amount)
    .bind(referrer_user_id)
    .execute(db)
    .await?;
    debug!(referrer = %referrer_user_id, amount, rows = result.rows_affected(), "bonus credited");
    Ok(())
}

/// Stored and expected earnings for every user, one row each, children
/// counted over the referral edge.
pub async fn earning_drift(db: &PgPool, bonus: i64) -> sqlx::Result<Vec<EarningDrift>> {
    sqlx::query_as::<_, EarningDrift>(
        r#"
        SELECT u.user_id,
               u.total_earning AS current_earning,
               (COUNT(r.id) * $1)::BIGINT AS expected_earning
        FROM users u
        LEFT JOIN users r ON r.referral_id = u.user_id
        GROUP BY u.user_id, u.total_earning
        "#,
    )
    .bind(bonus)
    .fetch_all(db)
    .await
}

/// Overwrite `total_earning` wherever it differs from `bonus × children`.
/// Idempotent; the authoritative correction for drift left behind by
/// best-effort crediting. A failure on one row is logged and does not abort
/// the batch. Returns the number of rows corrected.
pub async fn reconcile(db: &PgPool, bonus: i64) -> sqlx::Result<u64> {
    let rows = earning_drift(db, bonus).await?;
    let mut updated = 0u64;

    for row in rows.iter().filter(|r| r.is_drifted()) {
        info!(
            user_id = %row.user_id,
            current = row.current_earning,
            expected = row.expected_earning,
            "correcting earnings"
        );
        let result = sqlx::query(
            "UPDATE users SET total_earning = $1, updated_at = now() WHERE user_id = $2",
        )
        .bind(row.expected_earning)
        .bind(&row.user_id)
        .execute(db)
        .await;
        match result {
            Ok(_) => updated += 1,
            Err(e) => warn!(error = %e, user_id = %row.user_id, "row update failed, continuing"),
        }
    }

    info!(updated, total = rows.len(), "reconciliation complete");
    Ok(updated)
}

/// Direct children of a referrer, newest first.
pub async fn children_of(db: &PgPool, user_id: &str) -> sqlx::Result<Vec<ReferralChild>> {
    sqlx::query_as::<_, ReferralChild>(
        r#"
        SELECT user_id, full_name, email, mobile, created_at
        FROM users
        WHERE referral_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drift_detection() {
        let drifted = EarningDrift {
            user_id: "EP10001".into(),
            current_earning: 0,
            expected_earning: 30,
        };
        assert!(drifted.is_drifted());

        let settled = EarningDrift {
            user_id: "EP10002".into(),
            current_earning: 30,
            expected_earning: 30,
        };
        assert!(!settled.is_drifted());
    }
}
