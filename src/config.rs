/// Fixed bonus credited to a referrer per successful referral, in whole
/// currency units.
pub const DEFAULT_REFERRAL_BONUS: i64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    /// Bearer token required by the admin reconciliation endpoint.
    pub admin_token: String,
    pub referral_bonus: i64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let admin_token = std::env::var("ADMIN_TOKEN")?;
        let referral_bonus = std::env::var("REFERRAL_BONUS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(DEFAULT_REFERRAL_BONUS);
        Ok(Self {
            database_url,
            admin_token,
            referral_bonus,
        })
    }
}
