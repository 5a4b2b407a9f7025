use serde::Serialize;

use super::repo::ReferralChild;

/// Dashboard view of a user's referrals. Display only; never corrects the
/// stored accumulator.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralStatsResponse {
    pub success: bool,
    pub total_referrals: i64,
    /// `bonus × totalReferrals`, computed from the children count.
    pub referral_earnings: i64,
    /// The stored accumulator, which may lag the computed value until the
    /// next reconciliation.
    pub total_earning: i64,
    pub referrals: Vec<ReferralChild>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub success: bool,
    pub message: String,
    pub updated_count: u64,
}
