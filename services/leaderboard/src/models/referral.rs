//! Referral payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::User;
use uuid::Uuid;

/// Limit-only query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    pub const MAX_LIMIT: usize = 100;

    /// Result size; absent or zero means the maximum
    pub fn limit(&self) -> usize {
        self.limit
            .filter(|&limit| limit > 0)
            .unwrap_or(Self::MAX_LIMIT)
            .min(Self::MAX_LIMIT)
    }
}

/// The user who referred someone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferrerSummary {
    pub username: String,
    pub referral_code: String,
}

/// Referral statistics for one user
#[derive(Debug, Serialize)]
pub struct ReferralStats {
    pub referral_code: String,
    pub referral_link: String,
    pub referrals_count: u64,
    pub referred_by: Option<String>,
    pub referrer: Option<ReferrerSummary>,
    pub waitlist_position: u64,
    pub joined_date: DateTime<Utc>,
    pub total_users: usize,
    pub position_ahead: u64,
    pub progress: f64,
}

/// Referrer details returned when a code checks out
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedReferrer {
    pub username: String,
    pub referrals_count: u64,
}

/// Referral code validation result
#[derive(Debug, Serialize)]
pub struct ReferralValidation {
    pub valid: bool,
    pub referrer: ValidatedReferrer,
}

/// Row of the top referrers table
#[derive(Debug, Clone, Serialize)]
pub struct TopReferrer {
    pub rank: usize,
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub referrals_count: u64,
    pub waitlist_position: u64,
    pub joined_date: DateTime<Utc>,
}

impl TopReferrer {
    pub fn new(rank: usize, user: &User) -> Self {
        Self {
            rank,
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            referrals_count: user.referrals_count,
            waitlist_position: user.waitlist_position,
            joined_date: user.joined_date,
        }
    }
}

/// Top referrers response
#[derive(Debug, Serialize)]
pub struct TopReferrers {
    pub top_referrers: Vec<TopReferrer>,
    pub total_users: usize,
}

/// A user who signed up through someone's code
#[derive(Debug, Clone, Serialize)]
pub struct ReferredUser {
    pub id: Uuid,
    pub username: String,
    pub status: String,
    pub joined_at: DateTime<Utc>,
}

impl From<&User> for ReferredUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            status: "active".to_string(),
            joined_at: user.joined_date,
        }
    }
}

/// Referral dashboard for the signed-in user
#[derive(Debug, Serialize)]
pub struct ReferralDashboard {
    pub total_referrals: usize,
    pub referral_code: String,
    pub referral_link: String,
    pub referrals: Vec<ReferredUser>,
}

/// A user's own referral code and share link
#[derive(Debug, Serialize)]
pub struct ReferralCode {
    pub referral_code: String,
    pub referral_link: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_zero_falls_back_to_maximum() {
        assert_eq!(LimitQuery { limit: Some(0) }.limit(), LimitQuery::MAX_LIMIT);
        assert_eq!(LimitQuery { limit: None }.limit(), LimitQuery::MAX_LIMIT);
        assert_eq!(LimitQuery { limit: Some(5) }.limit(), 5);
        assert_eq!(LimitQuery { limit: Some(500) }.limit(), LimitQuery::MAX_LIMIT);
    }
}
