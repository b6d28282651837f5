//! Ranking and waitlist payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::User;
use uuid::Uuid;

use super::UserProfile;

/// Page query parameters (`page` is 1-based)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

impl PageRequest {
    /// Default and maximum page size
    pub const MAX_LIMIT: usize = 100;

    pub fn new(page: usize, limit: usize) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Page number, never below 1
    pub fn page(&self) -> usize {
        self.page.filter(|&page| page > 0).unwrap_or(1)
    }

    /// Page size, clamped to `1..=MAX_LIMIT`
    pub fn limit(&self) -> usize {
        self.limit
            .filter(|&limit| limit > 0)
            .unwrap_or(Self::MAX_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> usize {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total_users: usize,
    pub total_pages: usize,
}

impl Pagination {
    pub fn new(request: &PageRequest, total_users: usize) -> Self {
        let limit = request.limit();
        Self {
            page: request.page(),
            limit,
            total_users,
            total_pages: total_users.div_ceil(limit),
        }
    }
}

/// A user with a rank attached
#[derive(Debug, Clone, Serialize)]
pub struct RankedUser {
    pub rank: usize,
    #[serde(flatten)]
    pub user: UserProfile,
}

/// One page of the points leaderboard
#[derive(Debug, Serialize)]
pub struct LeaderboardPage {
    pub leaderboard: Vec<RankedUser>,
    pub pagination: Pagination,
}

/// A single user's competition rank
#[derive(Debug, Serialize)]
pub struct UserRank {
    pub user: UserProfile,
    pub rank: usize,
    pub points: i64,
    pub total_users: usize,
}

/// Window query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct WindowQuery {
    pub range: Option<usize>,
}

impl WindowQuery {
    pub const DEFAULT_RANGE: usize = 5;
    pub const MAX_RANGE: usize = 50;

    pub fn range(&self) -> usize {
        self.range.unwrap_or(Self::DEFAULT_RANGE).min(Self::MAX_RANGE)
    }
}

/// Leaderboard slice centred on one user
#[derive(Debug, Serialize)]
pub struct UserWindow {
    pub rankings: Vec<RankedUser>,
    pub user_rank: usize,
    pub total_users: usize,
}

/// One waitlist row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitlistEntry {
    pub position: u64,
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub points: i64,
    pub referrals_count: u64,
    pub joined_date: DateTime<Utc>,
}

impl From<&User> for WaitlistEntry {
    fn from(user: &User) -> Self {
        Self {
            position: user.waitlist_position,
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            points: user.points,
            referrals_count: user.referrals_count,
            joined_date: user.joined_date,
        }
    }
}

/// One page of the waitlist
#[derive(Debug, Serialize)]
pub struct WaitlistPage {
    pub waitlist: Vec<WaitlistEntry>,
    pub pagination: Pagination,
}

/// A user's place in the waitlist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaitlistStanding {
    pub position: u64,
    pub total_users: usize,
    pub positions_ahead: u64,
    /// Share of the waitlist behind this user, in percent with one decimal
    pub progress: f64,
}
