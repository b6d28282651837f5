//! Leaderboard service models

pub mod activity;
pub mod leaderboard;
pub mod referral;
pub mod user;

// Re-export for convenience
pub use activity::{ActivityFeed, ActivityQuery, NewActivity, RecordedActivity};
pub use leaderboard::{
    LeaderboardPage, PageRequest, Pagination, RankedUser, UserRank, UserWindow, WaitlistEntry,
    WaitlistPage, WaitlistStanding, WindowQuery,
};
pub use referral::{
    LimitQuery, ReferralCode, ReferralDashboard, ReferralStats, ReferralValidation, ReferredUser,
    ReferrerSummary, TopReferrer, TopReferrers, ValidatedReferrer,
};
pub use user::{
    AuthResponse, LoginCredentials, NewUser, PromoteAdmin, RegisterQuery, UserList, UserProfile,
};
