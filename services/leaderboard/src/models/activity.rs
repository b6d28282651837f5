//! Activity payloads

use serde::{Deserialize, Serialize};
use store::Activity;

use super::UserProfile;

/// Point-earning event submitted by a client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActivity {
    pub activity_type: String,
    pub points_earned: i64,
    #[serde(default)]
    pub description: String,
}

/// Query parameters for activity feeds
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ActivityQuery {
    /// Default and maximum number of activities per page
    pub const MAX_LIMIT: usize = 100;

    pub fn limit(&self) -> usize {
        self.limit
            .filter(|&limit| limit > 0)
            .unwrap_or(Self::MAX_LIMIT)
            .min(Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }
}

/// Activity feed response
#[derive(Debug, Serialize)]
pub struct ActivityFeed {
    pub activities: Vec<Activity>,
}

/// Result of awarding points
#[derive(Debug, Serialize)]
pub struct RecordedActivity {
    pub activity: Activity,
    pub user: UserProfile,
}
