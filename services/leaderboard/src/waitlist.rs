//! Waitlist ordering and standing

use store::{Database, User};
use uuid::Uuid;

/// A user's stored waitlist position and the current user count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub position: u64,
    pub total_users: usize,
}

impl Standing {
    /// Users ahead of this one in the queue
    pub fn positions_ahead(&self) -> u64 {
        self.position.saturating_sub(1)
    }

    pub fn progress(&self) -> f64 {
        progress(self.position, self.total_users)
    }
}

/// Users ordered by their stored waitlist position
pub fn by_position(users: &[User]) -> Vec<&User> {
    let mut sorted: Vec<&User> = users.iter().collect();
    sorted.sort_by_key(|u| u.waitlist_position);
    sorted
}

/// `[offset, offset + limit)` of the waitlist
pub fn page(users: &[User], limit: usize, offset: usize) -> Vec<&User> {
    by_position(users).into_iter().skip(offset).take(limit).collect()
}

/// Waitlist standing of one user
pub fn standing(db: &Database, user_id: Uuid) -> Option<Standing> {
    db.user(user_id).map(|user| Standing {
        position: user.waitlist_position,
        total_users: db.user_count(),
    })
}

/// `(total - position) / total * 100`, rounded to one decimal.
///
/// Zero when there are no users. Never negative: positions are not reused
/// after a bulk clear, so a position can exceed the current user count.
pub fn progress(position: u64, total_users: usize) -> f64 {
    if total_users == 0 {
        return 0.0;
    }

    let total = total_users as f64;
    let behind = (total - position as f64).max(0.0);
    (behind / total * 1000.0).round() / 10.0
}
