//! Activity log

use chrono::Utc;
use store::{Activity, Database, Store, User};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Activity repository
#[derive(Clone)]
pub struct ActivityRepository {
    store: Store,
}

impl ActivityRepository {
    /// Create a new activity repository
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append an activity for an existing user
    pub fn record(
        &self,
        user_id: Uuid,
        activity_type: &str,
        points_earned: i64,
        description: &str,
    ) -> ApiResult<Activity> {
        info!("Recording {} activity for user {}", activity_type, user_id);
        self.store
            .write(|db| append(db, user_id, activity_type, points_earned, description))
    }

    /// Add the points to the user's total and log the activity, as one step
    pub fn award(
        &self,
        user_id: Uuid,
        activity_type: &str,
        points_earned: i64,
        description: &str,
    ) -> ApiResult<(User, Activity)> {
        info!(
            "Awarding {} points to user {} for {}",
            points_earned, user_id, activity_type
        );
        self.store.write(|db| {
            if db.user(user_id).is_none() {
                return Err(ApiError::NotFound("User not found".to_string()));
            }
            let user = db.add_points(user_id, points_earned)?;
            let activity = append(db, user_id, activity_type, points_earned, description)?;
            Ok((user, activity))
        })
    }

    /// A user's activities, most recent first
    pub fn by_user(&self, user_id: Uuid, limit: usize) -> Vec<Activity> {
        info!("Listing activities for user {}", user_id);
        self.store.read(|db| {
            most_recent_first(db.activities().iter().filter(|a| a.user_id == user_id))
                .into_iter()
                .take(limit)
                .cloned()
                .collect()
        })
    }

    /// Global activity feed, most recent first
    pub fn all(&self, limit: usize, offset: usize) -> Vec<Activity> {
        info!("Listing activities (limit {}, offset {})", limit, offset);
        self.store.read(|db| {
            most_recent_first(db.activities().iter())
                .into_iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect()
        })
    }

    /// Remove every activity
    pub fn clear(&self) -> ApiResult<usize> {
        info!("Clearing all activities");
        Ok(self.store.write(|db| db.clear_activities())?)
    }
}

fn append(
    db: &mut Database,
    user_id: Uuid,
    activity_type: &str,
    points_earned: i64,
    description: &str,
) -> ApiResult<Activity> {
    if db.user(user_id).is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let activity = Activity {
        id: Uuid::new_v4(),
        user_id,
        activity_type: activity_type.to_string(),
        points_earned,
        description: description.to_string(),
        created_at: Utc::now(),
    };
    db.insert_activity(activity.clone())?;
    Ok(activity)
}

/// Newest first; among equal timestamps the later append wins
fn most_recent_first<'a>(activities: impl DoubleEndedIterator<Item = &'a Activity>) -> Vec<&'a Activity> {
    let mut sorted: Vec<&Activity> = activities.rev().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::DatabaseConfig;
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> (Store, ActivityRepository, Uuid, Uuid) {
        let store = Store::open(DatabaseConfig::new(dir.path().join("leaderboard.json"))).unwrap();
        let now = Utc::now();
        let mut ids = Vec::new();
        for name in ["alice", "bob"] {
            let user = User {
                id: Uuid::new_v4(),
                username: name.to_string(),
                email: format!("{}@example.com", name),
                credential_digest: String::new(),
                avatar_url: String::new(),
                points: 0,
                referral_code: name.to_uppercase(),
                referred_by: None,
                referrals_count: 0,
                waitlist_position: ids.len() as u64 + 1,
                joined_date: now,
                is_admin: false,
                created_at: now,
                updated_at: now,
            };
            ids.push(user.id);
            store.write(|db| db.insert_user(user)).unwrap();
        }
        (store.clone(), ActivityRepository::new(store), ids[0], ids[1])
    }

    #[test]
    fn test_record_requires_user() {
        let dir = TempDir::new().unwrap();
        let (_, repo, _, _) = setup(&dir);

        assert!(matches!(
            repo.record(Uuid::new_v4(), "bonus", 5, ""),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_award_updates_points_and_log() {
        let dir = TempDir::new().unwrap();
        let (store, repo, alice, _) = setup(&dir);

        let (user, activity) = repo.award(alice, "referral", 100, "Invited bob").unwrap();
        assert_eq!(user.points, 100);
        assert_eq!(activity.points_earned, 100);
        assert_eq!(store.read(|db| db.user(alice).unwrap().points), 100);
        assert_eq!(repo.by_user(alice, 10), vec![activity]);
    }

    #[test]
    fn test_feeds_are_most_recent_first() {
        let dir = TempDir::new().unwrap();
        let (_, repo, alice, bob) = setup(&dir);

        let first = repo.record(alice, "login", 1, "day 1").unwrap();
        let second = repo.record(bob, "login", 1, "day 1").unwrap();
        let third = repo.record(alice, "login", 1, "day 2").unwrap();

        let ids = |list: Vec<Activity>| list.into_iter().map(|a| a.id).collect::<Vec<_>>();

        assert_eq!(ids(repo.all(10, 0)), vec![third.id, second.id, first.id]);
        assert_eq!(ids(repo.all(1, 1)), vec![second.id]);
        assert_eq!(ids(repo.by_user(alice, 10)), vec![third.id, first.id]);
        assert_eq!(ids(repo.by_user(alice, 1)), vec![third.id]);
    }

    #[test]
    fn test_clear_keeps_users() {
        let dir = TempDir::new().unwrap();
        let (store, repo, alice, _) = setup(&dir);
        repo.award(alice, "bonus", 5, "").unwrap();

        assert_eq!(repo.clear().unwrap(), 1);
        assert!(repo.all(10, 0).is_empty());
        assert_eq!(store.read(|db| db.user(alice).unwrap().points), 5);
    }
}
