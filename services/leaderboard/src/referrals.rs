//! Referral ledger
//!
//! `referred_by` holds the referrer's code rather than their id; it is
//! resolved through the store's code index when a view needs it.

use store::{Database, User};
use uuid::Uuid;

/// Referral view of one user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerEntry<'a> {
    pub user: &'a User,
    /// The user whose code `user` signed up with, if it still resolves
    pub referrer: Option<&'a User>,
}

/// Canonical form of a referral code as typed by a person
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Referral view of `user_id`
pub fn stats(db: &Database, user_id: Uuid) -> Option<LedgerEntry<'_>> {
    let user = db.user(user_id)?;
    let referrer = user
        .referred_by
        .as_deref()
        .and_then(|code| db.user_by_referral_code(code));
    Some(LedgerEntry { user, referrer })
}

/// Users who signed up with `code`, most recent join first
pub fn referred_users<'a>(db: &'a Database, code: &str) -> Vec<&'a User> {
    let mut referred: Vec<&User> = db
        .users()
        .iter()
        .rev()
        .filter(|u| u.referred_by.as_deref() == Some(code))
        .collect();
    referred.sort_by(|a, b| b.joined_date.cmp(&a.joined_date));
    referred
}

/// Look up the owner of a code after normalising it
pub fn validate<'a>(db: &'a Database, code: &str) -> Option<&'a User> {
    db.user_by_referral_code(&normalize_code(code))
}

/// Users with at least one referral, most referrals first, earlier signups first on ties
pub fn top_referrers(users: &[User], limit: usize) -> Vec<&User> {
    let mut referrers: Vec<&User> = users.iter().filter(|u| u.referrals_count > 0).collect();
    referrers.sort_by(|a, b| {
        b.referrals_count
            .cmp(&a.referrals_count)
            .then(a.waitlist_position.cmp(&b.waitlist_position))
    });
    referrers.truncate(limit);
    referrers
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use store::DatabaseConfig;
    use tempfile::TempDir;

    fn user(name: &str, code: &str, position: u64) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{}@example.com", name),
            credential_digest: String::new(),
            avatar_url: String::new(),
            points: 0,
            referral_code: code.to_string(),
            referred_by: None,
            referrals_count: 0,
            waitlist_position: position,
            joined_date: now,
            is_admin: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn database(dir: &TempDir) -> Database {
        Database::open(DatabaseConfig::new(dir.path().join("leaderboard.json"))).unwrap()
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("  ab12cd34 "), "AB12CD34");
        assert_eq!(normalize_code("  not-a-code  "), "NOT-A-CODE");
    }

    #[test]
    fn test_stats_resolves_referrer() {
        let dir = TempDir::new().unwrap();
        let mut db = database(&dir);

        let carol = user("carol", "CAROL001", 1);
        let mut dave = user("dave", "DAVE0001", 2);
        dave.referred_by = Some("CAROL001".to_string());
        db.insert_user(carol.clone()).unwrap();
        db.insert_user(dave.clone()).unwrap();

        let entry = stats(&db, dave.id).unwrap();
        assert_eq!(entry.referrer.map(|r| r.id), Some(carol.id));

        let entry = stats(&db, carol.id).unwrap();
        assert!(entry.referrer.is_none());

        assert!(stats(&db, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_referred_users_newest_first() {
        let dir = TempDir::new().unwrap();
        let mut db = database(&dir);

        db.insert_user(user("carol", "CAROL001", 1)).unwrap();
        for (i, name) in ["dave", "erin", "frank"].iter().enumerate() {
            let mut referee = user(name, &format!("CODE000{}", i), i as u64 + 2);
            referee.referred_by = Some("CAROL001".to_string());
            referee.joined_date = Utc::now() + Duration::seconds(i as i64);
            db.insert_user(referee).unwrap();
        }
        db.insert_user(user("grace", "GRACE001", 5)).unwrap();

        let names: Vec<&str> = referred_users(&db, "CAROL001")
            .iter()
            .map(|u| u.username.as_str())
            .collect();
        assert_eq!(names, vec!["frank", "erin", "dave"]);
        assert!(referred_users(&db, "GRACE001").is_empty());
    }

    #[test]
    fn test_validate_is_case_insensitive() {
        let dir = TempDir::new().unwrap();
        let mut db = database(&dir);
        db.insert_user(user("carol", "CAROL001", 1)).unwrap();

        assert_eq!(validate(&db, " carol001 ").map(|u| u.username.as_str()), Some("carol"));
        assert!(validate(&db, "  not-a-code  ").is_none());
    }

    #[test]
    fn test_top_referrers_order() {
        let mut users = vec![
            user("a", "A0000001", 1),
            user("b", "B0000001", 2),
            user("c", "C0000001", 3),
            user("d", "D0000001", 4),
        ];
        users[0].referrals_count = 1;
        users[1].referrals_count = 3;
        users[2].referrals_count = 0;
        users[3].referrals_count = 3;

        let names: Vec<&str> = top_referrers(&users, 10)
            .iter()
            .map(|u| u.username.as_str())
            .collect();
        assert_eq!(names, vec!["b", "d", "a"]);

        assert_eq!(top_referrers(&users, 1).len(), 1);
    }
}
