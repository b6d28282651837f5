//! User registry

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use store::{Database, Store, User};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::NewUser,
    password::CredentialHasher,
    referrals,
};

/// Characters a referral code is drawn from
const REFERRAL_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const REFERRAL_CODE_LENGTH: usize = 8;
/// Fresh codes tried before registration gives up
const MAX_REFERRAL_CODE_ATTEMPTS: usize = 16;

/// Generate a random 8-character `[A-Z0-9]` referral code
pub fn generate_referral_code(rng: &mut impl Rng) -> String {
    (0..REFERRAL_CODE_LENGTH)
        .map(|_| REFERRAL_CODE_CHARSET[rng.gen_range(0..REFERRAL_CODE_CHARSET.len())] as char)
        .collect()
}

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    store: Store,
    hasher: Arc<dyn CredentialHasher>,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(store: Store, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { store, hasher }
    }

    /// Create a new user
    ///
    /// The duplicate checks, the insert and the referrer's counter update
    /// all happen under one store lock.
    pub fn create(&self, new_user: &NewUser) -> ApiResult<User> {
        info!("Creating new user: {}", new_user.username);

        let credential_digest = self.hasher.hash(&new_user.password).map_err(|e| {
            tracing::error!("Failed to hash password: {}", e);
            ApiError::InternalServerError
        })?;

        let referrer_code = new_user
            .referral_code
            .as_deref()
            .map(referrals::normalize_code)
            .filter(|code| !code.is_empty());

        self.store.write(|db| {
            if db.user_by_email(&new_user.email).is_some() {
                return Err(ApiError::Conflict("Email already registered".to_string()));
            }
            if db.user_by_username(&new_user.username).is_some() {
                return Err(ApiError::Conflict("Username already taken".to_string()));
            }

            let referral_code = unused_referral_code(db)?;

            let referrer_id = match referrer_code.as_deref() {
                Some(code) => {
                    let referrer = db.user_by_referral_code(code).map(|u| u.id);
                    if referrer.is_none() {
                        warn!("Ignoring unknown referral code {} for {}", code, new_user.username);
                    }
                    referrer
                }
                None => None,
            };

            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4(),
                username: new_user.username.clone(),
                email: new_user.email.clone(),
                credential_digest,
                avatar_url: new_user.avatar_url.clone().unwrap_or_default(),
                points: 0,
                referral_code,
                referred_by: referrer_id.and(referrer_code.clone()),
                referrals_count: 0,
                waitlist_position: db.next_waitlist_position(),
                joined_date: now,
                is_admin: false,
                created_at: now,
                updated_at: now,
            };

            db.insert_user(user.clone())?;

            if let Some(referrer_id) = referrer_id {
                let referrer = db.increment_referrals(referrer_id)?;
                info!(
                    "User {} referred by {} ({} referrals)",
                    user.username, referrer.username, referrer.referrals_count
                );
            }

            Ok(user)
        })
    }

    /// Find a user by ID
    pub fn find_by_id(&self, id: Uuid) -> Option<User> {
        info!("Finding user by ID: {}", id);
        self.store.read(|db| db.user(id).cloned())
    }

    /// Find a user by email
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        info!("Finding user by email: {}", email);
        self.store.read(|db| db.user_by_email(email).cloned())
    }

    /// Find a user by username
    pub fn find_by_username(&self, username: &str) -> Option<User> {
        info!("Finding user by username: {}", username);
        self.store.read(|db| db.user_by_username(username).cloned())
    }

    /// Find a user by exact referral code
    pub fn find_by_referral_code(&self, code: &str) -> Option<User> {
        info!("Finding user by referral code: {}", code);
        self.store.read(|db| db.user_by_referral_code(code).cloned())
    }

    pub fn total_count(&self) -> usize {
        self.store.read(|db| db.user_count())
    }

    /// Add `delta` to a user's points. Negative deltas are applied as given.
    pub fn add_points(&self, id: Uuid, delta: i64) -> ApiResult<User> {
        info!("Adding {} points to user {}", delta, id);
        Ok(self.store.write(|db| db.add_points(id, delta))?)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> ApiResult<bool> {
        self.hasher
            .verify(password, &user.credential_digest)
            .map_err(|e| {
                tracing::error!("Failed to verify password for {}: {}", user.id, e);
                ApiError::InternalServerError
            })
    }

    /// Grant admin rights to the user with `email`
    pub fn promote_admin(&self, email: &str) -> ApiResult<User> {
        info!("Promoting {} to admin", email);
        self.store.write(|db| {
            let id = db
                .user_by_email(email)
                .map(|u| u.id)
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
            Ok(db.set_admin(id, true)?)
        })
    }

    /// Remove every user and activity
    pub fn clear_all(&self) -> ApiResult<usize> {
        info!("Clearing all users");
        Ok(self.store.write(|db| db.clear_users())?)
    }
}

/// A fresh referral code that no user holds yet
fn unused_referral_code(db: &Database) -> ApiResult<String> {
    let mut rng = rand::thread_rng();
    for _ in 0..MAX_REFERRAL_CODE_ATTEMPTS {
        let code = generate_referral_code(&mut rng);
        if db.user_by_referral_code(&code).is_none() {
            return Ok(code);
        }
    }
    Err(ApiError::Conflict(
        "Could not allocate a unique referral code".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::PlainHasher;
    use rand::{SeedableRng, rngs::StdRng};
    use store::DatabaseConfig;
    use tempfile::TempDir;

    fn repository(dir: &TempDir) -> UserRepository {
        let store = Store::open(DatabaseConfig::new(dir.path().join("leaderboard.json"))).unwrap();
        UserRepository::new(store, Arc::new(PlainHasher))
    }

    fn new_user(name: &str, referral_code: Option<&str>) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            password: "password123".to_string(),
            avatar_url: None,
            referral_code: referral_code.map(str::to_string),
        }
    }

    #[test]
    fn test_generate_referral_code_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let code = generate_referral_code(&mut rng);
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_create_initialises_user() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        let user = repo.create(&new_user("alice", None)).unwrap();
        assert_eq!(user.points, 0);
        assert_eq!(user.referrals_count, 0);
        assert_eq!(user.waitlist_position, 1);
        assert!(!user.is_admin);
        assert!(user.referred_by.is_none());
        assert_eq!(user.credential_digest, "plain$password123");
        assert_eq!(repo.find_by_id(user.id), Some(user.clone()));
        assert_eq!(repo.find_by_email("alice@example.com"), Some(user.clone()));
        assert_eq!(repo.find_by_username("alice"), Some(user.clone()));
        assert_eq!(repo.find_by_referral_code(&user.referral_code), Some(user));
        assert_eq!(repo.total_count(), 1);
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);
        repo.create(&new_user("alice", None)).unwrap();

        let mut same_email = new_user("alice2", None);
        same_email.email = "alice@example.com".to_string();
        assert!(matches!(
            repo.create(&same_email),
            Err(ApiError::Conflict(ref m)) if m == "Email already registered"
        ));

        let mut same_name = new_user("alice", None);
        same_name.email = "other@example.com".to_string();
        assert!(matches!(
            repo.create(&same_name),
            Err(ApiError::Conflict(ref m)) if m == "Username already taken"
        ));
        assert_eq!(repo.total_count(), 1);
    }

    #[test]
    fn test_waitlist_positions_are_sequential() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        let positions: Vec<u64> = (0..12)
            .map(|i| {
                repo.create(&new_user(&format!("user{}", i), None))
                    .unwrap()
                    .waitlist_position
            })
            .collect();
        assert_eq!(positions, (1..=12).collect::<Vec<u64>>());
    }

    #[test]
    fn test_referral_links_referee_to_referrer() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        let carol = repo.create(&new_user("carol", None)).unwrap();
        let lowercase = carol.referral_code.to_lowercase();
        let dave = repo.create(&new_user("dave", Some(&lowercase))).unwrap();

        assert_eq!(dave.referred_by.as_deref(), Some(carol.referral_code.as_str()));
        assert_eq!(repo.find_by_id(carol.id).unwrap().referrals_count, 1);
    }

    #[test]
    fn test_unknown_referral_code_is_ignored() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        let erin = repo.create(&new_user("erin", Some("NOPE0000"))).unwrap();
        assert!(erin.referred_by.is_none());
    }

    #[test]
    fn test_referral_counts_match_links() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);

        let mut codes: Vec<String> = Vec::new();
        for i in 0..20 {
            let referrer = (i % 3 != 0).then(|| codes[i * 7 % codes.len()].clone());
            let user = repo
                .create(&new_user(&format!("user{}", i), referrer.as_deref()))
                .unwrap();
            codes.push(user.referral_code);
        }

        repo.store.read(|db| {
            for user in db.users() {
                let actual = db
                    .users()
                    .iter()
                    .filter(|v| v.referred_by.as_deref() == Some(user.referral_code.as_str()))
                    .count() as u64;
                assert_eq!(user.referrals_count, actual);
            }
        });
    }

    #[test]
    fn test_add_points_and_promote_admin() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);
        let alice = repo.create(&new_user("alice", None)).unwrap();

        assert_eq!(repo.add_points(alice.id, 40).unwrap().points, 40);
        assert!(matches!(
            repo.add_points(Uuid::new_v4(), 1),
            Err(ApiError::NotFound(_))
        ));

        assert!(repo.promote_admin("alice@example.com").unwrap().is_admin);
        assert!(matches!(
            repo.promote_admin("nobody@example.com"),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_verify_password() {
        let dir = TempDir::new().unwrap();
        let repo = repository(&dir);
        let alice = repo.create(&new_user("alice", None)).unwrap();

        assert!(repo.verify_password(&alice, "password123").unwrap());
        assert!(!repo.verify_password(&alice, "password124").unwrap());
    }
}
