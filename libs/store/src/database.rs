//! Document store with in-memory indexes
//!
//! This module provides the [`Database`], which owns the document, its
//! lookup indexes and the journal, and the [`Store`] handle that shares one
//! database between the components of the service.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::document::{Activity, Document, RankingCache, User};
use crate::error::{StoreError, StoreResult};
use crate::journal::{self, Journal, JournalEntry, Replay};

/// Number of journal records between snapshots (default: 256)
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 256;

/// What to do when the durable image cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryMode {
    /// Refuse to open
    #[default]
    Strict,
    /// Move the unreadable file aside and start empty
    Reset,
}

impl FromStr for RecoveryMode {
    type Err = StoreError;

    fn from_str(s: &str) -> StoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(RecoveryMode::Strict),
            "reset" => Ok(RecoveryMode::Reset),
            other => Err(StoreError::Configuration(format!(
                "Unknown recovery mode: {}",
                other
            ))),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path of the JSON snapshot
    pub path: PathBuf,
    /// Journal records written before the snapshot is rewritten
    pub checkpoint_interval: usize,
    /// Behaviour on an unreadable snapshot or journal
    pub recovery_mode: RecoveryMode,
}

impl DatabaseConfig {
    /// Configuration with defaults for the given snapshot path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            recovery_mode: RecoveryMode::Strict,
        }
    }

    /// Create a new DatabaseConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DATABASE_PATH`: Snapshot file path (default: "./leaderboard.json")
    /// - `DATABASE_CHECKPOINT_INTERVAL`: Journal records per snapshot (default: 256)
    /// - `DATABASE_RECOVERY_MODE`: `strict` or `reset` (default: strict)
    pub fn from_env() -> StoreResult<Self> {
        let path = std::env::var("DATABASE_PATH")
            .unwrap_or_else(|_| "./leaderboard.json".to_string());

        let checkpoint_interval = std::env::var("DATABASE_CHECKPOINT_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_CHECKPOINT_INTERVAL);

        let recovery_mode = match std::env::var("DATABASE_RECOVERY_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => RecoveryMode::Strict,
        };

        Ok(Self {
            path: PathBuf::from(path),
            checkpoint_interval,
            recovery_mode,
        })
    }

    /// Path of the journal that sits next to the snapshot
    pub fn journal_path(&self) -> PathBuf {
        sibling(&self.path, ".journal")
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Lookup tables from each unique key to the user's slot in the document
#[derive(Debug, Default)]
struct Indexes {
    by_id: HashMap<Uuid, usize>,
    by_email: HashMap<String, usize>,
    by_username: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl Indexes {
    fn build(users: &[User]) -> Result<Self, String> {
        let mut indexes = Self::default();
        for (slot, user) in users.iter().enumerate() {
            if let Some(key) = indexes.collision(user) {
                return Err(format!("duplicate {} for user {}", key, user.id));
            }
            indexes.insert(user, slot);
        }
        Ok(indexes)
    }

    fn collision(&self, user: &User) -> Option<&'static str> {
        if self.by_id.contains_key(&user.id) {
            Some("id")
        } else if self.by_email.contains_key(&user.email) {
            Some("email")
        } else if self.by_username.contains_key(&user.username) {
            Some("username")
        } else if self.by_code.contains_key(&user.referral_code) {
            Some("referral code")
        } else {
            None
        }
    }

    fn insert(&mut self, user: &User, slot: usize) {
        self.by_id.insert(user.id, slot);
        self.by_email.insert(user.email.clone(), slot);
        self.by_username.insert(user.username.clone(), slot);
        self.by_code.insert(user.referral_code.clone(), slot);
    }
}

/// The document store
#[derive(Debug)]
pub struct Database {
    config: DatabaseConfig,
    document: Document,
    indexes: Indexes,
    journal: Journal,
    pending: usize,
}

impl Database {
    /// Open the store, replaying any journal records newer than the snapshot
    pub fn open(config: DatabaseConfig) -> StoreResult<Self> {
        info!("Opening document store at {}", config.path.display());

        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = load_snapshot(&config)?;

        let journal_path = config.journal_path();
        let replay = if snapshot.quarantined {
            // Journal records build on the snapshot that was just moved aside
            set_aside(&journal_path)?;
            Replay::default()
        } else {
            match journal::read_records(&journal_path) {
                Ok(replay) => replay,
                Err(StoreError::Corruption { path, reason }) => {
                    recover(&config, &path, &reason)?;
                    Replay::default()
                }
                Err(e) => return Err(e),
            }
        };

        let mut db = Database {
            journal: Journal::open(&journal_path)?,
            config,
            document: snapshot.document,
            indexes: snapshot.indexes,
            pending: 0,
        };

        let folded = snapshot.quarantined
            || snapshot.repaired
            || !replay.records.is_empty()
            || replay.torn_tail;
        let mut replayed = 0;
        for record in replay.records {
            if record.seq <= db.document.sequence {
                continue;
            }
            if let Err(e) = db.check(&record.entry) {
                let reason = format!("record {}: {}", record.seq, e);
                recover(&db.config, &journal_path, &reason)?;
                // Keep the consistent prefix and start a fresh journal
                db.journal = Journal::open(&journal_path)?;
                break;
            }
            db.apply(record.entry);
            db.document.sequence = record.seq;
            replayed += 1;
        }

        if replayed > 0 {
            info!("Replayed {} journal records", replayed);
        }

        db.reconcile_referral_counts()?;

        if folded {
            db.checkpoint()?;
        }

        info!(
            "Document store ready with {} users and {} activities",
            db.document.users.len(),
            db.document.activities.len()
        );

        Ok(db)
    }

    /// All users in insertion order
    pub fn users(&self) -> &[User] {
        &self.document.users
    }

    /// All activities in insertion order
    pub fn activities(&self) -> &[Activity] {
        &self.document.activities
    }

    pub fn ranking_cache(&self) -> &RankingCache {
        &self.document.cache
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Find a user by ID
    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.slot(self.indexes.by_id.get(&id))
    }

    /// Find a user by email
    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.slot(self.indexes.by_email.get(email))
    }

    /// Find a user by username
    pub fn user_by_username(&self, username: &str) -> Option<&User> {
        self.slot(self.indexes.by_username.get(username))
    }

    /// Find a user by referral code (exact match)
    pub fn user_by_referral_code(&self, code: &str) -> Option<&User> {
        self.slot(self.indexes.by_code.get(code))
    }

    fn slot(&self, slot: Option<&usize>) -> Option<&User> {
        slot.and_then(|&slot| self.document.users.get(slot))
    }

    pub fn user_count(&self) -> usize {
        self.document.users.len()
    }

    /// Waitlist position for the next user.
    ///
    /// Positions are never handed out twice, even after a bulk clear.
    pub fn next_waitlist_position(&self) -> u64 {
        let highest_present = self
            .document
            .users
            .iter()
            .map(|u| u.waitlist_position)
            .max()
            .unwrap_or(0);
        highest_present.max(self.document.waitlist_high_water) + 1
    }

    /// Insert a new user
    pub fn insert_user(&mut self, user: User) -> StoreResult<()> {
        debug!("Inserting user {}", user.id);
        self.commit(JournalEntry::InsertUser { user })
    }

    /// Add `delta` to a user's points
    pub fn add_points(&mut self, id: Uuid, delta: i64) -> StoreResult<User> {
        self.update_user(id, |user| {
            user.points = user.points.saturating_add(delta);
        })
    }

    /// Increment a user's referral counter by one
    pub fn increment_referrals(&mut self, id: Uuid) -> StoreResult<User> {
        self.update_user(id, |user| {
            user.referrals_count += 1;
        })
    }

    /// Set or clear the admin flag
    pub fn set_admin(&mut self, id: Uuid, is_admin: bool) -> StoreResult<User> {
        self.update_user(id, |user| {
            user.is_admin = is_admin;
        })
    }

    fn update_user(&mut self, id: Uuid, change: impl FnOnce(&mut User)) -> StoreResult<User> {
        let mut user = self
            .user(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {}", id)))?;

        change(&mut user);
        user.updated_at = Utc::now();

        self.commit(JournalEntry::UpdateUser { user: user.clone() })?;
        Ok(user)
    }

    /// Append an activity for an existing user
    pub fn insert_activity(&mut self, activity: Activity) -> StoreResult<()> {
        debug!("Inserting activity {}", activity.id);
        self.commit(JournalEntry::InsertActivity { activity })
    }

    /// Remove every user and every activity, returning the number of users removed
    pub fn clear_users(&mut self) -> StoreResult<usize> {
        let count = self.document.users.len();
        self.commit(JournalEntry::ClearUsers)?;
        warn!("Cleared {} users and all activities", count);
        Ok(count)
    }

    /// Remove every activity, returning the number removed
    pub fn clear_activities(&mut self) -> StoreResult<usize> {
        let count = self.document.activities.len();
        self.commit(JournalEntry::ClearActivities)?;
        warn!("Cleared {} activities", count);
        Ok(count)
    }

    /// Recompute every referral counter from the `referred_by` links.
    ///
    /// Returns the number of users whose counter was repaired.
    pub fn reconcile_referral_counts(&mut self) -> StoreResult<usize> {
        let mut actual: HashMap<&str, u64> = HashMap::new();
        for user in &self.document.users {
            if let Some(code) = user.referred_by.as_deref() {
                *actual.entry(code).or_insert(0) += 1;
            }
        }

        let repairs: Vec<(Uuid, u64, u64)> = self
            .document
            .users
            .iter()
            .filter_map(|user| {
                let count = actual.get(user.referral_code.as_str()).copied().unwrap_or(0);
                (count != user.referrals_count).then_some((user.id, user.referrals_count, count))
            })
            .collect();

        for (id, stored, count) in &repairs {
            warn!(
                "Repairing referral count for user {}: stored {}, actual {}",
                id, stored, count
            );
            let count = *count;
            self.update_user(*id, |user| user.referrals_count = count)?;
        }

        Ok(repairs.len())
    }

    /// Write the full document and truncate the journal
    pub fn save(&mut self) -> StoreResult<()> {
        self.checkpoint()
    }

    /// Checkpoint and release the store
    pub fn close(mut self) -> StoreResult<()> {
        self.checkpoint()?;
        info!("Document store closed");
        Ok(())
    }

    fn checkpoint(&mut self) -> StoreResult<()> {
        let tmp = sibling(&self.config.path, ".tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &self.document)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp, &self.config.path)?;
        self.journal.truncate()?;
        self.pending = 0;

        debug!(
            "Checkpointed store at sequence {} to {}",
            self.document.sequence,
            self.config.path.display()
        );
        Ok(())
    }

    fn commit(&mut self, entry: JournalEntry) -> StoreResult<()> {
        self.check(&entry)?;

        let seq = self.document.sequence + 1;
        self.journal.append(seq, &entry)?;
        self.apply(entry);
        self.document.sequence = seq;
        self.pending += 1;

        if self.pending >= self.config.checkpoint_interval {
            // The journal already holds the record, so the mutation stands
            if let Err(e) = self.checkpoint() {
                warn!(
                    "Checkpoint after record {} failed, keeping the journal: {}",
                    seq, e
                );
            }
        }
        Ok(())
    }

    /// Validate an entry against the current document
    fn check(&self, entry: &JournalEntry) -> StoreResult<()> {
        match entry {
            JournalEntry::InsertUser { user } => match self.indexes.collision(user) {
                Some(key) => Err(StoreError::Conflict(format!(
                    "{} already in use by another user",
                    key
                ))),
                None => Ok(()),
            },
            JournalEntry::UpdateUser { user } => {
                let current = self
                    .user(user.id)
                    .ok_or_else(|| StoreError::NotFound(format!("user {}", user.id)))?;
                if current.email != user.email
                    || current.username != user.username
                    || current.referral_code != user.referral_code
                    || current.waitlist_position != user.waitlist_position
                {
                    return Err(StoreError::Conflict(format!(
                        "immutable field changed for user {}",
                        user.id
                    )));
                }
                Ok(())
            }
            JournalEntry::InsertActivity { activity } => {
                if self.indexes.by_id.contains_key(&activity.user_id) {
                    Ok(())
                } else {
                    Err(StoreError::NotFound(format!("user {}", activity.user_id)))
                }
            }
            JournalEntry::ClearUsers | JournalEntry::ClearActivities => Ok(()),
        }
    }

    /// Apply a checked entry to the in-memory document
    fn apply(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::InsertUser { user } => {
                let slot = self.document.users.len();
                self.indexes.insert(&user, slot);
                self.document.waitlist_high_water =
                    self.document.waitlist_high_water.max(user.waitlist_position);
                self.document.users.push(user);
            }
            JournalEntry::UpdateUser { user } => {
                if let Some(&slot) = self.indexes.by_id.get(&user.id) {
                    self.document.users[slot] = user;
                }
            }
            JournalEntry::InsertActivity { activity } => {
                self.document.activities.push(activity);
            }
            JournalEntry::ClearUsers => {
                self.document.users.clear();
                self.document.activities.clear();
                self.indexes = Indexes::default();
            }
            JournalEntry::ClearActivities => {
                self.document.activities.clear();
            }
        }
    }
}

/// Snapshot as read at open
struct Snapshot {
    document: Document,
    indexes: Indexes,
    /// The file was unreadable and has been moved aside
    quarantined: bool,
    /// Load-time repairs were made that only a checkpoint persists
    repaired: bool,
}

impl Snapshot {
    fn empty(quarantined: bool) -> Self {
        Self {
            document: Document::default(),
            indexes: Indexes::default(),
            quarantined,
            repaired: false,
        }
    }
}

/// Read the snapshot, falling back according to the recovery mode
fn load_snapshot(config: &DatabaseConfig) -> StoreResult<Snapshot> {
    let bytes = match fs::read(&config.path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(
                "No store image at {}, starting with an empty document",
                config.path.display()
            );
            return Ok(Snapshot::empty(false));
        }
        Err(e) => return Err(e.into()),
    };

    let parsed = serde_json::from_slice::<Document>(&bytes)
        .map_err(|e| e.to_string())
        .and_then(|mut document| {
            let repaired = assign_missing_positions(&mut document) > 0;
            Indexes::build(&document.users).map(|indexes| Snapshot {
                document,
                indexes,
                quarantined: false,
                repaired,
            })
        });

    match parsed {
        Ok(snapshot) => Ok(snapshot),
        Err(reason) => {
            recover(config, &config.path, &reason)?;
            Ok(Snapshot::empty(true))
        }
    }
}

/// Give users without a waitlist position (0) the next free positions, in
/// document order. Returns the number of users assigned.
fn assign_missing_positions(document: &mut Document) -> usize {
    let mut next = document
        .users
        .iter()
        .map(|u| u.waitlist_position)
        .max()
        .unwrap_or(0)
        .max(document.waitlist_high_water);

    let mut assigned = 0;
    for user in document.users.iter_mut().filter(|u| u.waitlist_position == 0) {
        next += 1;
        warn!(
            "Assigning waitlist position {} to user {} which had none",
            next, user.id
        );
        user.waitlist_position = next;
        assigned += 1;
    }

    document.waitlist_high_water = document.waitlist_high_water.max(next);
    assigned
}

/// Handle an unreadable file according to the recovery mode
fn recover(config: &DatabaseConfig, path: &Path, reason: &str) -> StoreResult<()> {
    match config.recovery_mode {
        RecoveryMode::Strict => {
            error!("Store image {} is corrupt: {}", path.display(), reason);
            Err(StoreError::Corruption {
                path: path.to_path_buf(),
                reason: reason.to_string(),
            })
        }
        RecoveryMode::Reset => {
            error!(
                "Store image {} is corrupt ({}); continuing without it",
                path.display(),
                reason
            );
            set_aside(path)
        }
    }
}

/// Rename `path` to `<path>.corrupt-<unix-ts>` if it exists
fn set_aside(path: &Path) -> StoreResult<()> {
    if !path.exists() {
        return Ok(());
    }

    let quarantine = sibling(path, &format!(".corrupt-{}", Utc::now().timestamp()));
    fs::rename(path, &quarantine)?;
    error!("Moved {} to {}", path.display(), quarantine.display());
    Ok(())
}

/// Shared handle to one open database
#[derive(Clone, Debug)]
pub struct Store {
    inner: Arc<Mutex<Database>>,
}

impl Store {
    pub fn new(database: Database) -> Self {
        Self {
            inner: Arc::new(Mutex::new(database)),
        }
    }

    /// Open a database and wrap it in a handle
    pub fn open(config: DatabaseConfig) -> StoreResult<Self> {
        Database::open(config).map(Self::new)
    }

    /// Run a read-only closure against the current document
    pub fn read<T>(&self, f: impl FnOnce(&Database) -> T) -> T {
        f(&self.lock())
    }

    /// Run a closure with exclusive access; nothing else observes the store until it returns
    pub fn write<T>(&self, f: impl FnOnce(&mut Database) -> T) -> T {
        f(&mut self.lock())
    }

    /// Fold the journal into a fresh snapshot
    pub fn checkpoint(&self) -> StoreResult<()> {
        self.lock().save()
    }

    fn lock(&self) -> MutexGuard<'_, Database> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn user(name: &str, code: &str, position: u64) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{}@example.com", name),
            credential_digest: "digest".to_string(),
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

    fn open(dir: &TempDir) -> Database {
        Database::open(DatabaseConfig::new(dir.path().join("store.json"))).unwrap()
    }

    #[test]
    fn test_insert_and_lookup() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        let alice = user("alice", "AAAAAAAA", 1);
        db.insert_user(alice.clone()).unwrap();

        assert_eq!(db.user(alice.id), Some(&alice));
        assert_eq!(db.user_by_email("alice@example.com"), Some(&alice));
        assert_eq!(db.user_by_username("alice"), Some(&alice));
        assert_eq!(db.user_by_referral_code("AAAAAAAA"), Some(&alice));
        assert!(db.user_by_referral_code("aaaaaaaa").is_none());
        assert_eq!(db.user_count(), 1);
    }

    #[test]
    fn test_duplicate_keys_conflict() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        db.insert_user(user("alice", "AAAAAAAA", 1)).unwrap();

        let same_code = user("bob", "AAAAAAAA", 2);
        assert!(matches!(
            db.insert_user(same_code),
            Err(StoreError::Conflict(_))
        ));

        let mut same_email = user("carol", "CCCCCCCC", 2);
        same_email.email = "alice@example.com".to_string();
        assert!(matches!(
            db.insert_user(same_email),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(db.user_count(), 1);
    }

    #[test]
    fn test_add_points_accepts_negative_delta() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        let alice = user("alice", "AAAAAAAA", 1);
        db.insert_user(alice.clone()).unwrap();

        db.add_points(alice.id, 50).unwrap();
        let updated = db.add_points(alice.id, -20).unwrap();
        assert_eq!(updated.points, 30);
        assert!(updated.updated_at >= alice.updated_at);
    }

    #[test]
    fn test_update_unknown_user_is_not_found() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        assert!(matches!(
            db.add_points(Uuid::new_v4(), 1),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_activity_requires_existing_user() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        let activity = Activity {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            activity_type: "bonus".to_string(),
            points_earned: 10,
            description: String::new(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            db.insert_activity(activity),
            Err(StoreError::NotFound(_))
        ));
        assert!(db.activities().is_empty());
    }

    #[test]
    fn test_waitlist_positions_survive_clear() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        assert_eq!(db.next_waitlist_position(), 1);

        db.insert_user(user("alice", "AAAAAAAA", 1)).unwrap();
        db.insert_user(user("bob", "BBBBBBBB", 2)).unwrap();
        assert_eq!(db.next_waitlist_position(), 3);

        assert_eq!(db.clear_users().unwrap(), 2);
        assert_eq!(db.user_count(), 0);
        assert_eq!(db.next_waitlist_position(), 3);
    }

    #[test]
    fn test_clear_users_also_clears_activities() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        let alice = user("alice", "AAAAAAAA", 1);
        db.insert_user(alice.clone()).unwrap();
        db.insert_activity(Activity {
            id: Uuid::new_v4(),
            user_id: alice.id,
            activity_type: "bonus".to_string(),
            points_earned: 10,
            description: "welcome".to_string(),
            created_at: Utc::now(),
        })
        .unwrap();

        db.clear_users().unwrap();
        assert!(db.activities().is_empty());
        assert!(db.user(alice.id).is_none());

        // Keys are free again once the users are gone
        db.insert_user(user("alice", "AAAAAAAA", 3)).unwrap();
    }

    #[test]
    fn test_reconcile_repairs_undercounted_referrer() {
        let dir = TempDir::new().unwrap();
        let mut db = open(&dir);
        let referrer = user("alice", "AAAAAAAA", 1);
        let mut referee = user("bob", "BBBBBBBB", 2);
        referee.referred_by = Some("AAAAAAAA".to_string());
        db.insert_user(referrer.clone()).unwrap();
        db.insert_user(referee).unwrap();

        assert_eq!(db.reconcile_referral_counts().unwrap(), 1);
        assert_eq!(db.user(referrer.id).unwrap().referrals_count, 1);
        assert_eq!(db.reconcile_referral_counts().unwrap(), 0);
    }

    #[test]
    fn test_recovery_mode_parsing() {
        assert_eq!("strict".parse::<RecoveryMode>().unwrap(), RecoveryMode::Strict);
        assert_eq!(" RESET ".parse::<RecoveryMode>().unwrap(), RecoveryMode::Reset);
        assert!("ignore".parse::<RecoveryMode>().is_err());
    }

    #[test]
    #[serial]
    fn test_database_config_from_env() {
        unsafe {
            std::env::remove_var("DATABASE_PATH");
            std::env::remove_var("DATABASE_CHECKPOINT_INTERVAL");
            std::env::remove_var("DATABASE_RECOVERY_MODE");
        }

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.path, PathBuf::from("./leaderboard.json"));
        assert_eq!(config.checkpoint_interval, DEFAULT_CHECKPOINT_INTERVAL);
        assert_eq!(config.recovery_mode, RecoveryMode::Strict);
        assert_eq!(config.journal_path(), PathBuf::from("./leaderboard.json.journal"));
    }

    #[test]
    #[serial]
    fn test_database_config_from_env_with_custom_values() {
        unsafe {
            std::env::set_var("DATABASE_PATH", "/var/lib/leaderboard/data.json");
            std::env::set_var("DATABASE_CHECKPOINT_INTERVAL", "16");
            std::env::set_var("DATABASE_RECOVERY_MODE", "reset");
        }

        let config = DatabaseConfig::from_env().unwrap();
        assert_eq!(config.path, PathBuf::from("/var/lib/leaderboard/data.json"));
        assert_eq!(config.checkpoint_interval, 16);
        assert_eq!(config.recovery_mode, RecoveryMode::Reset);

        unsafe {
            std::env::set_var("DATABASE_RECOVERY_MODE", "sometimes");
        }
        assert!(matches!(
            DatabaseConfig::from_env(),
            Err(StoreError::Configuration(_))
        ));

        // Clean up
        unsafe {
            std::env::remove_var("DATABASE_PATH");
            std::env::remove_var("DATABASE_CHECKPOINT_INTERVAL");
            std::env::remove_var("DATABASE_RECOVERY_MODE");
        }
    }
}
