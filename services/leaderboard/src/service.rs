//! Leaderboard operations exposed to the request layer
//!
//! Each public method is one named operation. Reads take a consistent
//! snapshot under the store lock; writes go through the repositories.

use std::sync::Arc;

use store::Store;
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    config::AdminAccount,
    error::{ApiError, ApiResult},
    jwt::{Claims, TokenIssuer},
    models::{
        ActivityFeed, ActivityQuery, AuthResponse, LeaderboardPage, LoginCredentials, NewActivity,
        NewUser, PageRequest, Pagination, RankedUser, RecordedActivity, ReferralCode,
        ReferralDashboard, ReferralStats, ReferralValidation, ReferredUser, ReferrerSummary,
        TopReferrer, TopReferrers, UserList, UserProfile, UserRank, UserWindow, ValidatedReferrer,
        WaitlistEntry, WaitlistPage, WaitlistStanding,
    },
    password::CredentialHasher,
    ranking::{self, Ranked},
    referrals,
    repositories::{ActivityRepository, UserRepository},
    validation, waitlist,
};

/// Leaderboard service
#[derive(Clone)]
pub struct LeaderboardService {
    store: Store,
    users: UserRepository,
    activities: ActivityRepository,
    tokens: Arc<dyn TokenIssuer>,
    app_url: String,
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

fn ranked_users(ranked: Vec<Ranked<'_>>) -> Vec<RankedUser> {
    ranked
        .into_iter()
        .map(|r| RankedUser {
            rank: r.rank,
            user: UserProfile::from(r.user),
        })
        .collect()
}

impl LeaderboardService {
    pub fn new(
        store: Store,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenIssuer>,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            users: UserRepository::new(store.clone(), hasher),
            activities: ActivityRepository::new(store.clone()),
            store,
            tokens,
            app_url: app_url.into(),
        }
    }

    /// Share link for a referral code
    pub fn referral_link(&self, code: &str) -> String {
        format!("{}?ref={}", self.app_url, code)
    }

    /// Landing page for a registration link, carrying the referral code if any
    pub fn registration_link(&self, code: Option<&str>) -> String {
        match code.filter(|code| !code.is_empty()) {
            Some(code) => self.referral_link(code),
            None => self.app_url.clone(),
        }
    }

    fn issue_token(&self, user: &store::User) -> ApiResult<String> {
        Claims::for_user(user, self.tokens.token_ttl())
            .and_then(|claims| self.tokens.issue(&claims))
            .map_err(|e| {
                error!("Failed to issue token for {}: {}", user.id, e);
                ApiError::InternalServerError
            })
    }

    /// Register a new user and sign them in
    pub fn register_user(&self, new_user: &NewUser) -> ApiResult<AuthResponse> {
        validation::validate_new_user(new_user).map_err(ApiError::Validation)?;

        let user = self.users.create(new_user)?;
        let token = self.issue_token(&user)?;

        info!("Registered user {} at waitlist position {}", user.id, user.waitlist_position);

        Ok(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserProfile::from(&user),
            token,
        })
    }

    /// Check an email and password and issue a token
    pub fn authenticate_user(&self, credentials: &LoginCredentials) -> ApiResult<AuthResponse> {
        if credentials.email.is_empty() || credentials.password.is_empty() {
            return Err(ApiError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_email(&credentials.email)
            .ok_or(ApiError::InvalidCredentials)?;

        if !self.users.verify_password(&user, &credentials.password)? {
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;

        Ok(AuthResponse {
            message: "Login successful".to_string(),
            user: UserProfile::from(&user),
            token,
        })
    }

    pub fn total_users(&self) -> usize {
        self.users.total_count()
    }

    /// Users ordered by points, highest first
    pub fn list_users(&self, limit: usize) -> UserList {
        self.store.read(|db| UserList {
            users: ranking::by_points(db.users())
                .into_iter()
                .take(limit)
                .map(UserProfile::from)
                .collect(),
        })
    }

    pub fn get_user_by_id(&self, id: Uuid) -> ApiResult<UserProfile> {
        self.users
            .find_by_id(id)
            .map(|user| UserProfile::from(&user))
            .ok_or_else(user_not_found)
    }

    /// One page of the points leaderboard with positional ranks
    pub fn get_leaderboard_page(&self, request: &PageRequest) -> LeaderboardPage {
        self.store.read(|db| LeaderboardPage {
            leaderboard: ranked_users(ranking::leaderboard(
                db.users(),
                request.limit(),
                request.offset(),
            )),
            pagination: Pagination::new(request, db.user_count()),
        })
    }

    /// One page of the waitlist in signup order
    pub fn get_waitlist_page(&self, request: &PageRequest) -> WaitlistPage {
        self.store.read(|db| WaitlistPage {
            waitlist: waitlist::page(db.users(), request.limit(), request.offset())
                .into_iter()
                .map(WaitlistEntry::from)
                .collect(),
            pagination: Pagination::new(request, db.user_count()),
        })
    }

    /// Competition rank of one user
    pub fn get_user_rank(&self, id: Uuid) -> ApiResult<UserRank> {
        self.store.read(|db| {
            let user = db.user(id).ok_or_else(user_not_found)?;
            Ok(UserRank {
                user: UserProfile::from(user),
                rank: ranking::competition_rank(db.users(), user),
                points: user.points,
                total_users: db.user_count(),
            })
        })
    }

    /// Leaderboard slice centred on one user
    pub fn get_user_window(&self, id: Uuid, range: usize) -> ApiResult<UserWindow> {
        self.store.read(|db| {
            let window = ranking::window(db.users(), id, range).ok_or_else(user_not_found)?;
            Ok(UserWindow {
                rankings: ranked_users(window.rankings),
                user_rank: window.user_rank,
                total_users: window.total_users,
            })
        })
    }

    pub fn get_waitlist_standing(&self, id: Uuid) -> ApiResult<WaitlistStanding> {
        let standing = self
            .store
            .read(|db| waitlist::standing(db, id))
            .ok_or_else(user_not_found)?;

        Ok(WaitlistStanding {
            position: standing.position,
            total_users: standing.total_users,
            positions_ahead: standing.positions_ahead(),
            progress: standing.progress(),
        })
    }

    pub fn get_top_referrers(&self, limit: usize) -> TopReferrers {
        self.store.read(|db| TopReferrers {
            top_referrers: referrals::top_referrers(db.users(), limit)
                .into_iter()
                .enumerate()
                .map(|(i, user)| TopReferrer::new(i + 1, user))
                .collect(),
            total_users: db.user_count(),
        })
    }

    pub fn get_referral_stats(&self, id: Uuid) -> ApiResult<ReferralStats> {
        self.store.read(|db| {
            let entry = referrals::stats(db, id).ok_or_else(user_not_found)?;
            let user = entry.user;
            let standing = waitlist::Standing {
                position: user.waitlist_position,
                total_users: db.user_count(),
            };

            Ok(ReferralStats {
                referral_code: user.referral_code.clone(),
                referral_link: self.referral_link(&user.referral_code),
                referrals_count: user.referrals_count,
                referred_by: user.referred_by.clone(),
                referrer: entry.referrer.map(|r| ReferrerSummary {
                    username: r.username.clone(),
                    referral_code: r.referral_code.clone(),
                }),
                waitlist_position: user.waitlist_position,
                joined_date: user.joined_date,
                total_users: standing.total_users,
                position_ahead: standing.positions_ahead(),
                progress: standing.progress(),
            })
        })
    }

    /// Check whether a code belongs to someone
    pub fn validate_referral_code(&self, code: &str) -> ApiResult<ReferralValidation> {
        if code.trim().is_empty() {
            return Err(ApiError::Validation("Referral code is required".to_string()));
        }

        self.store.read(|db| {
            let referrer = referrals::validate(db, code)
                .ok_or_else(|| ApiError::NotFound("Invalid referral code".to_string()))?;
            Ok(ReferralValidation {
                valid: true,
                referrer: ValidatedReferrer {
                    username: referrer.username.clone(),
                    referrals_count: referrer.referrals_count,
                },
            })
        })
    }

    /// Users referred by `id`, with the share link
    pub fn get_referral_dashboard(&self, id: Uuid) -> ApiResult<ReferralDashboard> {
        self.store.read(|db| {
            let user = db.user(id).ok_or_else(user_not_found)?;
            let referrals: Vec<ReferredUser> = referrals::referred_users(db, &user.referral_code)
                .into_iter()
                .map(ReferredUser::from)
                .collect();

            Ok(ReferralDashboard {
                total_referrals: referrals.len(),
                referral_code: user.referral_code.clone(),
                referral_link: self.referral_link(&user.referral_code),
                referrals,
            })
        })
    }

    pub fn get_referral_code(&self, id: Uuid) -> ApiResult<ReferralCode> {
        let user = self.users.find_by_id(id).ok_or_else(user_not_found)?;
        Ok(ReferralCode {
            referral_link: self.referral_link(&user.referral_code),
            referral_code: user.referral_code,
        })
    }

    /// Award points to a user and log the event
    pub fn record_activity(&self, user_id: Uuid, activity: &NewActivity) -> ApiResult<RecordedActivity> {
        validation::validate_activity(activity).map_err(ApiError::Validation)?;

        let (user, activity) = self.activities.award(
            user_id,
            activity.activity_type.trim(),
            activity.points_earned,
            &activity.description,
        )?;

        Ok(RecordedActivity {
            activity,
            user: UserProfile::from(&user),
        })
    }

    /// Global activity feed
    pub fn list_activities(&self, query: &ActivityQuery) -> ActivityFeed {
        ActivityFeed {
            activities: self.activities.all(query.limit(), query.offset()),
        }
    }

    /// Activity feed of one user
    pub fn list_user_activities(&self, user_id: Uuid, query: &ActivityQuery) -> ApiResult<ActivityFeed> {
        if self.users.find_by_id(user_id).is_none() {
            return Err(user_not_found());
        }
        Ok(ActivityFeed {
            activities: self.activities.by_user(user_id, query.limit()),
        })
    }

    /// Fail unless `id` names an admin
    pub fn require_admin(&self, id: Uuid) -> ApiResult<()> {
        match self.users.find_by_id(id) {
            Some(user) if user.is_admin => Ok(()),
            Some(_) => Err(ApiError::Forbidden),
            None => Err(ApiError::Unauthorized),
        }
    }

    pub fn promote_admin(&self, email: &str) -> ApiResult<UserProfile> {
        self.users
            .promote_admin(email)
            .map(|user| UserProfile::from(&user))
    }

    /// Remove every user and activity
    pub fn clear_users(&self) -> ApiResult<usize> {
        self.users.clear_all()
    }

    pub fn clear_activities(&self) -> ApiResult<usize> {
        self.activities.clear()
    }

    /// Create the configured admin account unless its email is already registered
    pub fn ensure_admin(&self, admin: &AdminAccount) -> ApiResult<()> {
        if let Some(existing) = self.users.find_by_email(&admin.email) {
            if !existing.is_admin {
                self.users.promote_admin(&admin.email)?;
            }
            return Ok(());
        }

        let new_user = NewUser {
            username: admin.username.clone(),
            email: admin.email.clone(),
            password: admin.password.clone(),
            avatar_url: None,
            referral_code: None,
        };
        validation::validate_new_user(&new_user).map_err(ApiError::Validation)?;

        self.users.create(&new_user)?;
        self.users.promote_admin(&admin.email)?;
        info!("Default admin user created ({})", admin.email);
        Ok(())
    }
}
