//! User payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use store::User;
use uuid::Uuid;

/// New user registration payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Referral code of the user who invited this one
    #[serde(default)]
    pub referral_code: Option<String>,
}

/// User login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

/// Request to grant admin rights
#[derive(Debug, Clone, Deserialize)]
pub struct PromoteAdmin {
    pub email: String,
}

/// Public view of a user, without the credential digest
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub avatar_url: String,
    pub points: i64,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub referrals_count: u64,
    pub waitlist_position: u64,
    pub joined_date: DateTime<Utc>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            points: user.points,
            referral_code: user.referral_code.clone(),
            referred_by: user.referred_by.clone(),
            referrals_count: user.referrals_count,
            waitlist_position: user.waitlist_position,
            joined_date: user.joined_date,
            is_admin: user.is_admin,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Users listed by points
#[derive(Debug, Serialize)]
pub struct UserList {
    pub users: Vec<UserProfile>,
}

/// Query parameters of the registration share link
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterQuery {
    #[serde(rename = "ref")]
    pub referral_code: Option<String>,
}

/// Response for registration and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
    pub token: String,
}
