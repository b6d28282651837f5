//! Durable document schema
//!
//! The whole store is one JSON document. Field names match the durable
//! image so that snapshots stay readable by other tools, and images written
//! by the earlier Node service load as-is: `password` for the digest, `0`/`1`
//! admin flags and `null` waitlist positions are all accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

/// User record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(alias = "password")]
    pub credential_digest: String,
    #[serde(default)]
    pub avatar_url: String,
    pub points: i64,
    pub referral_code: String,
    pub referred_by: Option<String>,
    pub referrals_count: u64,
    /// 1-based; 0 marks a legacy row without a position, repaired at open
    #[serde(deserialize_with = "position")]
    pub waitlist_position: u64,
    pub joined_date: DateTime<Utc>,
    #[serde(deserialize_with = "flag")]
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Point-earning event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub activity_type: String,
    pub points_earned: i64,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// A boolean written either as `true`/`false` or as `1`/`0`
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Int(0) => Ok(false),
        Flag::Int(1) => Ok(true),
        Flag::Int(other) => Err(de::Error::custom(format!(
            "invalid flag {}, expected a boolean or 0/1",
            other
        ))),
    }
}

/// A waitlist position that may be `null`
fn position<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

/// Ranking cache record.
///
/// Read back and written out with the document but never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingCache {
    pub id: u32,
    pub rankings: Vec<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

impl Default for RankingCache {
    fn default() -> Self {
        Self {
            id: 1,
            rankings: Vec::new(),
            updated_at: Utc::now(),
        }
    }
}

/// The complete durable document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub cache: RankingCache,
    /// Highest waitlist position ever handed out, kept across bulk clears
    #[serde(default)]
    pub waitlist_high_water: u64,
    /// Last journal sequence number folded into this document
    #[serde(default)]
    pub sequence: u64,
}
