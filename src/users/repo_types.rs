use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Subscription tier. Closed enum; anything else fails deserialization with
/// a 400 before the store is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "subscription", rename_all = "lowercase")]
pub enum Subscription {
    Starter,
    Pro,
    Business,
}

impl Default for Subscription {
    fn default() -> Self {
        Subscription::Starter
    }
}

/// User row. `token` holds the single currently valid session token, or NULL
/// when logged out. `verification_token` is present only while the account
/// is unverified and is cleared on successful verification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub subscription: Subscription,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub verify: bool,
    #[serde(skip_serializing)]
    pub verification_token: Option<String>,
    pub created_at: OffsetDateTime,
}
