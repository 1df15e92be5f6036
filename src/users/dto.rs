use serde::{Deserialize, Serialize};

use crate::users::repo_types::{Subscription, User};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionUpdateRequest {
    pub subscription: Subscription,
}

/// Body for POST /users/verify. `email` is optional here so a missing field
/// yields our own 400 message instead of a deserialization rejection.
#[derive(Debug, Deserialize, Default)]
pub struct ResendVerificationRequest {
    pub email: Option<String>,
}

/// Public-safe projection of a user: never the hash, never the raw tokens.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub email: String,
    pub subscription: Subscription,
    #[serde(rename = "avatarURL")]
    pub avatar_url: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            subscription: user.subscription,
            avatar_url: user.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub data: SignupData,
}

#[derive(Debug, Serialize)]
pub struct SignupData {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub data: LoginData,
}

#[derive(Debug, Serialize)]
pub struct LoginData {
    pub token: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub data: SubscriptionData,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionData {
    pub email: String,
    pub subscription: Subscription,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub data: AvatarData,
}

#[derive(Debug, Serialize)]
pub struct AvatarData {
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
