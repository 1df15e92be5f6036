use std::path::Path as FsPath;

use axum::{
    extract::{DefaultBodyLimit, FromRef, Multipart, Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use anyhow::Context;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::{
        dto::{
            AvatarData, AvatarResponse, LoginData, LoginRequest, LoginResponse, MessageResponse,
            PublicUser, ResendVerificationRequest, SignupData, SignupRequest, SignupResponse,
            SubscriptionData, SubscriptionResponse, SubscriptionUpdateRequest,
        },
        repo_types::User,
        services::{
            gravatar_url, is_valid_email, is_valid_password, new_verification_token,
            verification_url,
        },
    },
};

const MAX_AVATAR_BYTES: usize = 1024 * 1024;
const AVATAR_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
const AVATAR_MIME_TYPES: [&str; 5] = [
    "image/jpg",
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
];

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(signup))
        .route("/users/login", post(login))
        .route("/users/logout", get(logout))
        .route("/users/current", get(current))
        .route("/users", patch(update_subscription))
        .route("/users/verify", post(resend_verification))
        .route("/users/verify/:token", get(verify_email))
        .route(
            "/users/avatars",
            patch(update_avatar).layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES)),
        )
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation(
            "Email must be a valid email address".into(),
        ));
    }
    if !is_valid_password(password) {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long and contain at least one letter and one number".into(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    validate_credentials(&payload.email, &payload.password)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("Email in use".into()));
    }

    let hash = hash_password(&payload.password)?;
    let avatar_url = gravatar_url(&payload.email);
    let verification_token = new_verification_token();

    let user = User::create(
        &state.db,
        &payload.email,
        &hash,
        payload.subscription.unwrap_or_default(),
        &avatar_url,
        &verification_token,
    )
    .await?;

    // Fire-and-forget: a mailer outage must not surface as a signup failure.
    let url = verification_url(&state.config.base_url, &verification_token);
    if let Err(e) = state.mailer.send_verification(&user.email, &url).await {
        warn!(error = %e, user_id = %user.id, "verification email dispatch failed");
    }

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            data: SignupData {
                user: PublicUser::from(&user),
            },
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_credentials(&payload.email, &payload.password)?;

    // Unknown email and wrong password share the 401 status so the response
    // code alone cannot be used to enumerate registered addresses.
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("Not such a user".into())
        })?;

    if !user.verify {
        warn!(user_id = %user.id, "login attempt on unverified account");
        return Err(ApiError::Unauthorized("Email is not verified".into()));
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Email or password is wrong".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user)?;
    User::set_token(&state.db, user.id, &token).await?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        data: LoginData {
            token,
            user: PublicUser::from(&user),
        },
    }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, ApiError> {
    User::clear_token(&state.db, user.0.id).await?;
    info!(user_id = %user.0.id, "user logged out");
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(user), fields(user_id = %user.0.id))]
pub async fn current(user: AuthUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user.0))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn update_subscription(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<SubscriptionUpdateRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    let updated = User::update_subscription(&state.db, user.0.id, payload.subscription)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".into()))?;

    info!(user_id = %updated.id, subscription = ?updated.subscription, "subscription updated");
    Ok(Json(SubscriptionResponse {
        data: SubscriptionData {
            email: updated.email,
            subscription: updated.subscription,
        },
    }))
}

// The path parameter is a secret; keep it out of the span.
#[instrument(skip_all)]
pub async fn verify_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    // A consumed token matches no row, so re-verifying lands here too.
    let user = User::find_by_verification_token(&state.db, &token)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    User::mark_verified(&state.db, user.id).await?;
    info!(user_id = %user.id, "email verified");
    Ok(Json(MessageResponse {
        message: "Verification successful".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn resend_verification(
    State(state): State<AppState>,
    Json(payload): Json<ResendVerificationRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let email = payload
        .email
        .ok_or_else(|| ApiError::Validation("missing required field email".into()))?;
    if !is_valid_email(&email) {
        return Err(ApiError::Validation(
            "Email must be a valid email address".into(),
        ));
    }

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    if user.verify {
        return Err(ApiError::Validation(
            "Verification has already been passed".into(),
        ));
    }

    // Re-send the existing token rather than minting a new one, so a link
    // from the original signup email stays valid.
    let token = user
        .verification_token
        .as_deref()
        .context("unverified user without verification token")?;
    let url = verification_url(&state.config.base_url, token);
    if let Err(e) = state.mailer.send_verification(&user.email, &url).await {
        warn!(error = %e, user_id = %user.id, "verification email dispatch failed");
    }

    Ok(Json(MessageResponse {
        message: "Verification email sent".into(),
    }))
}

#[instrument(skip(state, user, multipart), fields(user_id = %user.0.id))]
pub async fn update_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, ApiError> {
    let mut upload: Option<(String, bytes::Bytes)> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("avatar") {
            continue;
        }
        let ext = field
            .file_name()
            .and_then(|name| FsPath::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());
        let content_type = field.content_type().map(|ct| ct.to_string());
        let allowed = matches!(&ext, Some(e) if AVATAR_EXTENSIONS.contains(&e.as_str()))
            && matches!(&content_type, Some(ct) if AVATAR_MIME_TYPES.contains(&ct.as_str()));
        if !allowed {
            continue;
        }
        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::Validation("A proper avatar file is required".into()))?;
        upload = Some((ext.unwrap_or_default(), data));
        break;
    }

    let Some((ext, data)) = upload else {
        return Err(ApiError::Validation(
            "A proper avatar file is required".into(),
        ));
    };

    let avatars_dir = FsPath::new(&state.config.avatars_dir);
    tokio::fs::create_dir_all(avatars_dir)
        .await
        .context("create avatars dir")?;
    remove_old_avatars(avatars_dir, &user.0.id.to_string()).await;

    let file_name = format!("{}.{}", user.0.id, ext);
    tokio::fs::write(avatars_dir.join(&file_name), &data)
        .await
        .context("write avatar file")?;

    let avatar_url = format!("/avatars/{file_name}");
    let updated = User::set_avatar_url(&state.db, user.0.id, &avatar_url)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".into()))?;

    info!(user_id = %updated.id, "avatar updated");
    Ok(Json(AvatarResponse {
        data: AvatarData {
            avatar_url: updated.avatar_url.unwrap_or(avatar_url),
        },
    }))
}

/// Drop any previous avatar for the user, whatever its extension. Failures
/// are logged and ignored; a stale file is harmless.
async fn remove_old_avatars(dir: &FsPath, user_id: &str) {
    let Ok(mut entries) = tokio::fs::read_dir(dir).await else {
        return;
    };
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let stem = path.file_stem().and_then(|s| s.to_str());
        if stem == Some(user_id) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                warn!(error = %e, path = %path.display(), "failed to remove old avatar");
            }
        }
    }
}
