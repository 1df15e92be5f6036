use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    contacts::{
        dto::{
            validate_contact_email, validate_name, validate_phone, ContactListResponse,
            ContactResponse, CreateContactRequest, FavoriteRequest, ListQuery,
            UpdateContactRequest,
        },
        repo::Contact,
    },
    error::ApiError,
    state::AppState,
    users::dto::MessageResponse,
};

pub fn contacts_routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(list_contacts))
        .route("/contacts", post(create_contact))
        .route("/contacts/:id", get(get_contact))
        .route("/contacts/:id", put(update_contact))
        .route("/contacts/:id", delete(delete_contact))
        .route("/contacts/:id/favorite", patch(set_favorite))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn list_contacts(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<ContactListResponse>, ApiError> {
    let contacts = Contact::list_by_user(
        &state.db,
        user.0.id,
        query.favorite,
        query.limit(),
        query.offset(),
    )
    .await?;
    Ok(Json(ContactListResponse { data: contacts }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn get_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = Contact::find(&state.db, user.0.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".into()))?;
    Ok(Json(ContactResponse { data: contact }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn create_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), ApiError> {
    validate_name(&payload.name)?;
    validate_contact_email(&payload.email)?;
    validate_phone(&payload.phone)?;

    let contact = Contact::create(
        &state.db,
        user.0.id,
        &payload.name,
        &payload.email,
        &payload.phone,
    )
    .await?;

    info!(contact_id = %contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(ContactResponse { data: contact })))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.0.id))]
pub async fn update_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateContactRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    if payload.is_empty() {
        return Err(ApiError::Validation("Missing fields".into()));
    }
    if let Some(name) = &payload.name {
        validate_name(name)?;
    }
    if let Some(email) = &payload.email {
        validate_contact_email(email)?;
    }
    if let Some(phone) = &payload.phone {
        validate_phone(phone)?;
    }

    let contact = Contact::update(
        &state.db,
        user.0.id,
        id,
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.phone.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Not found".into()))?;

    Ok(Json(ContactResponse { data: contact }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn set_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FavoriteRequest>,
) -> Result<Json<ContactResponse>, ApiError> {
    let contact = Contact::set_favorite(&state.db, user.0.id, id, payload.favorite)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".into()))?;
    Ok(Json(ContactResponse { data: contact }))
}

#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn delete_contact(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    Contact::delete(&state.db, user.0.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Not found".into()))?;

    info!(contact_id = %id, "contact deleted");
    Ok(Json(MessageResponse {
        message: "Contact deleted".into(),
    }))
}
