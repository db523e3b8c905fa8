//! # Authentication Handlers
//!
//! Login, token refresh, and logout. Refresh tokens are registered on issue
//! and revoked wholesale on logout; the access token stays stateless.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{self, CurrentUser, TokenKind};
use crate::handlers::ApiJson;
use crate::error::{ApiError, unauthorized};
use crate::repositories::{TokenRepository, UserRepository};
use crate::server::AppState;

/// Message when the credentials match no active account.
const NO_ACTIVE_ACCOUNT: &str =
    "Aucun compte actif n'a été trouvé avec les identifiants fournis.";

/// Login request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    #[schema(example = "jean.dupont@epicevents.fr")]
    pub email: String,
    pub password: String,
}

/// Token pair returned by login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenPairDto {
    pub access: String,
    pub refresh: String,
}

/// Refresh request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequestDto {
    pub refresh: String,
}

/// Access token returned by refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccessTokenDto {
    pub access: String,
}

/// Authenticate by email and password, returning an access/refresh pair
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Authenticated", body = TokenPairDto),
        (status = 401, description = "No active account with these credentials", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequestDto>,
) -> Result<Json<TokenPairDto>, ApiError> {
    let users = UserRepository::new(&state.db);
    let user = users
        .find_by_email(&request.email)
        .await
        .map_err(ApiError::from)?
        .filter(|user| user.is_active)
        .filter(|user| auth::verify_password(&request.password, &user.password_hash))
        .ok_or_else(|| unauthorized(Some(NO_ACTIVE_ACCOUNT)))?;

    let access = auth::issue_token(&state.config, user.id, TokenKind::Access)
        .map_err(|err| anyhow::anyhow!("token signing failed: {err}"))?;
    let refresh = auth::issue_token(&state.config, user.id, TokenKind::Refresh)
        .map_err(|err| anyhow::anyhow!("token signing failed: {err}"))?;

    let tokens = TokenRepository::new(&state.db);
    tokens
        .record(user.id, refresh.jti, refresh.expires_at)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenPairDto {
        access: access.token,
        refresh: refresh.token,
    }))
}

/// Exchange a valid refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/login/refresh",
    request_body = RefreshRequestDto,
    responses(
        (status = 200, description = "New access token", body = AccessTokenDto),
        (status = 401, description = "Refresh token invalid, expired, or revoked", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RefreshRequestDto>,
) -> Result<Json<AccessTokenDto>, ApiError> {
    let claims = auth::decode_token(&state.config, &request.refresh, TokenKind::Refresh)?;

    let tokens = TokenRepository::new(&state.db);
    if !tokens.is_active(claims.jti).await.map_err(ApiError::from)? {
        return Err(unauthorized(Some("Le jeton n'est pas valide ou a expiré.")));
    }

    let users = UserRepository::new(&state.db);
    let user = users
        .find_by_id(claims.sub)
        .await
        .map_err(ApiError::from)?
        .filter(|user| user.is_active)
        .ok_or_else(|| unauthorized(Some(NO_ACTIVE_ACCOUNT)))?;

    let access = auth::issue_token(&state.config, user.id, TokenKind::Access)
        .map_err(|err| anyhow::anyhow!("token signing failed: {err}"))?;

    Ok(Json(AccessTokenDto {
        access: access.token,
    }))
}

/// Revoke every outstanding refresh token of the authenticated user
#[utoipa::path(
    post,
    path = "/api/logout",
    security(("bearer_auth" = [])),
    responses(
        (status = 205, description = "All refresh tokens revoked"),
        (status = 401, description = "Missing or invalid bearer token", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn logout(
    State(state): State<AppState>,
    requester: CurrentUser,
) -> Result<StatusCode, ApiError> {
    let tokens = TokenRepository::new(&state.db);
    let revoked = tokens
        .revoke_all_for_user(requester.user.id)
        .await
        .map_err(ApiError::from)?;

    tracing::info!(user_id = %requester.user.id, revoked, "User logged out");

    Ok(StatusCode::RESET_CONTENT)
}
