//! # Authentication
//!
//! Bearer JWT authentication for protected endpoints: Argon2id password
//! hashing, access/refresh token issuance, and the middleware that resolves
//! a bearer token into the requesting user and employee profile.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::error::{ApiError, unauthorized, unauthorized_with_trace_id};
use crate::models::employee::{self, Department};
use crate::models::{Employee, User, user};
use crate::server::AppState;
use crate::telemetry::TraceContext;

/// Distinguishes the two token kinds carried in the `token_type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT claim set for both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    /// Expiry (unix seconds)
    pub exp: i64,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Token id, registered for refresh tokens
    pub jti: Uuid,
    pub token_type: TokenKind,
}

/// Access + refresh token pair returned by login.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: Uuid,
    pub expires_at: chrono::DateTime<Utc>,
}

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Verify a password against a stored Argon2id hash.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    PasswordHash::new(stored_hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Sign a token of the given kind for the user.
pub fn issue_token(
    config: &AppConfig,
    user_id: Uuid,
    kind: TokenKind,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let ttl_seconds = match kind {
        TokenKind::Access => config.access_token_ttl_seconds,
        TokenKind::Refresh => config.refresh_token_ttl_seconds,
    };
    let now = Utc::now();
    let expires_at = now + Duration::seconds(ttl_seconds as i64);
    let jti = Uuid::new_v4();

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
        jti,
        token_type: kind,
    };

    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(IssuedToken {
        token,
        jti,
        expires_at,
    })
}

/// Decode and verify a token, checking signature, expiry, and kind.
pub fn decode_token(config: &AppConfig, token: &str, expected: TokenKind) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);

    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| unauthorized(Some("Le jeton n'est pas valide ou a expiré.")))?;

    if data.claims.token_type != expected {
        return Err(unauthorized(Some("Le jeton n'est pas valide ou a expiré.")));
    }

    Ok(data.claims)
}

/// Authenticated requester: the user account plus its employee profile.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: user::Model,
    pub employee: Option<employee::Model>,
}

impl CurrentUser {
    pub fn is_staff(&self) -> bool {
        self.user.is_staff
    }

    pub fn is_superuser(&self) -> bool {
        self.user.is_superuser
    }

    pub fn department(&self) -> Option<Department> {
        self.employee.as_ref().map(|employee| employee.department)
    }

    pub fn employee_id(&self) -> Option<Uuid> {
        self.employee.as_ref().map(|employee| employee.id)
    }
}

/// Authentication middleware that resolves the bearer token into a [`CurrentUser`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = request.headers().clone();

    // Extract trace_id from request context for consistent error responses
    let trace_id = request
        .extensions()
        .get::<TraceContext>()
        .map(|ctx| ctx.trace_id.clone());

    let token = extract_bearer_token(&headers, trace_id.clone())?;
    let claims = decode_token(&state.config, token, TokenKind::Access)?;

    let user = User::find_by_id(claims.sub)
        .one(&state.db)
        .await
        .map_err(ApiError::from)?
        .filter(|user| user.is_active)
        .ok_or_else(|| match trace_id {
            Some(trace_id) => unauthorized_with_trace_id(
                Some("Le jeton n'est pas valide ou a expiré."),
                trace_id,
            ),
            None => unauthorized(Some("Le jeton n'est pas valide ou a expiré.")),
        })?;

    let employee = Employee::find()
        .filter(employee::Column::UserId.eq(user.id))
        .one(&state.db)
        .await
        .map_err(ApiError::from)?;

    tracing::debug!(user_id = %user.id, "Authenticated request");

    let mut request = request;
    request
        .extensions_mut()
        .insert(CurrentUser { user, employee });

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap, trace_id: Option<String>) -> Result<&str, ApiError> {
    let fail = |message: &str| match trace_id.clone() {
        Some(trace_id) => unauthorized_with_trace_id(Some(message), trace_id),
        None => unauthorized(Some(message)),
    };

    headers
        .get(AUTHORIZATION)
        .ok_or_else(|| fail("Missing Authorization header"))
        .and_then(|value| {
            value
                .to_str()
                .map_err(|_| fail("Invalid Authorization header"))
        })
        .and_then(|header| {
            header
                .strip_prefix("Bearer ")
                .ok_or_else(|| fail("Authorization header must use Bearer scheme"))
        })
}

impl<S> FromRequestParts<S> for CurrentUser
where
    Arc<AppConfig>: axum::extract::FromRef<S>,
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Authentication required")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            jwt_secret: "test-secret-test-secret-test-secret!".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert_ne!(hash, "correct horse battery staple");
        assert!(verify_password("correct horse battery staple", &hash));
        assert!(!verify_password("wrong password", &hash));
    }

    #[test]
    fn verify_rejects_malformed_hash() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn issued_access_token_decodes() {
        let config = test_config();
        let user_id = Uuid::new_v4();

        let issued = issue_token(&config, user_id, TokenKind::Access).unwrap();
        let claims = decode_token(&config, &issued.token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.token_type, TokenKind::Access);
    }

    #[test]
    fn refresh_token_rejected_where_access_expected() {
        let config = test_config();
        let issued = issue_token(&config, Uuid::new_v4(), TokenKind::Refresh).unwrap();

        let result = decode_token(&config, &issued.token, TokenKind::Access);
        assert!(result.is_err());
    }

    #[test]
    fn token_with_wrong_secret_rejected() {
        let config = test_config();
        let issued = issue_token(&config, Uuid::new_v4(), TokenKind::Access).unwrap();

        let other = AppConfig {
            jwt_secret: "another-secret-another-secret-anoth".to_string(),
            ..Default::default()
        };
        assert!(decode_token(&other, &issued.token, TokenKind::Access).is_err());
    }
}
