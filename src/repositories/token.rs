//! # Token Repository
//!
//! Registry of outstanding refresh tokens. A refresh token is only honored
//! while its jti row exists, is unexpired, and has not been revoked; logout
//! revokes every outstanding row for the user.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::models::{RefreshToken, refresh_token};

/// Repository for refresh token bookkeeping
pub struct TokenRepository<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TokenRepository<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Record a freshly issued refresh token.
    pub async fn record(
        &self,
        user_id: Uuid,
        jti: Uuid,
        expires_at: chrono::DateTime<Utc>,
    ) -> Result<refresh_token::Model, RepositoryError> {
        let token = refresh_token::ActiveModel {
            id: Set(Uuid::new_v4()),
            jti: Set(jti),
            user_id: Set(user_id),
            expires_at: Set(expires_at.into()),
            revoked: Set(false),
            created_at: Set(Utc::now().into()),
        };

        Ok(token.insert(self.db).await?)
    }

    /// Whether the refresh token with this jti may still be used.
    pub async fn is_active(&self, jti: Uuid) -> Result<bool, RepositoryError> {
        let token = RefreshToken::find()
            .filter(refresh_token::Column::Jti.eq(jti))
            .one(self.db)
            .await?;

        let now = Utc::now();
        Ok(token
            .map(|token| !token.revoked && token.expires_at.with_timezone(&Utc) > now)
            .unwrap_or(false))
    }

    /// Revoke every outstanding refresh token of the user (logout).
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> Result<u64, RepositoryError> {
        let result = RefreshToken::update_many()
            .col_expr(refresh_token::Column::Revoked, sea_orm::sea_query::Expr::value(true))
            .filter(refresh_token::Column::UserId.eq(user_id))
            .filter(refresh_token::Column::Revoked.eq(false))
            .exec(self.db)
            .await?;

        Ok(result.rows_affected)
    }
}
