//! # Seed Data
//!
//! Idempotent seeding executed at startup. Only the configured superuser is
//! seeded; every other account is created through the employees API.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::auth;
use crate::config::AppConfig;
use crate::models::{User, user};

/// Create the configured superuser account if it does not exist yet.
pub async fn seed_superuser(db: &DatabaseConnection, config: &AppConfig) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (&config.superuser_email, &config.superuser_password)
    else {
        return Ok(());
    };

    let existing = User::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(db)
        .await?;
    if existing.is_some() {
        tracing::debug!(%email, "Superuser already present, skipping seed");
        return Ok(());
    }

    let password_hash = auth::hash_password(password)
        .map_err(|err| anyhow::anyhow!("password hashing failed: {err}"))?;

    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.clone()),
        password_hash: Set(password_hash),
        is_active: Set(true),
        is_staff: Set(true),
        is_superuser: Set(true),
        date_joined: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    tracing::info!(%email, "Superuser seeded");
    Ok(())
}
