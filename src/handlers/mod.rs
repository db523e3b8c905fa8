//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Epic Events
//! CRM API.

use crate::error::ApiError;
use crate::models::ServiceInfo;
use axum::extract::{FromRequest, Request, rejection::JsonRejection};
use axum::response::Json;

pub mod auth;
pub mod clients;
pub mod contracts;
pub mod employees;
pub mod events;
pub mod locations;
pub mod types;

/// JSON body extractor that reports rejections as problem+json 400s.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}
