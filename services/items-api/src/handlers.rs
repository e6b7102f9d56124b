// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the items API.
//!
//! Reads are public; every write needs the shared key, passed as the
//! `api_key` query parameter or the `X-API-Key` header.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{Deleted, Item, ItemEnvelope, ItemId, ItemPatch, ItemSummary, ReadQuery};
use crate::store::ItemStore;
use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, State},
    http::request::Parts,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Shared application state.
pub struct AppState {
    pub store: ItemStore,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            store: ItemStore::new(),
            config,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
struct KeyQuery {
    api_key: Option<String>,
}

/// Proof that the request carried the shared key.
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl FromRequestParts<Arc<AppState>> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let from_query = Query::<KeyQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(q)| q.api_key);
        let from_header = parts
            .headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        match from_query.or(from_header) {
            Some(key) if key == state.config.api_key => Ok(Self),
            _ => {
                warn!(path = %parts.uri.path(), "Rejected request with bad API key");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// JSON body that reports decoding failures as `{"detail": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/items", post(create_item))
        .route(
            "/items/{id}",
            get(get_item)
                .put(update_item)
                .patch(patch_item)
                .delete(delete_item),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "items-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn create_item(
    _key: ApiKey,
    State(state): State<Arc<AppState>>,
    JsonBody(item): JsonBody<Item>,
) -> Result<Json<ItemEnvelope>> {
    let item = item.validate()?;
    let id = state.store.create(item.clone()).await;
    info!(id, name = %item.name, "Item created");
    Ok(Json(ItemEnvelope { id, item }))
}

/// Read an item; the description is only included when asked for.
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
    Query(query): Query<ReadQuery>,
) -> Result<Response> {
    let item = state.store.get(id).await?;
    if query.include_desc {
        Ok(Json(item).into_response())
    } else {
        Ok(Json(ItemSummary::from(item)).into_response())
    }
}

pub async fn update_item(
    _key: ApiKey,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
    JsonBody(item): JsonBody<Item>,
) -> Result<Json<ItemEnvelope>> {
    let item = state.store.replace(id, item.validate()?).await?;
    info!(id, "Item replaced");
    Ok(Json(ItemEnvelope { id, item }))
}

pub async fn patch_item(
    _key: ApiKey,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
    JsonBody(patch): JsonBody<ItemPatch>,
) -> Result<Json<ItemEnvelope>> {
    let item = state.store.patch(id, patch).await?;
    info!(id, "Item patched");
    Ok(Json(ItemEnvelope { id, item }))
}

pub async fn delete_item(
    _key: ApiKey,
    State(state): State<Arc<AppState>>,
    Path(id): Path<ItemId>,
) -> Result<Json<Deleted>> {
    let deleted = state.store.delete(id).await?;
    info!(id, "Item deleted");
    Ok(Json(Deleted { deleted }))
}
