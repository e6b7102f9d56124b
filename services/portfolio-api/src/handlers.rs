// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the portfolio backend.
//!
//! Contact submissions pass through validation, the admission gate and the
//! spam classifier, in that order, before they are stored.

use crate::classifier::SpamClassifier;
use crate::config::Config;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::limiter::{Admission, AdmissionGate, Clock, SystemClock};
use crate::metrics::{Metrics, OUTCOME_ACCEPTED, OUTCOME_INVALID, OUTCOME_RATE_LIMITED};
use crate::models::{
    group_skills, ContactFilter, ContactReceipt, ContactSubmission, NewContact, NewProject,
    NewSkill, Project, ProjectFilter, ReadUpdate, Skill, SkillFilter,
};
use crate::validator::ContactValidator;
use axum::{
    extract::{ConnectInfo, FromRequest, FromRequestParts, Path, Query, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Serialize;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Header carrying the admin shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared application state.
pub struct AppState {
    pub db: Database,
    pub gate: AdmissionGate,
    pub classifier: SpamClassifier,
    pub validator: ContactValidator,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    /// Build state that reads the wall clock.
    pub fn new(config: Config, db: Database) -> Result<Self> {
        Self::with_clock(config, db, Arc::new(SystemClock))
    }

    /// Build state with an injected clock for the admission gate.
    pub fn with_clock(config: Config, db: Database, clock: Arc<dyn Clock>) -> Result<Self> {
        let metrics = Metrics::new().map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Self {
            db,
            gate: AdmissionGate::with_clock(config.rate_limit.clone(), clock),
            classifier: SpamClassifier::new(&config.spam),
            validator: ContactValidator::new(config.validation.clone()),
            metrics,
            config,
        })
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Caller's network address.
///
/// Taken from the first `X-Forwarded-For` hop when the deployment trusts
/// its proxy, otherwise from the TCP peer. `None` when neither is usable.
#[derive(Debug, Clone, Copy)]
pub struct ClientAddr(pub Option<IpAddr>);

impl ClientAddr {
    /// Rate-limiting key; empty when the address is unknown.
    pub fn source_id(&self) -> String {
        self.0.map(|ip| ip.to_string()).unwrap_or_default()
    }
}

impl FromRequestParts<Arc<AppState>> for ClientAddr {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        if state.config.trust_forwarded_for {
            if let Some(ip) = forwarded_for(&parts.headers) {
                return Ok(Self(Some(ip)));
            }
        }

        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(Self(peer))
    }
}

fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|hop| hop.trim().parse().ok())
}

/// Proof that the request carried the admin key.
#[derive(Debug, Clone, Copy)]
pub struct AdminKey;

impl FromRequestParts<Arc<AppState>> for AdminKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match provided {
            Some(key) if key == state.config.admin_api_key => Ok(Self),
            _ => {
                warn!(path = %parts.uri.path(), "Rejected admin request with bad API key");
                Err(AppError::Unauthorized)
            }
        }
    }
}

/// JSON body whose decoding failures render as [`AppError`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/contact", post(submit_contact).get(list_contacts))
        .route("/api/contact/{id}/read", patch(mark_read))
        .route("/api/projects", get(list_projects).post(create_project))
        .route("/api/skills", get(list_skills).post(create_skill));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "portfolio-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Prometheus exposition endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Result<Response> {
    state.metrics.set_tracked_sources(state.gate.tracked_sources());
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}

/// Accept a contact form submission.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    client: ClientAddr,
    body: std::result::Result<JsonBody<NewContact>, AppError>,
) -> Result<(StatusCode, Json<ContactReceipt>)> {
    let validated = match body {
        Ok(JsonBody(body)) => state.validator.validate(body).map_err(AppError::from),
        Err(err) => Err(err),
    };
    let contact = match validated {
        Ok(contact) => contact,
        Err(err) => {
            state.metrics.record_submission(OUTCOME_INVALID);
            return Err(err);
        }
    };

    let source = client.source_id();
    let admission = state.gate.check(&source);
    state.metrics.set_tracked_sources(state.gate.tracked_sources());

    if let Admission::Rejected { retry_after } = admission {
        info!(
            source = %source,
            retry_after_secs = retry_after.as_secs(),
            "Contact submission rate limited"
        );
        state.metrics.record_submission(OUTCOME_RATE_LIMITED);
        return Err(AppError::RateLimited { retry_after });
    }

    let is_spam = state
        .classifier
        .classify_submission(&contact.subject, &contact.message);
    let created_at = state.gate.clock().now();

    let id = state
        .db
        .insert_contact(&contact, is_spam, &source, created_at)
        .await?;

    state.metrics.record_submission(OUTCOME_ACCEPTED);
    if is_spam {
        state.metrics.spam.inc();
    }
    info!(id, source = %source, is_spam, "Contact submission stored");

    Ok((
        StatusCode::CREATED,
        Json(ContactReceipt {
            id,
            message: "Message sent successfully!".to_string(),
        }),
    ))
}

/// List stored submissions (admin).
pub async fn list_contacts(
    _admin: AdminKey,
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<Vec<ContactSubmission>>> {
    let contacts = state.db.list_contacts(&filter).await?;
    debug!(count = contacts.len(), "Listed contacts");
    Ok(Json(contacts))
}

/// Flip the read flag on a submission (admin).
pub async fn mark_read(
    _admin: AdminKey,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    JsonBody(update): JsonBody<ReadUpdate>,
) -> Result<Json<ContactSubmission>> {
    let contact = state.db.set_contact_read(id, update.is_read).await?;
    Ok(Json(contact))
}

/// List portfolio projects.
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Project>>> {
    Ok(Json(state.db.list_projects(filter.featured).await?))
}

/// Create a portfolio project (admin).
pub async fn create_project(
    _admin: AdminKey,
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NewProject>,
) -> Result<(StatusCode, Json<Project>)> {
    let project = state.validator.validate_project(body)?;
    let project = state.db.insert_project(&project).await?;
    info!(id = project.id, title = %project.title, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// List skills, optionally grouped by category.
pub async fn list_skills(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<SkillFilter>,
) -> Result<Response> {
    let skills = state.db.list_skills().await?;
    if filter.grouped {
        Ok(Json(group_skills(skills)).into_response())
    } else {
        Ok(Json(skills).into_response())
    }
}

/// Create a skill (admin).
pub async fn create_skill(
    _admin: AdminKey,
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody<NewSkill>,
) -> Result<(StatusCode, Json<Skill>)> {
    let skill = state.validator.validate_skill(body)?;
    let skill = state.db.insert_skill(&skill).await?;
    info!(id = skill.id, name = %skill.name, "Skill created");
    Ok((StatusCode::CREATED, Json(skill)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(forwarded_for(&headers), "203.0.113.7".parse().ok());
    }

    #[test]
    fn test_forwarded_for_ignores_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown"));
        assert_eq!(forwarded_for(&headers), None);
        assert_eq!(forwarded_for(&HeaderMap::new()), None);
    }

    #[test]
    fn test_unknown_client_has_empty_source() {
        assert_eq!(ClientAddr(None).source_id(), "");
        assert_eq!(
            ClientAddr(Some("1.2.3.4".parse().unwrap())).source_id(),
            "1.2.3.4"
        );
    }
}
