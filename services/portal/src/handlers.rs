use std::collections::{BTreeMap, BTreeSet};

use axum::{Extension, Json};
use gatehouse::{GrantedPermissions, Identity};
use gatehouse_core::error::AppError;
use serde::Serialize;
use tower_sessions::Session;

const VISITS_KEY: &str = "portal.visits";

// ── GET /me ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub subject: String,
    pub realm_roles: BTreeSet<String>,
    pub client_roles: BTreeMap<String, BTreeSet<String>>,
}

pub async fn me(identity: Identity) -> Json<MeResponse> {
    Json(MeResponse {
        subject: identity.subject,
        realm_roles: identity.realm_roles,
        client_roles: identity.client_roles,
    })
}

// ── GET /admin ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AdminResponse {
    pub subject: String,
    pub realm_roles: BTreeSet<String>,
}

pub async fn admin(identity: Identity) -> Json<AdminResponse> {
    Json(AdminResponse {
        subject: identity.subject,
        realm_roles: identity.realm_roles,
    })
}

// ── GET /documents ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DocumentsResponse {
    pub granted: Vec<String>,
}

pub async fn documents(
    Extension(GrantedPermissions(granted)): Extension<GrantedPermissions>,
) -> Json<DocumentsResponse> {
    Json(DocumentsResponse { granted })
}

// ── GET /visits ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct VisitsResponse {
    pub subject: String,
    pub visits: u64,
}

pub async fn visits(
    identity: Identity,
    session: Session,
) -> Result<Json<VisitsResponse>, AppError> {
    let visits = session
        .get::<u64>(VISITS_KEY)
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .unwrap_or(0)
        + 1;
    session
        .insert(VISITS_KEY, visits)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(VisitsResponse {
        subject: identity.subject,
        visits,
    }))
}
