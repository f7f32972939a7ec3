//! Minimal tenant/principal model. Full account management (signup,
//! password reset, invitations) is an external collaborator per §1's
//! Non-goals; this crate models only enough of `Workspace`/`User` to scope
//! every authoritative entity and authenticate Management API callers.

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub plan_tier: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
