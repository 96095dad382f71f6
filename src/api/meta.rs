//! Revision and contact endpoints.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::{ContactInfo, RevisionInfo};
use crate::AppState;

/// GET /api/datastore/revision - Get current revision info (for polling).
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.repo.get_revision_info().await {
        Ok(info) => {
            let revision_id = info.revision_id;
            success(info, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/contact - Where to send questions about the app.
pub async fn get_contact(State(state): State<AppState>) -> ApiResult<ContactInfo> {
    let revision_id = super::current_revision(&state).await;
    success(state.config.contact(), revision_id)
}
