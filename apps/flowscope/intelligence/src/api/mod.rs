use axum::Router;
use domain_intelligence::handlers;

use crate::state::AppState;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(state: &AppState) -> Router {
    handlers::router(state.service.clone())
}

/// Root-level `/ready`: 200 once the completion API key is configured.
pub fn ready_router(state: &AppState) -> Router {
    handlers::ready_router(state.service.clone())
}
