use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// Active staff members for reassignment choice lists.
pub async fn list_staff(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let staff = state.staff_dir.list_active().await?;
    Ok(Json(staff))
}
