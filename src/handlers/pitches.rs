//! Pitch registry handlers

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::validation::ValidationError;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use validator::Validate;

use super::AppState;

pub async fn list_pitches(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let pitches = db::pitches::list(&state.pool).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(pitches))))
}

pub async fn create_pitch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreatePitch>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(ValidationError::from)?;
    if input.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        }
        .into());
    }

    if let Some(owner) = input.owner_team_id {
        db::teams::find(&state.pool, owner)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
    }

    let pitch = db::pitches::insert(&state.pool, &input).await?;

    tracing::info!(
        "Pitch '{}' created by {} (verified: {})",
        pitch.name,
        user.uid,
        pitch.is_verified
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::success(pitch))))
}
