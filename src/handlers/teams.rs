//! Team registry handlers

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::validation::{validate_contact_email, validate_team_name};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use super::AppState;

/// Empty addresses clear the contact
fn normalize_email(email: Option<&str>) -> Option<&str> {
    email.map(str::trim).filter(|e| !e.is_empty())
}

pub async fn list_teams(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let teams = db::teams::list(&state.pool).await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(teams))))
}

pub async fn create_team(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(input): Json<CreateTeam>,
) -> AppResult<impl IntoResponse> {
    validate_team_name(&input.name)?;
    let contact_email = normalize_email(input.contact_email.as_deref());
    validate_contact_email(contact_email)?;

    let team = db::teams::insert(&state.pool, input.name.trim(), contact_email).await?;

    tracing::info!("Team '{}' created by {}", team.name, user.uid);
    Ok((StatusCode::CREATED, Json(ApiResponse::success(team))))
}

/// Rename a team and/or change its contact. A new name is carried into all
/// results in the same transaction.
pub async fn update_team(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTeam>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_team_name(name)?;
    }
    let contact_email = normalize_email(input.contact_email.as_deref());
    validate_contact_email(contact_email)?;

    let mut tx = state.pool.begin().await?;

    let mut team = db::teams::find(&mut *tx, id)
        .await?
        .ok_or_else(|| AppError::not_found("Team"))?;

    if let Some(name) = input.name.as_deref().map(str::trim) {
        if name != team.name {
            team = db::teams::rename(&mut *tx, id, name)
                .await?
                .ok_or_else(|| AppError::not_found("Team"))?;
            tracing::info!("Team {} renamed to '{}' by {}", id, name, user.uid);
        }
    }

    if input.contact_email.is_some() {
        team = db::teams::update_contact(&mut *tx, id, contact_email)
            .await?
            .ok_or_else(|| AppError::not_found("Team"))?;
    }

    tx.commit().await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(team))))
}
