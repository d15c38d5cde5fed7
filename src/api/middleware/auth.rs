use crate::api::error::AppError;
use crate::utils::auth::{bearer_token, validate_jwt};
use crate::{AppState, entities::prelude::Users};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use sea_orm::EntityTrait;

/// Validates the bearer token and makes its `Claims` available to handlers.
///
/// Runs before the request body is read, so a rejected upload never reaches
/// the ingest pipeline.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| AppError::Unauthorized("Couldn't find JWT".to_string()))?;

    let claims = validate_jwt(token, &state.config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Couldn't validate JWT".to_string()))?;

    // Check if user still exists in DB
    let user_exists = Users::find_by_id(claims.sub.clone())
        .one(&state.db)
        .await?
        .is_some();

    if !user_exists {
        return Err(AppError::Unauthorized("Couldn't validate JWT".to_string()));
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}
