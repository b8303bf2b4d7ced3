//! Authentication route handlers: sign-in, sign-up, sign-out.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::set_current_user;
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Sign-in body.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub username: String,
    pub password: String,
}

/// Sign-up body. `name` becomes the profile's full name.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    #[serde(default)]
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Sign in with username and password.
#[instrument(skip(state, session, form))]
pub async fn sign_in(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<SignInForm>,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&form.username, &form.password).await?;

    // Fresh session ID on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!(user = %user.id, "signed in");

    Ok(StatusCode::OK)
}

/// Register a new account and sign it in.
#[instrument(skip(state, session, form))]
pub async fn sign_up(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<SignUpForm>,
) -> Result<StatusCode> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .register(form.name.trim(), form.username.trim(), &form.password)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;
    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    tracing::info!(user = %user.id, "signed up");

    Ok(StatusCode::OK)
}

/// Sign out: the whole session is discarded, anonymous basket included.
#[instrument(skip(session))]
pub async fn sign_out(session: Session) -> Result<StatusCode> {
    session
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("session error: {e}")))?;

    Ok(StatusCode::OK)
}
