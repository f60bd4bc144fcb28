use axum::{Json, extract::State, http::StatusCode};
use database::services::user::UserService;

use crate::dtos::auth::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use crate::error::ApiErr;
use crate::security::{self, AuthPrincipal};
use crate::state::AppState;

/// Exchange account credentials for a bearer token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = TokenResponse),
        (status = 401, description = "Unknown username or wrong password")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiErr> {
    let user = UserService::find_by_username(&state.db, &body.username)
        .await?
        .ok_or_else(|| ApiErr::unauthorized("invalid credentials"))?;

    // Same response for unknown user and wrong password.
    if !security::verify_password(&body.password, &user.password_hash) {
        return Err(ApiErr::unauthorized("invalid credentials"));
    }

    let token =
        security::issue_token(&state.jwt_secret, user.id, user.role).map_err(ApiErr::internal)?;
    Ok(Json(TokenResponse { token }))
}

/// Provision a new account (administrators only)
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 403, description = "Caller is not an administrator"),
        (status = 409, description = "Username already taken")
    ),
    security(("jwt" = [])),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    AuthPrincipal(principal): AuthPrincipal,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiErr> {
    if !principal.is_admin() {
        return Err(ApiErr::forbidden("only administrators may create accounts"));
    }

    let hash = security::hash_password(&body.password).map_err(ApiErr::internal)?;
    let user = UserService::create_account(&state.db, &body.username, &hash, body.role).await?;
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}
