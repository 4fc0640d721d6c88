use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, ProfileResponse, SignupRequest, SignupResponse},
        extractors::AuthUser,
        services,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        // the bundled form posts here
        .route("/signin", post(login))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let Json(payload) = payload?;
    let id = services::signup(&state, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id,
            message: "User registered successfully".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    Ok(Json(services::login(&state, &payload).await?))
}

#[instrument(skip_all, fields(user_id = who.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(who): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = services::profile(&state, &who).await?;
    Ok(Json(ProfileResponse { user }))
}
