use anyhow::Context;
use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        claims::Identity,
        dto::{AuthResponse, LoginRequest, SignupRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::AppError,
    state::AppState,
    users::{PublicUser, StoreError},
};

pub const MIN_PASSWORD_LEN: usize = 6;
const BAD_CREDENTIALS: &str = "Invalid email or password";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trimmed value, or `None` when absent or blank.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Register a user and return the id the store assigned.
pub async fn signup(state: &AppState, req: &SignupRequest) -> Result<u64, AppError> {
    let (Some(name), Some(email), Some(password)) = (
        present(&req.name),
        present(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Name, email and password are required".into()));
    };

    if !is_valid_email(email) {
        return Err(AppError::Validation("Invalid email".into()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if state.users.find_by_email(email).await?.is_some() {
        warn!(email, "email already registered");
        return Err(StoreError::DuplicateEmail.into());
    }

    let hash = hash_password(password, state.config.hash_cost).context("hash password")?;

    // The unique index still decides when two signups race past the check above.
    let id = state.users.insert(name, email, &hash).await?;
    info!(user_id = id, email, "user registered");
    Ok(id)
}

/// Verify credentials and mint a session token.
pub async fn login(state: &AppState, req: &LoginRequest) -> Result<AuthResponse, AppError> {
    let (Some(email), Some(password)) = (
        present(&req.email),
        req.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::Validation("Email and password are required".into()));
    };

    let Some(user) = state.users.find_by_email(email).await? else {
        warn!(email, "login unknown email");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    };

    if !verify_password(password, &user.password_hash).context("verify password")? {
        warn!(email, user_id = user.id, "login invalid password");
        return Err(AppError::unauthorized(BAD_CREDENTIALS));
    }

    let identity = Identity {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
    };
    let token = JwtKeys::from_ref(state).sign(&identity).context("sign token")?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(AuthResponse {
        token,
        user: PublicUser::from(user),
    })
}

/// Current record for the identity in a verified token.
pub async fn profile(state: &AppState, who: &Identity) -> Result<PublicUser, AppError> {
    match state.users.find_by_id(who.id).await? {
        Some(user) => Ok(user.into()),
        None => {
            warn!(user_id = who.id, "token subject no longer exists");
            Err(AppError::NotFound("User not found".into()))
        }
    }
}
