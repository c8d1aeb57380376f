//! User registration, login and profile.

use std::sync::Arc;

use clipvote_db::{is_unique_violation, DbPool, UserRepo};
use clipvote_models::User;

use crate::auth::TokenManager;
use crate::dto::{LoginRequest, LoginResponse, SignupRequest, UserResponse};
use crate::error::{ApiError, ApiResult};
use crate::password;

/// Account management and credential checks.
#[derive(Clone)]
pub struct UserService {
    pool: DbPool,
    jwt: Arc<TokenManager>,
}

impl UserService {
    pub fn new(pool: DbPool, jwt: Arc<TokenManager>) -> Self {
        Self { pool, jwt }
    }

    /// Register a new user.
    pub async fn signup(&self, req: SignupRequest) -> ApiResult<UserResponse> {
        if req.password1 != req.password2 {
            return Err(ApiError::bad_request("passwords do not match"));
        }
        if req.email.is_empty() || !req.email.contains('@') {
            return Err(ApiError::bad_request("invalid email address"));
        }

        if UserRepo::email_exists(&self.pool, &req.email).await? {
            return Err(ApiError::conflict("email already exists"));
        }

        let password_hash = password::hash_password(&req.password1)
            .map_err(|_| ApiError::internal("failed to process password"))?;

        let user = match UserRepo::create(
            &self.pool,
            &req.first_name,
            &req.last_name,
            &req.email,
            &password_hash,
            &req.city,
            &req.country,
        )
        .await
        {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => {
                return Err(ApiError::conflict("email already exists"))
            }
            Err(e) => return Err(e.into()),
        };

        Ok(user.into())
    }

    /// Verify credentials and mint a bearer token.
    ///
    /// Wrong email and wrong password produce the same error so the
    /// endpoint cannot be used to enumerate accounts.
    pub async fn login(&self, req: LoginRequest) -> ApiResult<LoginResponse> {
        let user = UserRepo::find_by_email(&self.pool, &req.email)
            .await?
            .ok_or_else(|| ApiError::unauthorized("invalid email or password"))?;

        let valid = password::verify_password(&req.password, &user.password_hash)
            .map_err(|_| ApiError::internal("failed to verify password"))?;
        if !valid {
            return Err(ApiError::unauthorized("invalid email or password"));
        }

        let token = self
            .jwt
            .create_token(&user)
            .map_err(|_| ApiError::internal("failed to generate token"))?;

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Fetch the caller's profile.
    pub async fn profile(&self, user_id: i64) -> ApiResult<User> {
        UserRepo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| ApiError::not_found("user not found"))
    }
}
