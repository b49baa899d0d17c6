//! Account service: registration, login, refresh and password changes
//!
//! Password hashing and verification run on the blocking thread pool.

use crate::auth::{Identity, PasswordService, SessionIssuer};
use crate::error::ApiError;
use crate::repositories::{NewUser, UserStore};
use storefront_shared::{
    validation::{normalize_email, validate_email, validate_name, validate_password},
    AuthError, ChangePasswordRequest, LoginRequest, RegisterRequest, Role, TokenPair, User,
    UserProfile,
};
use tracing::{info, warn};
use uuid::Uuid;

/// Account operations
pub struct UserService;

impl UserService {
    /// Register a new customer account and open a session for it
    pub async fn register(
        store: &dyn UserStore,
        sessions: &SessionIssuer,
        req: RegisterRequest,
    ) -> Result<(UserProfile, TokenPair), ApiError> {
        let email = normalize_email(&req.email);
        validate_email(&email).map_err(|msg| ApiError::invalid_field("email", msg))?;
        validate_name(&req.name).map_err(|msg| ApiError::invalid_field("name", msg))?;
        validate_password(&req.password).map_err(AuthError::WeakPassword)?;

        if store.find_by_email(&email).await?.is_some() {
            return Err(AuthError::DuplicateEmail.into());
        }

        let password_hash = PasswordService::hash_async(req.password).await?;

        // The store still enforces uniqueness if a concurrent registration wins the race
        let user = store
            .create(NewUser {
                email,
                name: req.name.trim().to_string(),
                role: Role::Customer,
                password_hash,
            })
            .await?;

        let tokens = sessions.issue(&identity_of(&user))?;
        info!(user_id = %user.id, "User registered");

        Ok((profile_of(&user), tokens))
    }

    /// Log in with email and password
    ///
    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn login(
        store: &dyn UserStore,
        sessions: &SessionIssuer,
        req: LoginRequest,
    ) -> Result<(UserProfile, TokenPair), ApiError> {
        let email = normalize_email(&req.email);

        let Some(user) = store.find_by_email(&email).await? else {
            PasswordService::verify_decoy_async(req.password).await;
            info!("Login failed: unknown account");
            return Err(AuthError::InvalidCredentials.into());
        };

        let valid = PasswordService::verify_async(req.password.clone(), user.password_hash.clone())
            .await;
        if !valid {
            info!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        if PasswordService::needs_rehash(&user.password_hash) {
            Self::upgrade_hash(store, user.id, req.password).await;
        }

        let tokens = sessions.issue(&identity_of(&user))?;
        info!(user_id = %user.id, "User logged in");

        Ok((profile_of(&user), tokens))
    }

    /// Replace a legacy hash with argon2; failures only cost the upgrade
    async fn upgrade_hash(store: &dyn UserStore, user_id: Uuid, password: String) {
        let result = match PasswordService::hash_async(password).await {
            Ok(hash) => store.update_password(user_id, &hash).await.map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };
        match result {
            Ok(()) => info!(user_id = %user_id, "Upgraded legacy password hash"),
            Err(e) => warn!(user_id = %user_id, "Failed to upgrade legacy password hash: {}", e),
        }
    }

    /// Exchange a refresh token for a new access token
    ///
    /// Stateless: the account is not looked up again.
    pub fn refresh(sessions: &SessionIssuer, refresh_token: &str) -> Result<String, ApiError> {
        Ok(sessions.refresh_access(refresh_token)?)
    }

    /// Get user profile
    pub async fn profile(store: &dyn UserStore, user_id: Uuid) -> Result<UserProfile, ApiError> {
        let user = store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(profile_of(&user))
    }

    /// Change the password after re-verifying the current one
    ///
    /// Tokens issued before the change stay valid until they expire.
    pub async fn change_password(
        store: &dyn UserStore,
        user_id: Uuid,
        req: ChangePasswordRequest,
    ) -> Result<(), ApiError> {
        let user = store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let current_ok =
            PasswordService::verify_async(req.current_password.clone(), user.password_hash.clone())
                .await;
        if !current_ok {
            info!(user_id = %user_id, "Password change refused: current password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        validate_password(&req.new_password).map_err(AuthError::WeakPassword)?;
        if req.new_password == req.current_password {
            return Err(ApiError::invalid_field(
                "newPassword",
                "New password must differ from the current password",
            ));
        }

        let new_hash = PasswordService::hash_async(req.new_password).await?;
        store.update_password(user_id, &new_hash).await?;
        info!(user_id = %user_id, "Password changed");

        Ok(())
    }
}

fn identity_of(user: &User) -> Identity {
    Identity {
        user_id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
    }
}

fn profile_of(user: &User) -> UserProfile {
    UserProfile {
        id: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        created_at: user.created_at,
    }
}
