use app_config::JwtConfig;
use app_database::service::DbService;
use app_error::{AppError, AppResult};
use app_models::user::{
    AuthTokenResponse, LoginInput, SignupInput, UpdateUserInput, User, UserProfile,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{Claims, JwtService, password, validation};

/// Trait defining the account service interface
#[async_trait]
pub trait AuthServiceTrait: Send + Sync {
    /// Register a new account
    async fn signup(&self, input: SignupInput) -> AppResult<UserProfile>;

    /// Exchange credentials for a bearer token
    async fn login(&self, input: LoginInput) -> AppResult<AuthTokenResponse>;

    /// Confirm an active session and read back its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    async fn list_users(&self) -> AppResult<Vec<UserProfile>>;

    async fn get_user(&self, user_id: &str) -> AppResult<UserProfile>;

    /// Self-service only: the token subject must match the target id
    async fn update_user(
        &self,
        claims: &Claims,
        user_id: &str,
        input: UpdateUserInput,
    ) -> AppResult<UserProfile>;

    /// Self-service only: the token subject must match the target id
    async fn delete_user(&self, claims: &Claims, user_id: &str) -> AppResult<()>;

    /// Get the JWT service
    fn get_jwt_service(&self) -> Arc<JwtService>;
}

/// Implementation of the account service. All collaborators are passed in
/// at construction; there is no ambient state beyond the read-only secret
/// inside [`JwtService`], so calls are safe to run concurrently.
pub struct AuthService {
    jwt_service: Arc<JwtService>,
    user_db: Arc<DbService<User>>,
    password_min_length: usize,
}

impl AuthService {
    pub fn new(
        jwt_config: &JwtConfig,
        user_db: Arc<DbService<User>>,
        password_min_length: usize,
    ) -> Self {
        Self {
            jwt_service: Arc::new(JwtService::new(&jwt_config.secret, jwt_config.expiry_hours)),
            user_db,
            password_min_length,
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Vec<User>> {
        self.user_db
            .get_records_by_field("email", email.to_string())
            .await
    }
}

#[async_trait]
impl AuthServiceTrait for AuthService {
    fn get_jwt_service(&self) -> Arc<JwtService> {
        Arc::clone(&self.jwt_service)
    }

    async fn signup(&self, input: SignupInput) -> AppResult<UserProfile> {
        let email = validation::sanitize_string(&input.email);
        let name = validation::sanitize_string(&input.name);
        let password = input.password; // Never trimmed

        if email.is_empty() || password.is_empty() || name.is_empty() {
            return Err(AppError::ValidationError(vec![
                "Please provide email, password, and name".to_string(),
            ]));
        }

        // Field-level checks, reported together
        let mut field_errors = Vec::new();
        for check in [
            validation::validate_email(&email),
            validation::validate_password(&password, self.password_min_length),
            validation::validate_name(&name),
        ] {
            if let Err(AppError::ValidationError(mut messages)) = check {
                field_errors.append(&mut messages);
            }
        }
        if !field_errors.is_empty() {
            return Err(AppError::ValidationError(field_errors));
        }

        // Uniqueness check before the (expensive) hash; the store's unique
        // index is the authoritative guard against races
        if !self.find_by_email(&email).await?.is_empty() {
            return Err(AppError::ConflictError(
                "An account with this email already exists".to_string(),
            ));
        }

        let hashed_password = password::hash_password(&password)?;
        let user = User::new(email, name, hashed_password);

        info!("Storing new user: {}", user.id.id);
        let stored = self
            .user_db
            .create_record(user.clone())
            .await?
            .unwrap_or(user);

        Ok(UserProfile::from(stored))
    }

    async fn login(&self, input: LoginInput) -> AppResult<AuthTokenResponse> {
        let email = validation::sanitize_string(&input.email);
        let password = input.password; // Never trimmed

        if email.is_empty() || password.is_empty() {
            return Err(AppError::ValidationError(vec![
                "Please provide email and password".to_string(),
            ]));
        }

        let users = self.find_by_email(&email).await?;

        let Some(user) = users.first() else {
            // Same error as a wrong password: no account enumeration
            warn!("Login attempt for unknown email");
            return Err(AppError::invalid_credentials());
        };

        let is_valid = password::verify_password(&password, &user.password)?;
        if !is_valid {
            return Err(AppError::invalid_credentials());
        }

        let token = self.jwt_service.generate_token(
            &user.id.id.to_string(),
            &user.email,
            &user.name,
        )?;

        Ok(AuthTokenResponse { auth_token: token })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.jwt_service.validate_token(token)
    }

    async fn list_users(&self) -> AppResult<Vec<UserProfile>> {
        let users = self.user_db.get_all_records().await?;
        Ok(users.into_iter().map(UserProfile::from).collect())
    }

    async fn get_user(&self, user_id: &str) -> AppResult<UserProfile> {
        let user = self
            .user_db
            .get_record_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

        Ok(UserProfile::from(user))
    }

    async fn update_user(
        &self,
        claims: &Claims,
        user_id: &str,
        input: UpdateUserInput,
    ) -> AppResult<UserProfile> {
        if claims.sub != user_id {
            return Err(AppError::AuthorizationError(
                "You can only update your own profile".to_string(),
            ));
        }

        let email = validation::sanitize_string(&input.email);
        let name = validation::sanitize_string(&input.name);

        let mut field_errors = Vec::new();
        for check in [
            validation::validate_email(&email),
            validation::validate_name(&name),
        ] {
            if let Err(AppError::ValidationError(mut messages)) = check {
                field_errors.append(&mut messages);
            }
        }
        if !field_errors.is_empty() {
            return Err(AppError::ValidationError(field_errors));
        }

        let existing = self
            .user_db
            .get_record_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

        // Email uniqueness re-checked when it changes
        if email != existing.email {
            let holders = self.find_by_email(&email).await?;
            if holders.iter().any(|u| u.id != existing.id) {
                return Err(AppError::ConflictError(
                    "An account with this email already exists".to_string(),
                ));
            }
        }

        let updated = User {
            id: existing.id.clone(),
            email,
            name,
            password: existing.password.clone(),
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };

        let stored = self
            .user_db
            .update_record(user_id, updated)
            .await?
            .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

        Ok(UserProfile::from(stored))
    }

    async fn delete_user(&self, claims: &Claims, user_id: &str) -> AppResult<()> {
        if claims.sub != user_id {
            return Err(AppError::AuthorizationError(
                "You can only delete your own account".to_string(),
            ));
        }

        self.user_db
            .delete_record(user_id)
            .await?
            .ok_or_else(|| AppError::NotFoundError("User not found".to_string()))?;

        info!("Deleted user {}", user_id);
        Ok(())
    }
}
