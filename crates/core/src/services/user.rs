//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use notebook_common::{AppError, AppResult, IdGenerator};
use notebook_db::{
    entities::{activation_code, user},
    repositories::{NoteRepository, NoteStats, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::services::activation_code::{ActivationCodeService, CodeValidity};

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    note_repo: NoteRepository,
    activation: ActivationCodeService,
    id_gen: IdGenerator,
}

/// Input for creating a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    /// Must equal `password`.
    pub password_confirm: String,
}

/// Input for signing in.
#[derive(Debug, Deserialize, Validate)]
pub struct SigninInput {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for activating an account.
#[derive(Debug, Deserialize, Validate)]
pub struct ActivateInput {
    #[validate(length(min = 1))]
    pub username: String,

    #[validate(length(equal = 6))]
    pub code: String,
}

/// A freshly created account and the activation code issued for it.
pub struct Signup {
    pub user: user::Model,
    pub activation_code: activation_code::Model,
}

/// Profile counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_notes: u64,
    pub favorite_notes: u64,
    pub public_notes: u64,
    pub total_views: i64,
}

impl From<NoteStats> for ProfileStats {
    fn from(stats: NoteStats) -> Self {
        Self {
            total_notes: stats.total,
            favorite_notes: stats.favorites,
            public_notes: stats.public,
            total_views: stats.total_views,
        }
    }
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        note_repo: NoteRepository,
        activation: ActivationCodeService,
    ) -> Self {
        Self {
            user_repo,
            note_repo,
            activation,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create an account and issue its first activation code.
    ///
    /// The account can sign in straight away; activation only sets
    /// `is_active`.
    pub async fn signup(&self, input: SignupInput) -> AppResult<Signup> {
        input.validate()?;

        if input.password != input.password_confirm {
            return Err(AppError::Validation(
                "password_confirm: Passwords do not match".to_string(),
            ));
        }

        if self.user_repo.username_exists(&input.username).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email),
            password_hash: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            is_active: Set(false),
            created_at: Set(Utc::now().into()),
        };

        let user = self.user_repo.create(model).await?;
        let activation_code = self.activation.create_for_user(&user.id).await?;

        // Delivery is outside this service; the code is only logged.
        debug!(user_id = %user.id, code = %activation_code.code, "Activation code ready for delivery");
        info!(user_id = %user.id, username = %user.username, "User signed up");

        Ok(Signup {
            user,
            activation_code,
        })
    }

    /// Check a username and password. Returns the user with a usable token.
    pub async fn signin(&self, input: SigninInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        if user.token.is_some() {
            return Ok(user);
        }

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        self.user_repo.update(active).await
    }

    /// Invalidate the current token by replacing it.
    pub async fn signout(&self, user_id: &str) -> AppResult<()> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(self.id_gen.generate_token()));
        self.user_repo.update(active).await?;

        info!(user_id = %user_id, "User signed out");
        Ok(())
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Redeem an activation code.
    ///
    /// A valid code is marked used and the account activated. Used and
    /// expired codes come back as the corresponding [`CodeValidity`] with
    /// nothing written. Unknown usernames and codes are `NotFound`.
    pub async fn activate(&self, input: ActivateInput) -> AppResult<CodeValidity> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .ok_or_else(|| AppError::NotFound("activation code".to_string()))?;

        let code = self
            .activation
            .find_for_user(&user.id, &input.code)
            .await?
            .ok_or_else(|| AppError::NotFound("activation code".to_string()))?;

        let validity = CodeValidity::check(&code);
        if !validity.is_valid() {
            debug!(user_id = %user.id, reason = validity.reason(), "Activation code rejected");
            return Ok(validity);
        }

        self.activation.mark_as_used(code).await?;

        if !user.is_active {
            let user_id = user.id.clone();
            let mut active: user::ActiveModel = user.into();
            active.is_active = Set(true);
            self.user_repo.update(active).await?;
            info!(user_id = %user_id, "User activated");
        }

        Ok(validity)
    }

    /// Issue another activation code.
    pub async fn resend_activation(&self, user_id: &str) -> AppResult<activation_code::Model> {
        let user = self.user_repo.get_by_id(user_id).await?;
        if user.is_active {
            return Err(AppError::BadRequest("Account is already active".to_string()));
        }

        let code = self.activation.create_for_user(&user.id).await?;
        debug!(user_id = %user.id, code = %code.code, "Activation code ready for delivery");
        Ok(code)
    }

    /// Counters for the profile page.
    pub async fn stats(&self, user_id: &str) -> AppResult<ProfileStats> {
        Ok(self.note_repo.stats_for_user(user_id).await?.into())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
