//! Activation code service.
//!
//! Codes are six random digits that expire fifteen minutes after issue and
//! can be used once.

use chrono::{DateTime, Duration, Utc};
use notebook_common::{AppResult, IdGenerator};
use notebook_db::{entities::activation_code, repositories::ActivationCodeRepository};
use rand::Rng;
use sea_orm::Set;
use tracing::info;

/// Digits in a code.
pub const CODE_LENGTH: usize = 6;

/// How long a code stays valid after it is issued.
pub const CODE_TTL_MINUTES: i64 = 15;

/// Outcome of a validity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeValidity {
    Valid,
    AlreadyUsed,
    Expired,
}

impl CodeValidity {
    /// Evaluate a code at `now`. Use beats expiry: a used code reports
    /// "already used" even after it has expired.
    #[must_use]
    pub fn check_at(code: &activation_code::Model, now: DateTime<Utc>) -> Self {
        if code.is_used {
            Self::AlreadyUsed
        } else if now > code.expires_at {
            Self::Expired
        } else {
            Self::Valid
        }
    }

    /// Evaluate a code now.
    #[must_use]
    pub fn check(code: &activation_code::Model) -> Self {
        Self::check_at(code, Utc::now())
    }

    #[must_use]
    pub const fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Human-readable reason, `"valid"` when valid.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::AlreadyUsed => "already used",
            Self::Expired => "expired",
        }
    }
}

/// Six uniformly random decimal digits. Collisions are not checked.
#[must_use]
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect()
}

/// Activation code service for business logic.
#[derive(Clone)]
pub struct ActivationCodeService {
    code_repo: ActivationCodeRepository,
    id_gen: IdGenerator,
}

impl ActivationCodeService {
    /// Create a new activation code service.
    #[must_use]
    pub const fn new(code_repo: ActivationCodeRepository) -> Self {
        Self {
            code_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Issue a fresh code for a user. Earlier codes stay valid.
    pub async fn create_for_user(&self, user_id: &str) -> AppResult<activation_code::Model> {
        let now = Utc::now();

        let model = activation_code::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            code: Set(generate_code()),
            created_at: Set(now.into()),
            expires_at: Set((now + Duration::minutes(CODE_TTL_MINUTES)).into()),
            is_used: Set(false),
        };

        let code = self.code_repo.create(model).await?;
        info!(user_id = %user_id, code_id = %code.id, "Issued activation code");
        Ok(code)
    }

    /// Newest code a user holds with these digits.
    pub async fn find_for_user(
        &self,
        user_id: &str,
        code: &str,
    ) -> AppResult<Option<activation_code::Model>> {
        self.code_repo
            .find_latest_by_user_and_code(user_id, code)
            .await
    }

    /// Mark a code used. Only `is_used` is written; repeating it is harmless.
    pub async fn mark_as_used(
        &self,
        code: activation_code::Model,
    ) -> AppResult<activation_code::Model> {
        let mut active: activation_code::ActiveModel = code.into();
        active.is_used = Set(true);
        self.code_repo.update(active).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_code(is_used: bool, expires_in_minutes: i64) -> activation_code::Model {
        let now = Utc::now();
        activation_code::Model {
            id: "code1".to_string(),
            user_id: "user1".to_string(),
            code: "123456".to_string(),
            created_at: now.into(),
            expires_at: (now + Duration::minutes(expires_in_minutes)).into(),
            is_used,
        }
    }

    #[test]
    fn test_generate_code_is_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_fresh_code_is_valid() {
        let validity = CodeValidity::check(&create_test_code(false, 15));
        assert!(validity.is_valid());
        assert_eq!(validity.reason(), "valid");
    }

    #[test]
    fn test_used_code_reports_used_before_expiry() {
        let validity = CodeValidity::check(&create_test_code(true, -60));
        assert_eq!(validity, CodeValidity::AlreadyUsed);
        assert!(!validity.is_valid());
        assert_eq!(validity.reason(), "already used");
    }

    #[test]
    fn test_expired_code() {
        let validity = CodeValidity::check(&create_test_code(false, -1));
        assert_eq!(validity, CodeValidity::Expired);
        assert_eq!(validity.reason(), "expired");
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let code = create_test_code(false, 15);
        let at_expiry: DateTime<Utc> = code.expires_at.into();
        assert!(CodeValidity::check_at(&code, at_expiry).is_valid());
        assert_eq!(
            CodeValidity::check_at(&code, at_expiry + Duration::seconds(1)),
            CodeValidity::Expired
        );
    }

    #[tokio::test]
    async fn test_mark_as_used() {
        let code = create_test_code(false, 15);
        let used = activation_code::Model {
            is_used: true,
            ..code.clone()
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[used]])
                .into_connection(),
        );

        let service = ActivationCodeService::new(ActivationCodeRepository::new(db));
        let result = service.mark_as_used(code).await.unwrap();

        assert!(result.is_used);
        assert_eq!(CodeValidity::check(&result), CodeValidity::AlreadyUsed);
    }

    #[tokio::test]
    async fn test_create_for_user_sets_expiry() {
        let code = create_test_code(false, 15);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[code.clone()]])
                .into_connection(),
        );

        let service = ActivationCodeService::new(ActivationCodeRepository::new(db));
        let result = service.create_for_user("user1").await.unwrap();

        assert_eq!(result.user_id, "user1");
        assert!(!result.is_used);
        assert!(result.expires_at > result.created_at);
    }
}
