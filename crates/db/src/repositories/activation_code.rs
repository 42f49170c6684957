//! Activation code repository.

use std::sync::Arc;

use crate::entities::{ActivationCode, activation_code};
use notebook_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// Activation code repository for database operations.
#[derive(Clone)]
pub struct ActivationCodeRepository {
    db: Arc<DatabaseConnection>,
}

impl ActivationCodeRepository {
    /// Create a new activation code repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Newest code issued to `user_id` whose digits match `code`, used or not.
    pub async fn find_latest_by_user_and_code(
        &self,
        user_id: &str,
        code: &str,
    ) -> AppResult<Option<activation_code::Model>> {
        ActivationCode::find()
            .filter(activation_code::Column::UserId.eq(user_id))
            .filter(activation_code::Column::Code.eq(code))
            .order_by_desc(activation_code::Column::CreatedAt)
            .order_by_desc(activation_code::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All codes issued to a user, newest first.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<activation_code::Model>> {
        ActivationCode::find()
            .filter(activation_code::Column::UserId.eq(user_id))
            .order_by_desc(activation_code::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new code.
    pub async fn create(
        &self,
        model: activation_code::ActiveModel,
    ) -> AppResult<activation_code::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a code.
    pub async fn update(
        &self,
        model: activation_code::ActiveModel,
    ) -> AppResult<activation_code::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_code(id: &str, user_id: &str, code: &str) -> activation_code::Model {
        let now = Utc::now();
        activation_code::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            code: code.to_string(),
            created_at: now.into(),
            expires_at: (now + Duration::minutes(15)).into(),
            is_used: false,
        }
    }

    #[tokio::test]
    async fn test_find_latest_by_user_and_code() {
        let code = create_test_code("code1", "user1", "123456");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[code.clone()]])
                .into_connection(),
        );

        let repo = ActivationCodeRepository::new(db);
        let result = repo
            .find_latest_by_user_and_code("user1", "123456")
            .await
            .unwrap();

        assert_eq!(result.unwrap().id, "code1");
    }

    #[tokio::test]
    async fn test_find_by_user_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<activation_code::Model>::new()])
                .into_connection(),
        );

        let repo = ActivationCodeRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert!(result.is_empty());
    }
}
