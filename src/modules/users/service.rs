use anyhow::anyhow;
use axum::http::StatusCode;
use sqlx::PgPool;
use uuid::Uuid;

use warden_core::AppError;
use warden_db::{RepoError, api_keys, users};
use warden_models::{
    ApiKeySummary, CreateApiKeyDto, CreatedApiKey, PaginationParams, UpdateUserDto, User,
};

pub struct UserService;

fn repo_error(e: RepoError) -> AppError {
    match e {
        RepoError::Validation(errors) => AppError::unprocessable(errors),
        RepoError::Conflict(message) => AppError::new(StatusCode::CONFLICT, anyhow!(message)),
        RepoError::InvalidLookup(message) => AppError::bad_request(anyhow!(message)),
        e @ RepoError::UnknownRole(_) => AppError::not_found(e),
        e => AppError::database(e),
    }
}

fn user_not_found(id: Uuid) -> AppError {
    AppError::not_found(anyhow!("User with id {} not found", id))
}

impl UserService {
    pub async fn get_user(db: &PgPool, id: Uuid) -> Result<User, AppError> {
        users::find_user_by_id(db, id)
            .await
            .map_err(repo_error)?
            .ok_or_else(|| user_not_found(id))
    }

    pub async fn list_users(db: &PgPool, params: &PaginationParams) -> Result<Vec<User>, AppError> {
        users::list_users(db, params.limit(), params.offset())
            .await
            .map_err(repo_error)
    }

    pub async fn update_user(db: &PgPool, id: Uuid, dto: UpdateUserDto) -> Result<User, AppError> {
        users::update_user_names(db, id, &dto)
            .await
            .map_err(repo_error)?
            .ok_or_else(|| user_not_found(id))
    }

    pub async fn list_api_keys(db: &PgPool, user_id: Uuid) -> Result<Vec<ApiKeySummary>, AppError> {
        let keys = api_keys::list_api_keys(db, user_id)
            .await
            .map_err(repo_error)?;
        Ok(keys.into_iter().map(ApiKeySummary::from).collect())
    }

    pub async fn create_api_key(
        db: &PgPool,
        user_id: Uuid,
        dto: CreateApiKeyDto,
    ) -> Result<CreatedApiKey, AppError> {
        Self::get_user(db, user_id).await?;

        let key = api_keys::create_api_key(db, user_id, dto.name.as_deref())
            .await
            .map_err(repo_error)?;
        Ok(CreatedApiKey::from(key))
    }

    pub async fn revoke_api_key(db: &PgPool, user_id: Uuid, key_id: i32) -> Result<(), AppError> {
        let revoked = api_keys::revoke_api_key(db, user_id, key_id)
            .await
            .map_err(repo_error)?;

        if revoked {
            Ok(())
        } else {
            Err(AppError::not_found(anyhow!(
                "API key {} not found for user {}",
                key_id,
                user_id
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_map_to_statuses() {
        assert_eq!(
            repo_error(RepoError::Conflict("duplicate".into())).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            repo_error(RepoError::InvalidLookup("empty".into())).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            repo_error(RepoError::UnknownRole("auditor".into())).status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            repo_error(RepoError::Db(sqlx::Error::PoolTimedOut)).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
