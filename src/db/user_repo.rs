// src/db/user_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::auth::{User, UserRole},
    models::loan::Connector,
};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  USERS
    // =========================================================================

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        full_name: &str,
        role: UserRole,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, role)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .bind(role)
        .fetch_one(executor)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    // =========================================================================
    //  CONNECTOR PROFILES
    // =========================================================================

    pub async fn create_connector<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        city: &str,
        commission_percentage: Decimal,
    ) -> Result<Connector, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let connector = sqlx::query_as::<_, Connector>(
            r#"
            INSERT INTO connectors (user_id, city, commission_percentage)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(city)
        .bind(commission_percentage)
        .fetch_one(executor)
        .await?;

        Ok(connector)
    }

    pub async fn find_connector_by_user(&self, user_id: Uuid) -> Result<Option<Connector>, AppError> {
        let connector =
            sqlx::query_as::<_, Connector>("SELECT * FROM connectors WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(connector)
    }

    pub async fn find_connector<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Connector>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let connector = sqlx::query_as::<_, Connector>("SELECT * FROM connectors WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(connector)
    }

    /// Bumps the connector's disbursed-case counter. Runs inside the same
    /// transaction as the tranche that first fully disburses the application.
    pub async fn increment_approved_cases<'e, E>(
        &self,
        executor: E,
        connector_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE connectors SET total_approved_cases = total_approved_cases + 1 WHERE id = $1",
        )
        .bind(connector_id)
        .execute(executor)
        .await?;

        Ok(())
    }
}
