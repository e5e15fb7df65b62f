// src/db/application_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::loan::{ApplicationStatus, LoanApplication, LoanCategory},
};

#[derive(Clone)]
pub struct ApplicationRepository {
    pool: PgPool,
}

impl ApplicationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CREATION & LOOKUP
    // =========================================================================

    /// Creates a new application in `submitted` state. The human-readable
    /// application number comes from a sequence, so it is unique without a
    /// read-modify-write round trip.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        connector_id: Uuid,
        loan_category_id: Uuid,
        customer_name: &str,
        customer_city: &str,
        requested_amount: Decimal,
    ) -> Result<LoanApplication, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let application = sqlx::query_as::<_, LoanApplication>(
            r#"
            INSERT INTO loan_applications (
                application_number, connector_id, loan_category_id,
                customer_name, customer_city, requested_amount
            )
            VALUES (
                'LN-' || to_char(NOW(), 'YYYYMM') || '-'
                      || lpad(nextval('loan_application_number_seq')::text, 5, '0'),
                $1, $2, $3, $4, $5
            )
            RETURNING *
            "#,
        )
        .bind(connector_id)
        .bind(loan_category_id)
        .bind(customer_name)
        .bind(customer_city)
        .bind(requested_amount)
        .fetch_one(executor)
        .await?;

        Ok(application)
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<LoanApplication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let application =
            sqlx::query_as::<_, LoanApplication>("SELECT * FROM loan_applications WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(application)
    }

    /// Row-locked fetch. Every mutation of an application goes through this
    /// inside a transaction, so concurrent writers for the same application
    /// are serialized.
    pub async fn lock_by_id<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<LoanApplication>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let application = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(application)
    }

    pub async fn list_all(&self) -> Result<Vec<LoanApplication>, AppError> {
        let applications = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    pub async fn list_by_connector(
        &self,
        connector_id: Uuid,
    ) -> Result<Vec<LoanApplication>, AppError> {
        let applications = sqlx::query_as::<_, LoanApplication>(
            "SELECT * FROM loan_applications WHERE connector_id = $1 ORDER BY created_at DESC",
        )
        .bind(connector_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(applications)
    }

    pub async fn find_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<LoanCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category =
            sqlx::query_as::<_, LoanCategory>("SELECT * FROM loan_categories WHERE id = $1")
                .bind(id)
                .fetch_optional(executor)
                .await?;

        Ok(category)
    }

    // =========================================================================
    //  LIFECYCLE TRANSITIONS
    // =========================================================================

    pub async fn mark_verified<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<LoanApplication, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let application = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications
            SET status = 'verified', verified_at = NOW(), updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;

        Ok(application)
    }

    pub async fn approve<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        approved_amount: Decimal,
        commission_percentage: Decimal,
    ) -> Result<LoanApplication, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let application = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications
            SET status = 'approved',
                approved_amount = $2,
                commission_percentage = $3,
                approved_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(approved_amount)
        .bind(commission_percentage)
        .fetch_one(executor)
        .await?;

        Ok(application)
    }

    pub async fn reject<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        reason: &str,
    ) -> Result<LoanApplication, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let application = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications
            SET status = 'rejected', rejection_reason = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(application)
    }

    // =========================================================================
    //  DISBURSEMENT ACCOUNTING
    // =========================================================================

    /// Applies one accepted tranche to the application row. `disbursed_at` is
    /// written once, the first time the application reaches `disbursed`, and
    /// never overwritten afterwards.
    pub async fn apply_disbursement<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        new_disbursed_total: Decimal,
        commission_delta: Decimal,
        status: ApplicationStatus,
        disbursed_at: Option<DateTime<Utc>>,
    ) -> Result<LoanApplication, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let application = sqlx::query_as::<_, LoanApplication>(
            r#"
            UPDATE loan_applications
            SET disbursed_amount = $2,
                commission_amount = commission_amount + $3,
                status = $4,
                disbursed_at = COALESCE(disbursed_at, $5),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_disbursed_total)
        .bind(commission_delta)
        .bind(status)
        .bind(disbursed_at)
        .fetch_one(executor)
        .await?;

        Ok(application)
    }
}
