// src/db/commission_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::commission::{CommissionListRow, CommissionRecord},
    models::disbursement::CommissionStatus,
};

#[derive(Clone)]
pub struct CommissionRepository {
    pool: PgPool,
}

impl CommissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ACCRUAL
    // =========================================================================

    /// Accrues one tranche's commission into the per-application record as a
    /// single atomic upsert, keyed on the `loan_application_id` unique
    /// constraint. No existence check happens first, so two tranches posting
    /// concurrently cannot race past each other.
    pub async fn accrue<'e, E>(
        &self,
        executor: E,
        loan_application_id: Uuid,
        connector_id: Uuid,
        amount: Decimal,
        percentage: Decimal,
    ) -> Result<CommissionRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, CommissionRecord>(
            r#"
            INSERT INTO commission_records (
                loan_application_id, connector_id,
                commission_amount, commission_percentage, status
            )
            VALUES ($1, $2, $3, $4, 'earned')
            ON CONFLICT (loan_application_id) DO UPDATE
            SET commission_amount = commission_records.commission_amount
                                    + EXCLUDED.commission_amount,
                commission_percentage = EXCLUDED.commission_percentage,
                status = 'earned',
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(loan_application_id)
        .bind(connector_id)
        .bind(amount)
        .bind(percentage)
        .fetch_one(executor)
        .await?;

        Ok(record)
    }

    // =========================================================================
    //  PAYOUT
    // =========================================================================

    /// Claims the earned subset of the given ids under row locks, so a record
    /// cannot end up in two concurrent payment batches.
    pub async fn lock_earned<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
    ) -> Result<Vec<CommissionRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let records = sqlx::query_as::<_, CommissionRecord>(
            r#"
            SELECT * FROM commission_records
            WHERE id = ANY($1) AND status = 'earned'
            FOR UPDATE
            "#,
        )
        .bind(ids)
        .fetch_all(executor)
        .await?;

        Ok(records)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn mark_paid<'e, E>(
        &self,
        executor: E,
        ids: &[Uuid],
        paid_at: DateTime<Utc>,
        paid_by: Uuid,
        payment_method: &str,
        payment_reference: &str,
        payment_remarks: Option<&str>,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE commission_records
            SET status = 'paid',
                paid_at = $2,
                paid_by = $3,
                payment_method = $4,
                payment_reference = $5,
                payment_remarks = $6,
                updated_at = NOW()
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .bind(paid_at)
        .bind(paid_by)
        .bind(payment_method)
        .bind(payment_reference)
        .bind(payment_remarks)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    /// One summary row per payout batch.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_payment_batch<'e, E>(
        &self,
        executor: E,
        payment_reference: &str,
        payment_method: &str,
        total_amount: Decimal,
        commission_count: i32,
        payment_date: DateTime<Utc>,
        remarks: Option<&str>,
        paid_by: Uuid,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO commission_payments (
                payment_reference, payment_method, total_amount,
                commission_count, payment_date, remarks, paid_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(payment_reference)
        .bind(payment_method)
        .bind(total_amount)
        .bind(commission_count)
        .bind(payment_date)
        .bind(remarks)
        .bind(paid_by)
        .fetch_one(executor)
        .await?;

        Ok(id)
    }

    // =========================================================================
    //  LISTING
    // =========================================================================

    pub async fn list(
        &self,
        status: Option<CommissionStatus>,
    ) -> Result<Vec<CommissionListRow>, AppError> {
        let rows = sqlx::query_as::<_, CommissionListRow>(
            r#"
            SELECT
                r.id, r.loan_application_id, a.application_number,
                r.connector_id, u.full_name AS connector_name,
                r.commission_amount, r.commission_percentage,
                r.status, r.paid_at, r.payment_reference
            FROM commission_records r
            JOIN loan_applications a ON a.id = r.loan_application_id
            JOIN connectors c ON c.id = r.connector_id
            JOIN users u ON u.id = c.user_id
            WHERE $1::commission_status IS NULL OR r.status = $1
            ORDER BY r.updated_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
