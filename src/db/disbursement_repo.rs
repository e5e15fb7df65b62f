// src/db/disbursement_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::disbursement::DisbursementTranche};

#[derive(Clone)]
pub struct DisbursementRepository {
    pool: PgPool,
}

impl DisbursementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Appends one tranche to the ledger. Rows in `loan_disbursements` are
    /// never updated after this insert.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_tranche<'e, E>(
        &self,
        executor: E,
        loan_application_id: Uuid,
        amount: Decimal,
        disbursement_date: NaiveDate,
        bank_name: &str,
        account_number: &str,
        ifsc_code: &str,
        transaction_reference: &str,
        remarks: Option<&str>,
        connector_commission: Decimal,
        created_by: Uuid,
    ) -> Result<DisbursementTranche, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tranche = sqlx::query_as::<_, DisbursementTranche>(
            r#"
            INSERT INTO loan_disbursements (
                loan_application_id, disbursed_amount, disbursement_date,
                bank_name, account_number, ifsc_code, transaction_reference,
                remarks, connector_commission, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(loan_application_id)
        .bind(amount)
        .bind(disbursement_date)
        .bind(bank_name)
        .bind(account_number)
        .bind(ifsc_code)
        .bind(transaction_reference)
        .bind(remarks)
        .bind(connector_commission)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(tranche)
    }

    /// Sum of tranche amounts for an application. The ledger is the source of
    /// truth for what is already disbursed; callers hold the application row
    /// lock while reading it.
    pub async fn total_disbursed<'e, E>(
        &self,
        executor: E,
        loan_application_id: Uuid,
    ) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(disbursed_amount), 0)
            FROM loan_disbursements
            WHERE loan_application_id = $1
            "#,
        )
        .bind(loan_application_id)
        .fetch_one(executor)
        .await?;

        Ok(total)
    }

    pub async fn list_for_application(
        &self,
        loan_application_id: Uuid,
    ) -> Result<Vec<DisbursementTranche>, AppError> {
        let tranches = sqlx::query_as::<_, DisbursementTranche>(
            r#"
            SELECT * FROM loan_disbursements
            WHERE loan_application_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(loan_application_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tranches)
    }
}
