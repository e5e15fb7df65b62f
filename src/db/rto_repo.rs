// src/db/rto_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::loan::ApplicationStatus,
    models::rto::{CaseChangeSet, CaseFilter, CaseListRow, PostDisbursementCase, RtoAgent},
};

/// Application fields needed to decide RTO eligibility.
#[derive(Debug, sqlx::FromRow)]
pub struct RtoEligibility {
    pub status: ApplicationStatus,
    pub requires_rto_tracking: bool,
}

#[derive(Clone)]
pub struct RtoRepository {
    pool: PgPool,
}

impl RtoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn eligibility<'e, E>(
        &self,
        executor: E,
        loan_application_id: Uuid,
    ) -> Result<Option<RtoEligibility>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let row = sqlx::query_as::<_, RtoEligibility>(
            r#"
            SELECT a.status, c.requires_rto_tracking
            FROM loan_applications a
            JOIN loan_categories c ON c.id = a.loan_category_id
            WHERE a.id = $1
            "#,
        )
        .bind(loan_application_id)
        .fetch_optional(executor)
        .await?;

        Ok(row)
    }

    pub async fn find_agent<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<RtoAgent>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let agent = sqlx::query_as::<_, RtoAgent>(
            "SELECT id, name, city, phone, is_active FROM rto_agents WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(agent)
    }

    /// Inserts the case on first write, updates in place afterwards. One
    /// parameterized statement; untouched fields keep their current values
    /// via COALESCE, and the agent column is only written when the change-set
    /// touches it.
    pub async fn upsert_case<'e, E>(
        &self,
        executor: E,
        loan_application_id: Uuid,
        changes: &CaseChangeSet,
    ) -> Result<PostDisbursementCase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let case = sqlx::query_as::<_, PostDisbursementCase>(
            r#"
            INSERT INTO post_disbursement_cases (
                loan_application_id, rto_agent_id, status, rc_status,
                remarks, assigned_at, completed_at
            )
            VALUES (
                $1, $2,
                COALESCE($3, 'pending'::rto_case_status),
                COALESCE($4, 'pending'::rc_status),
                $5, $6, $7
            )
            ON CONFLICT (loan_application_id) DO UPDATE
            SET rto_agent_id = CASE
                    WHEN $8 THEN EXCLUDED.rto_agent_id
                    ELSE post_disbursement_cases.rto_agent_id
                END,
                status = COALESCE($3, post_disbursement_cases.status),
                rc_status = COALESCE($4, post_disbursement_cases.rc_status),
                remarks = COALESCE($5, post_disbursement_cases.remarks),
                assigned_at = COALESCE($6, post_disbursement_cases.assigned_at),
                completed_at = COALESCE($7, post_disbursement_cases.completed_at),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(loan_application_id)
        .bind(changes.rto_agent_id)
        .bind(changes.status)
        .bind(changes.rc_status)
        .bind(changes.remarks.as_deref())
        .bind(changes.assigned_at)
        .bind(changes.completed_at)
        .bind(changes.agent_touched)
        .fetch_one(executor)
        .await?;

        Ok(case)
    }

    /// Disbursed applications in RTO-tracked categories, joined with their
    /// case and assigned agent. `pending` includes applications with no case
    /// row yet.
    pub async fn list_cases(&self, filter: CaseFilter) -> Result<Vec<CaseListRow>, AppError> {
        let completed_only = matches!(filter, CaseFilter::Completed);

        let rows = sqlx::query_as::<_, CaseListRow>(
            r#"
            SELECT
                a.id AS loan_application_id, a.application_number,
                a.customer_name, a.customer_city,
                c.id AS case_id, c.status, c.rc_status, c.remarks,
                c.rto_agent_id, g.name AS agent_name, g.city AS agent_city,
                c.assigned_at, c.completed_at
            FROM loan_applications a
            JOIN loan_categories cat ON cat.id = a.loan_category_id
            LEFT JOIN post_disbursement_cases c ON c.loan_application_id = a.id
            LEFT JOIN rto_agents g ON g.id = c.rto_agent_id
            WHERE a.status = 'disbursed'
              AND cat.requires_rto_tracking
              AND CASE
                    WHEN $1 THEN c.status = 'completed'
                    ELSE c.id IS NULL OR c.status <> 'completed'
                  END
            ORDER BY a.disbursed_at DESC
            "#,
        )
        .bind(completed_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Active agents, customer-city matches first so assignment screens can
    /// suggest local agents.
    pub async fn list_agents(&self, city: Option<&str>) -> Result<Vec<RtoAgent>, AppError> {
        let agents = sqlx::query_as::<_, RtoAgent>(
            r#"
            SELECT id, name, city, phone, is_active
            FROM rto_agents
            WHERE is_active
            ORDER BY (LOWER(city) = LOWER($1)) DESC NULLS LAST, name ASC
            "#,
        )
        .bind(city)
        .fetch_all(&self.pool)
        .await?;

        Ok(agents)
    }
}
