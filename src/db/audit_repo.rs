// src/db/audit_repo.rs

use serde_json::Value;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;

/// Writer for the append-only `system_logs` audit trail. Callers pass the
/// transaction they are mutating in, so audit rows roll back together with
/// the mutation they describe.
#[derive(Clone, Default)]
pub struct AuditRepository;

impl AuditRepository {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn record<'e, E>(
        &self,
        executor: E,
        actor_id: Option<Uuid>,
        action: &str,
        entity_type: &str,
        entity_id: Uuid,
        before_state: Option<Value>,
        after_state: Option<Value>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO system_logs (
                actor_id, action, entity_type, entity_id, before_state, after_state
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(actor_id)
        .bind(action)
        .bind(entity_type)
        .bind(entity_id)
        .bind(before_state)
        .bind(after_state)
        .execute(executor)
        .await?;

        Ok(())
    }
}
