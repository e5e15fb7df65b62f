// src/services/rto_service.rs

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::{AuditRepository, RtoRepository},
    models::auth::User,
    models::loan::ApplicationStatus,
    models::rto::{
        CaseChangeSet, CaseFilter, CaseListRow, PostDisbursementCase, RtoAgent, RtoCaseStatus,
        UpsertCasePayload,
    },
};

/// Resolves a raw upsert payload into the concrete set of column writes.
///
/// Assignment rules: providing an agent stamps `assigned_at` and defaults the
/// status to `agent_assigned` unless an explicit status is given; an explicit
/// `null` unassigns the agent without touching the status; an absent field
/// leaves the agent alone. A (given or defaulted) `completed` status stamps
/// `completed_at`.
fn derive_changes(payload: &UpsertCasePayload, now: DateTime<Utc>) -> CaseChangeSet {
    let (agent_touched, rto_agent_id, assigned_at, default_status) = match payload.rto_agent_id {
        None => (false, None, None, None),
        Some(None) => (true, None, None, None),
        Some(Some(agent_id)) => (
            true,
            Some(agent_id),
            Some(now),
            Some(RtoCaseStatus::AgentAssigned),
        ),
    };

    let status = payload.status.or(default_status);
    let completed_at = (status == Some(RtoCaseStatus::Completed)).then_some(now);

    CaseChangeSet {
        agent_touched,
        rto_agent_id,
        status,
        rc_status: payload.rc_status,
        remarks: payload.remarks.clone(),
        assigned_at,
        completed_at,
    }
}

#[derive(Clone)]
pub struct RtoService {
    pool: PgPool,
    rto: RtoRepository,
    audit: AuditRepository,
}

impl RtoService {
    pub fn new(pool: PgPool, rto: RtoRepository, audit: AuditRepository) -> Self {
        Self { pool, rto, audit }
    }

    pub async fn list_cases(&self, filter: CaseFilter) -> Result<Vec<CaseListRow>, AppError> {
        self.rto.list_cases(filter).await
    }

    pub async fn list_agents(&self, city: Option<&str>) -> Result<Vec<RtoAgent>, AppError> {
        self.rto.list_agents(city).await
    }

    /// Creates or updates the RTO case for a disbursed auto-loan application.
    /// Status transitions are free-form within the enum; only eligibility and
    /// agent existence are enforced.
    pub async fn upsert_case(
        &self,
        actor: &User,
        payload: &UpsertCasePayload,
    ) -> Result<PostDisbursementCase, AppError> {
        let mut tx = self.pool.begin().await?;

        let eligibility = self
            .rto
            .eligibility(&mut *tx, payload.loan_application_id)
            .await?
            .ok_or_else(|| AppError::NotFound("loan application not found".into()))?;

        if eligibility.status != ApplicationStatus::Disbursed {
            return Err(AppError::StateConflict(
                "post-disbursement tracking only applies to disbursed applications".into(),
            ));
        }
        if !eligibility.requires_rto_tracking {
            return Err(AppError::StateConflict(
                "this loan category has no RTO workflow".into(),
            ));
        }

        if let Some(Some(agent_id)) = payload.rto_agent_id {
            self.rto
                .find_agent(&mut *tx, agent_id)
                .await?
                .ok_or_else(|| AppError::NotFound("rto agent not found".into()))?;
        }

        let changes = derive_changes(payload, Utc::now());
        let case = self
            .rto
            .upsert_case(&mut *tx, payload.loan_application_id, &changes)
            .await?;

        self.audit
            .record(
                &mut *tx,
                Some(actor.id),
                "rto_case.updated",
                "post_disbursement_case",
                case.id,
                None,
                Some(json!({
                    "status": case.status,
                    "rcStatus": case.rc_status,
                    "rtoAgentId": case.rto_agent_id,
                })),
            )
            .await?;

        tx.commit().await?;

        Ok(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn payload(
        agent: Option<Option<Uuid>>,
        status: Option<RtoCaseStatus>,
    ) -> UpsertCasePayload {
        UpsertCasePayload {
            loan_application_id: Uuid::new_v4(),
            rto_agent_id: agent,
            status,
            rc_status: None,
            remarks: None,
        }
    }

    #[test]
    fn assigning_an_agent_defaults_status_and_stamps_assigned_at() {
        let now = Utc::now();
        let agent_id = Uuid::new_v4();

        let changes = derive_changes(&payload(Some(Some(agent_id)), None), now);

        assert!(changes.agent_touched);
        assert_eq!(changes.rto_agent_id, Some(agent_id));
        assert_eq!(changes.status, Some(RtoCaseStatus::AgentAssigned));
        assert_eq!(changes.assigned_at, Some(now));
        assert_eq!(changes.completed_at, None);
    }

    #[test]
    fn explicit_status_beats_the_assignment_default() {
        let now = Utc::now();
        let changes = derive_changes(
            &payload(Some(Some(Uuid::new_v4())), Some(RtoCaseStatus::RtoProcessStarted)),
            now,
        );

        assert_eq!(changes.status, Some(RtoCaseStatus::RtoProcessStarted));
    }

    #[test]
    fn unassigning_touches_the_agent_but_not_the_status() {
        let now = Utc::now();
        let changes = derive_changes(&payload(Some(None), None), now);

        assert!(changes.agent_touched);
        assert_eq!(changes.rto_agent_id, None);
        assert_eq!(changes.status, None);
        assert_eq!(changes.assigned_at, None);
    }

    #[test]
    fn absent_agent_field_leaves_the_agent_alone() {
        let now = Utc::now();
        let changes = derive_changes(&payload(None, Some(RtoCaseStatus::DocumentsPending)), now);

        assert!(!changes.agent_touched);
        assert_eq!(changes.status, Some(RtoCaseStatus::DocumentsPending));
    }

    #[test]
    fn completion_stamps_completed_at() {
        let now = Utc::now();
        let changes = derive_changes(&payload(None, Some(RtoCaseStatus::Completed)), now);

        assert_eq!(changes.completed_at, Some(now));
    }
}
