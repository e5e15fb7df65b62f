// src/models/rto.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rto_case_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RtoCaseStatus {
    Pending,
    AgentAssigned,
    RtoProcessStarted,
    DocumentsPending,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rc_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RcStatus {
    Pending,
    Received,
    HandedOver,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostDisbursementCase {
    pub id: Uuid,
    pub loan_application_id: Uuid,
    pub rto_agent_id: Option<Uuid>,
    pub status: RtoCaseStatus,
    pub rc_status: RcStatus,
    pub remarks: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RtoAgent {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub phone: Option<String>,
    pub is_active: bool,
}

/// Eligible application joined with its case (if any) and assigned agent.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaseListRow {
    pub loan_application_id: Uuid,
    pub application_number: String,
    pub customer_name: String,
    pub customer_city: String,

    pub case_id: Option<Uuid>,
    pub status: Option<RtoCaseStatus>,
    pub rc_status: Option<RcStatus>,
    pub remarks: Option<String>,

    pub rto_agent_id: Option<Uuid>,
    pub agent_name: Option<String>,
    pub agent_city: Option<String>,

    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseFilter {
    Pending,
    Completed,
}

/// Distinguishes an absent key from an explicit `null`: absent leaves the
/// agent untouched, `null` unassigns, a uuid assigns.
fn tri_state<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Fully-resolved set of changes for one case upsert. Derived from an
/// [`UpsertCasePayload`] before anything touches the database, so the
/// assignment/default/timestamp rules stay testable in isolation.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseChangeSet {
    /// Whether the agent column is written at all this round.
    pub agent_touched: bool,
    /// Target agent; `None` with `agent_touched` means unassign.
    pub rto_agent_id: Option<Uuid>,
    pub status: Option<RtoCaseStatus>,
    pub rc_status: Option<RcStatus>,
    pub remarks: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCasePayload {
    pub loan_application_id: Uuid,

    #[serde(default, deserialize_with = "tri_state")]
    #[schema(value_type = Option<Uuid>)]
    pub rto_agent_id: Option<Option<Uuid>>,

    pub status: Option<RtoCaseStatus>,
    pub rc_status: Option<RcStatus>,
    pub remarks: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_field_absent_is_untouched() {
        let payload: UpsertCasePayload = serde_json::from_str(
            r#"{"loanApplicationId":"550e8400-e29b-41d4-a716-446655440000"}"#,
        )
        .unwrap();
        assert_eq!(payload.rto_agent_id, None);
    }

    #[test]
    fn agent_field_null_means_unassign() {
        let payload: UpsertCasePayload = serde_json::from_str(
            r#"{"loanApplicationId":"550e8400-e29b-41d4-a716-446655440000","rtoAgentId":null}"#,
        )
        .unwrap();
        assert_eq!(payload.rto_agent_id, Some(None));
    }

    #[test]
    fn agent_field_uuid_means_assign() {
        let payload: UpsertCasePayload = serde_json::from_str(
            r#"{"loanApplicationId":"550e8400-e29b-41d4-a716-446655440000","rtoAgentId":"650e8400-e29b-41d4-a716-446655440000"}"#,
        )
        .unwrap();
        assert!(matches!(payload.rto_agent_id, Some(Some(_))));
    }

    #[test]
    fn case_status_uses_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&RtoCaseStatus::RtoProcessStarted).unwrap(),
            r#""rto_process_started""#
        );
        assert_eq!(
            serde_json::to_string(&RcStatus::HandedOver).unwrap(),
            r#""handed_over""#
        );
    }
}
