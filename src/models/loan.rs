// src/models/loan.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums (mirroring Postgres types) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Submitted,
    UnderVerification,
    Verified,
    Approved,
    PartiallyDisbursed,
    Disbursed,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderVerification => "under_verification",
            ApplicationStatus::Verified => "verified",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::PartiallyDisbursed => "partially_disbursed",
            ApplicationStatus::Disbursed => "disbursed",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    /// Terminal states accept no further lifecycle transitions
    /// (disbursement keeps appending to its own ledger fields).
    pub fn is_terminal(self) -> bool {
        matches!(self, ApplicationStatus::Disbursed | ApplicationStatus::Rejected)
    }

    pub fn accepts_disbursement(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Approved | ApplicationStatus::PartiallyDisbursed
        )
    }
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: Uuid,

    #[schema(example = "LN-202508-00042")]
    pub application_number: String,

    pub connector_id: Uuid,
    pub loan_category_id: Uuid,

    pub customer_name: String,
    pub customer_city: String,

    #[schema(value_type = String, example = "250000.00")]
    pub requested_amount: Decimal,
    #[schema(value_type = Option<String>, example = "200000.00")]
    pub approved_amount: Option<Decimal>,
    #[schema(value_type = String, example = "0.00")]
    pub disbursed_amount: Decimal,

    #[schema(value_type = Option<String>, example = "2.00")]
    pub commission_percentage: Option<Decimal>,
    #[schema(value_type = String, example = "0.00")]
    pub commission_amount: Decimal,

    pub status: ApplicationStatus,
    pub rejection_reason: Option<String>,

    pub verified_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub disbursed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: Uuid,
    pub user_id: Uuid,
    pub city: String,

    #[schema(value_type = String, example = "2.00")]
    pub commission_percentage: Decimal,

    pub total_approved_cases: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoanCategory {
    pub id: Uuid,
    pub name: String,
    pub requires_rto_tracking: bool,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationPayload {
    pub loan_category_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    pub customer_name: String,

    #[validate(length(min = 1, message = "required"))]
    pub customer_city: String,

    #[schema(value_type = String, example = "250000.00")]
    pub requested_amount: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveApplicationPayload {
    #[schema(value_type = String, example = "200000.00")]
    pub approved_amount: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectApplicationPayload {
    #[validate(length(min = 1, message = "required"))]
    pub reason: String,
}
