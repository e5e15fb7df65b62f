// src/models/disbursement.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::loan::ApplicationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "commission_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CommissionStatus {
    Pending,
    Earned,
    Paid,
}

/// The two target statuses a disbursement request may ask for. The effective
/// status is reconciled against the accumulated amount and may differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DisbursementTarget {
    PartiallyDisbursed,
    Disbursed,
}

// One tranche of the append-only disbursement ledger
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementTranche {
    pub id: Uuid,
    pub loan_application_id: Uuid,

    #[schema(value_type = String, example = "60000.00")]
    pub disbursed_amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-08-07")]
    pub disbursement_date: NaiveDate,

    pub bank_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub transaction_reference: String,
    pub remarks: Option<String>,

    #[schema(value_type = String, example = "1200.00")]
    pub connector_commission: Decimal,
    pub commission_status: CommissionStatus,

    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementPayload {
    #[schema(value_type = String, example = "60000.00")]
    pub disbursement_amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2025-08-07")]
    pub disbursement_date: NaiveDate,

    #[validate(length(min = 1, message = "required"))]
    pub bank_name: String,

    #[validate(length(min = 4, message = "required"))]
    pub account_number: String,

    #[validate(length(min = 1, message = "required"))]
    pub ifsc_code: String,

    #[validate(length(min = 1, message = "required"))]
    pub transaction_reference: String,

    pub disbursement_remarks: Option<String>,

    /// When set, used verbatim instead of the percentage computation.
    #[schema(value_type = Option<String>, example = "1500.00")]
    pub commission_amount_override: Option<Decimal>,

    pub status: DisbursementTarget,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DisbursementOutcome {
    pub application_id: Uuid,
    pub application_number: String,
    pub tranche_id: Uuid,

    #[schema(value_type = String, example = "60000.00")]
    pub disbursed_amount: Decimal,

    #[schema(value_type = String, example = "1200.00")]
    pub commission_for_this_disbursement: Decimal,

    pub transaction_reference: String,

    /// What the caller asked for.
    pub requested_status: DisbursementTarget,
    /// What the accumulated amount actually reconciles to.
    pub loan_application_status: ApplicationStatus,
}
