// src/models/commission.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::disbursement::CommissionStatus;

// Accumulated commission, one row per application
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionRecord {
    pub id: Uuid,
    pub loan_application_id: Uuid,
    pub connector_id: Uuid,

    #[schema(value_type = String, example = "2000.00")]
    pub commission_amount: Decimal,
    #[schema(value_type = String, example = "2.00")]
    pub commission_percentage: Decimal,

    pub status: CommissionStatus,

    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by: Option<Uuid>,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub payment_remarks: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Listing row with connector/application context for the payout screen
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommissionListRow {
    pub id: Uuid,
    pub loan_application_id: Uuid,
    pub application_number: String,
    pub connector_id: Uuid,
    pub connector_name: String,

    #[schema(value_type = String, example = "2000.00")]
    pub commission_amount: Decimal,
    #[schema(value_type = String, example = "2.00")]
    pub commission_percentage: Decimal,

    pub status: CommissionStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPayPayload {
    #[validate(length(min = 1, message = "at least one commission id is required"))]
    pub commission_ids: Vec<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "bank_transfer")]
    pub payment_method: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "UTR-2025-08-0001")]
    pub payment_reference: String,

    /// Defaults to now when omitted.
    pub payment_date: Option<DateTime<Utc>>,

    pub payment_remarks: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkPayOutcome {
    pub paid_count: i64,

    #[schema(value_type = String, example = "5400.00")]
    pub total_amount: Decimal,

    pub payment_reference: String,
}
