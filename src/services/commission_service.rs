// src/services/commission_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AuditRepository, CommissionRepository},
    models::auth::User,
    models::commission::{BulkPayOutcome, BulkPayPayload, CommissionListRow},
    models::disbursement::CommissionStatus,
};

#[derive(Clone)]
pub struct CommissionService {
    pool: PgPool,
    commissions: CommissionRepository,
    audit: AuditRepository,
}

impl CommissionService {
    pub fn new(pool: PgPool, commissions: CommissionRepository, audit: AuditRepository) -> Self {
        Self {
            pool,
            commissions,
            audit,
        }
    }

    pub async fn list(
        &self,
        status: Option<CommissionStatus>,
    ) -> Result<Vec<CommissionListRow>, AppError> {
        self.commissions.list(status).await
    }

    /// Marks a batch of earned commission records as paid. The earned subset
    /// is claimed under row locks inside one transaction: records already
    /// paid (or claimed by a concurrent batch) drop out, and if nothing
    /// qualifies the call fails without writing anything.
    pub async fn bulk_mark_paid(
        &self,
        actor: &User,
        payload: &BulkPayPayload,
    ) -> Result<BulkPayOutcome, AppError> {
        if payload.commission_ids.is_empty() {
            return Err(AppError::Validation(
                "at least one commission id is required".into(),
            ));
        }
        if payload.payment_method.trim().is_empty() || payload.payment_reference.trim().is_empty() {
            return Err(AppError::Validation(
                "payment method and payment reference are required".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let records = self
            .commissions
            .lock_earned(&mut *tx, &payload.commission_ids)
            .await?;

        if records.is_empty() {
            return Err(AppError::NotFound(
                "no earned commission records among the given ids".into(),
            ));
        }

        let qualifying_ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let total_amount: Decimal = records.iter().map(|r| r.commission_amount).sum();
        let paid_at = payload.payment_date.unwrap_or_else(Utc::now);

        let paid_count = self
            .commissions
            .mark_paid(
                &mut *tx,
                &qualifying_ids,
                paid_at,
                actor.id,
                &payload.payment_method,
                &payload.payment_reference,
                payload.payment_remarks.as_deref(),
            )
            .await?;

        self.commissions
            .insert_payment_batch(
                &mut *tx,
                &payload.payment_reference,
                &payload.payment_method,
                total_amount,
                paid_count as i32,
                paid_at,
                payload.payment_remarks.as_deref(),
                actor.id,
            )
            .await?;

        // One audit entry per record, not one for the batch.
        for record in &records {
            self.audit
                .record(
                    &mut *tx,
                    Some(actor.id),
                    "commission.paid",
                    "commission_record",
                    record.id,
                    Some(json!({
                        "status": CommissionStatus::Earned,
                        "commissionAmount": record.commission_amount,
                    })),
                    Some(json!({
                        "status": CommissionStatus::Paid,
                        "commissionAmount": record.commission_amount,
                        "connectorId": record.connector_id,
                        "paymentReference": payload.payment_reference,
                    })),
                )
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            count = paid_count,
            total = %total_amount,
            reference = %payload.payment_reference,
            "commission batch paid"
        );

        Ok(BulkPayOutcome {
            paid_count: paid_count as i64,
            total_amount,
            payment_reference: payload.payment_reference.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(ids: Vec<Uuid>, method: &str, reference: &str) -> BulkPayPayload {
        BulkPayPayload {
            commission_ids: ids,
            payment_method: method.to_string(),
            payment_reference: reference.to_string(),
            payment_date: None,
            payment_remarks: None,
        }
    }

    #[test]
    fn empty_id_list_is_rejected_by_payload_validation() {
        use validator::Validate;

        let payload = payload(vec![], "bank_transfer", "UTR-1");
        assert!(payload.validate().is_err());
    }

    #[test]
    fn blank_method_or_reference_fails_validation() {
        use validator::Validate;

        assert!(payload(vec![Uuid::new_v4()], "", "UTR-1").validate().is_err());
        assert!(
            payload(vec![Uuid::new_v4()], "bank_transfer", "")
                .validate()
                .is_err()
        );
    }
}
