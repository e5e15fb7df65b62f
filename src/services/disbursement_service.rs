// src/services/disbursement_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, redact::mask_account_number},
    db::{
        ApplicationRepository, AuditRepository, CommissionRepository, DisbursementRepository,
        UserRepository,
    },
    models::auth::User,
    models::disbursement::{DisbursementOutcome, DisbursementPayload, DisbursementTranche},
    models::loan::ApplicationStatus,
};

// ---
// Pure reconciliation rules. Kept free of sqlx so the invariants are
// testable without a database.
// ---

/// A tranche is acceptable when it is positive and the accumulated total
/// stays within the approved ceiling.
fn check_ceiling(
    amount: Decimal,
    already_disbursed: Decimal,
    approved_amount: Decimal,
) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(
            "disbursement amount must be greater than zero".into(),
        ));
    }
    if already_disbursed + amount > approved_amount {
        return Err(AppError::Validation(format!(
            "disbursement of {} would exceed the approved amount ({} already disbursed of {})",
            amount, already_disbursed, approved_amount
        )));
    }
    Ok(())
}

/// The resulting status always follows the arithmetic, whatever the caller
/// asked for: fully disbursed once the accumulated total reaches the
/// approved amount, partially disbursed below it.
fn reconcile_status(new_total: Decimal, approved_amount: Decimal) -> ApplicationStatus {
    if new_total >= approved_amount {
        ApplicationStatus::Disbursed
    } else {
        ApplicationStatus::PartiallyDisbursed
    }
}

/// Commission for one tranche: the override wins verbatim when present,
/// otherwise amount x percentage / 100, rounded to paise.
fn tranche_commission(
    amount: Decimal,
    commission_percentage: Decimal,
    override_amount: Option<Decimal>,
) -> Decimal {
    match override_amount {
        Some(fixed) => fixed,
        None => (amount * commission_percentage / Decimal::ONE_HUNDRED).round_dp(2),
    }
}

#[derive(Clone)]
pub struct DisbursementService {
    pool: PgPool,
    applications: ApplicationRepository,
    disbursements: DisbursementRepository,
    commissions: CommissionRepository,
    users: UserRepository,
    audit: AuditRepository,
}

impl DisbursementService {
    pub fn new(
        pool: PgPool,
        applications: ApplicationRepository,
        disbursements: DisbursementRepository,
        commissions: CommissionRepository,
        users: UserRepository,
        audit: AuditRepository,
    ) -> Self {
        Self {
            pool,
            applications,
            disbursements,
            commissions,
            users,
            audit,
        }
    }

    /// Posts one disbursement tranche. The whole operation is a single
    /// transaction holding the application row lock, so concurrent tranches
    /// for the same application serialize and the approved ceiling cannot be
    /// breached by a read-modify-write race.
    pub async fn process_disbursement(
        &self,
        actor: &User,
        application_id: Uuid,
        payload: &DisbursementPayload,
    ) -> Result<DisbursementOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock the application and check eligibility before any write.
        let application = self
            .applications
            .lock_by_id(&mut *tx, application_id)
            .await?
            .ok_or_else(|| AppError::NotFound("loan application not found".into()))?;

        if !application.status.accepts_disbursement() {
            return Err(AppError::StateConflict(format!(
                "application {} is not eligible for disbursement (status: {})",
                application.application_number,
                application.status.as_str()
            )));
        }

        let approved_amount = application.approved_amount.ok_or_else(|| {
            AppError::StateConflict("application has no approved amount".into())
        })?;

        // 2. The tranche ledger is the source of truth for what is already
        //    disbursed; read it under the lock taken above.
        let already_disbursed = self
            .disbursements
            .total_disbursed(&mut *tx, application_id)
            .await?;

        check_ceiling(payload.disbursement_amount, already_disbursed, approved_amount)?;

        let new_total = already_disbursed + payload.disbursement_amount;
        let status = reconcile_status(new_total, approved_amount);

        let commission_percentage = application.commission_percentage.unwrap_or(Decimal::ZERO);
        let commission = tranche_commission(
            payload.disbursement_amount,
            commission_percentage,
            payload.commission_amount_override,
        );

        // 3. Append the tranche and fold it into the application row.
        let tranche = self
            .disbursements
            .insert_tranche(
                &mut *tx,
                application_id,
                payload.disbursement_amount,
                payload.disbursement_date,
                &payload.bank_name,
                &payload.account_number,
                &payload.ifsc_code,
                &payload.transaction_reference,
                payload.disbursement_remarks.as_deref(),
                commission,
                actor.id,
            )
            .await?;

        let newly_disbursed = status == ApplicationStatus::Disbursed;
        let updated = self
            .applications
            .apply_disbursement(
                &mut *tx,
                application_id,
                new_total,
                commission,
                status,
                newly_disbursed.then(Utc::now),
            )
            .await?;

        // 4. Accrue commission (atomic upsert) and bump the connector counter
        //    the first time the application reaches fully disbursed.
        self.commissions
            .accrue(
                &mut *tx,
                application_id,
                application.connector_id,
                commission,
                commission_percentage,
            )
            .await?;

        if newly_disbursed {
            self.users
                .increment_approved_cases(&mut *tx, application.connector_id)
                .await?;
        }

        self.audit
            .record(
                &mut *tx,
                Some(actor.id),
                "disbursement.processed",
                "loan_application",
                application_id,
                Some(json!({
                    "status": application.status,
                    "disbursedAmount": already_disbursed,
                })),
                Some(json!({
                    "status": status,
                    "disbursedAmount": new_total,
                    "trancheAmount": payload.disbursement_amount,
                    "commission": commission,
                    "accountNumber": mask_account_number(&payload.account_number),
                    "transactionReference": payload.transaction_reference,
                })),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            application = %updated.application_number,
            amount = %payload.disbursement_amount,
            total = %new_total,
            "disbursement tranche posted"
        );

        Ok(DisbursementOutcome {
            application_id,
            application_number: updated.application_number,
            tranche_id: tranche.id,
            disbursed_amount: new_total,
            commission_for_this_disbursement: commission,
            transaction_reference: tranche.transaction_reference,
            requested_status: payload.status,
            loan_application_status: status,
        })
    }

    pub async fn list_for_application(
        &self,
        application_id: Uuid,
    ) -> Result<Vec<DisbursementTranche>, AppError> {
        // 404 for unknown applications rather than an empty list
        self.applications
            .find_by_id(&self.pool, application_id)
            .await?
            .ok_or_else(|| AppError::NotFound("loan application not found".into()))?;

        self.disbursements.list_for_application(application_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_non_positive_amounts() {
        assert!(check_ceiling(dec!(0), dec!(0), dec!(100000)).is_err());
        assert!(check_ceiling(dec!(-50), dec!(0), dec!(100000)).is_err());
    }

    #[test]
    fn rejects_tranche_breaching_the_ceiling() {
        // 100000 approved, 100000 already out: even one more unit is too much
        let err = check_ceiling(dec!(1), dec!(100000), dec!(100000)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn accepts_tranche_exactly_reaching_the_ceiling() {
        assert!(check_ceiling(dec!(40000), dec!(60000), dec!(100000)).is_ok());
    }

    #[test]
    fn status_follows_the_arithmetic_not_the_caller() {
        // caller asked for 'disbursed' at 60k of 100k: still partial
        assert_eq!(
            reconcile_status(dec!(60000), dec!(100000)),
            ApplicationStatus::PartiallyDisbursed
        );
        // caller asked for 'partially_disbursed' at the full amount: disbursed
        assert_eq!(
            reconcile_status(dec!(100000), dec!(100000)),
            ApplicationStatus::Disbursed
        );
        // over-approved totals (custom ceilings) still count as disbursed
        assert_eq!(
            reconcile_status(dec!(120000), dec!(100000)),
            ApplicationStatus::Disbursed
        );
    }

    #[test]
    fn commission_uses_percentage_of_the_tranche() {
        assert_eq!(
            tranche_commission(dec!(60000), dec!(2), None),
            dec!(1200.00)
        );
        assert_eq!(tranche_commission(dec!(40000), dec!(2), None), dec!(800.00));
    }

    #[test]
    fn commission_override_wins_verbatim() {
        assert_eq!(
            tranche_commission(dec!(60000), dec!(2), Some(dec!(1500))),
            dec!(1500)
        );
    }

    #[test]
    fn commission_rounds_to_two_decimals() {
        // 33333 x 1.75% = 583.3275 -> 583.33
        assert_eq!(
            tranche_commission(dec!(33333), dec!(1.75), None),
            dec!(583.33)
        );
    }

    #[test]
    fn commission_additivity_over_a_tranche_sequence() {
        let total: Decimal = [dec!(60000), dec!(30000), dec!(10000)]
            .iter()
            .map(|amount| tranche_commission(*amount, dec!(2), None))
            .sum();
        assert_eq!(total, tranche_commission(dec!(100000), dec!(2), None));
    }
}
