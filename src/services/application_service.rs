// src/services/application_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ApplicationRepository, AuditRepository, UserRepository},
    models::auth::{User, UserRole},
    models::loan::{
        ApplicationStatus, ApproveApplicationPayload, CreateApplicationPayload, LoanApplication,
    },
};

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    applications: ApplicationRepository,
    users: UserRepository,
    audit: AuditRepository,
}

impl ApplicationService {
    pub fn new(
        pool: PgPool,
        applications: ApplicationRepository,
        users: UserRepository,
        audit: AuditRepository,
    ) -> Self {
        Self {
            pool,
            applications,
            users,
            audit,
        }
    }

    // =========================================================================
    //  SUBMISSION
    // =========================================================================

    pub async fn submit(
        &self,
        actor: &User,
        payload: &CreateApplicationPayload,
    ) -> Result<LoanApplication, AppError> {
        if payload.requested_amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "requested amount must be greater than zero".into(),
            ));
        }

        let connector = self
            .users
            .find_connector_by_user(actor.id)
            .await?
            .ok_or_else(|| {
                AppError::Forbidden("only connectors can submit applications".into())
            })?;

        let mut tx = self.pool.begin().await?;

        self.applications
            .find_category(&mut *tx, payload.loan_category_id)
            .await?
            .ok_or_else(|| AppError::Validation("unknown loan category".into()))?;

        let application = self
            .applications
            .create(
                &mut *tx,
                connector.id,
                payload.loan_category_id,
                &payload.customer_name,
                &payload.customer_city,
                payload.requested_amount,
            )
            .await?;

        self.audit
            .record(
                &mut *tx,
                Some(actor.id),
                "loan_application.submitted",
                "loan_application",
                application.id,
                None,
                Some(json!({
                    "applicationNumber": application.application_number,
                    "requestedAmount": application.requested_amount,
                })),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(application = %application.application_number, "application submitted");

        Ok(application)
    }

    // =========================================================================
    //  LOOKUP
    // =========================================================================

    pub async fn list_for(&self, actor: &User) -> Result<Vec<LoanApplication>, AppError> {
        // Connectors only see their own pipeline
        if actor.role == UserRole::Connector {
            let connector = self
                .users
                .find_connector_by_user(actor.id)
                .await?
                .ok_or_else(|| AppError::Forbidden("no connector profile".into()))?;
            return self.applications.list_by_connector(connector.id).await;
        }

        self.applications.list_all().await
    }

    pub async fn get_for(&self, actor: &User, id: Uuid) -> Result<LoanApplication, AppError> {
        let application = self
            .applications
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("loan application not found".into()))?;

        if actor.role == UserRole::Connector {
            let connector = self.users.find_connector_by_user(actor.id).await?;
            if connector.map(|c| c.id) != Some(application.connector_id) {
                // Do not reveal other connectors' applications
                return Err(AppError::NotFound("loan application not found".into()));
            }
        }

        Ok(application)
    }

    // =========================================================================
    //  VERIFICATION / APPROVAL / REJECTION
    // =========================================================================

    pub async fn verify(&self, actor: &User, id: Uuid) -> Result<LoanApplication, AppError> {
        let mut tx = self.pool.begin().await?;

        let application = self
            .applications
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("loan application not found".into()))?;

        if !matches!(
            application.status,
            ApplicationStatus::Submitted | ApplicationStatus::UnderVerification
        ) {
            return Err(AppError::StateConflict(format!(
                "application {} cannot be verified in its current state",
                application.application_number
            )));
        }

        let updated = self.applications.mark_verified(&mut *tx, id).await?;

        self.audit
            .record(
                &mut *tx,
                Some(actor.id),
                "loan_application.verified",
                "loan_application",
                id,
                Some(json!({ "status": application.status })),
                Some(json!({ "status": updated.status })),
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    pub async fn approve(
        &self,
        actor: &User,
        id: Uuid,
        payload: &ApproveApplicationPayload,
    ) -> Result<LoanApplication, AppError> {
        if payload.approved_amount <= Decimal::ZERO {
            return Err(AppError::Validation(
                "approved amount must be greater than zero".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let application = self
            .applications
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("loan application not found".into()))?;

        if application.status != ApplicationStatus::Verified {
            return Err(AppError::StateConflict(format!(
                "application {} must be verified before approval",
                application.application_number
            )));
        }

        // Snapshot the connector's commission percentage at approval time;
        // later changes to the connector do not affect this application.
        let connector = self
            .users
            .find_connector(&mut *tx, application.connector_id)
            .await?
            .ok_or_else(|| AppError::NotFound("connector not found".into()))?;

        let updated = self
            .applications
            .approve(
                &mut *tx,
                id,
                payload.approved_amount,
                connector.commission_percentage,
            )
            .await?;

        self.audit
            .record(
                &mut *tx,
                Some(actor.id),
                "loan_application.approved",
                "loan_application",
                id,
                Some(json!({ "status": application.status })),
                Some(json!({
                    "status": updated.status,
                    "approvedAmount": payload.approved_amount,
                    "commissionPercentage": connector.commission_percentage,
                })),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            application = %updated.application_number,
            amount = %payload.approved_amount,
            "application approved"
        );

        Ok(updated)
    }

    pub async fn reject(
        &self,
        actor: &User,
        id: Uuid,
        reason: &str,
    ) -> Result<LoanApplication, AppError> {
        let mut tx = self.pool.begin().await?;

        let application = self
            .applications
            .lock_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound("loan application not found".into()))?;

        // Once money has moved the application cannot be rejected.
        if application.status.is_terminal()
            || application.status == ApplicationStatus::PartiallyDisbursed
        {
            return Err(AppError::StateConflict(format!(
                "application {} cannot be rejected in its current state",
                application.application_number
            )));
        }

        let updated = self.applications.reject(&mut *tx, id, reason).await?;

        self.audit
            .record(
                &mut *tx,
                Some(actor.id),
                "loan_application.rejected",
                "loan_application",
                id,
                Some(json!({ "status": application.status })),
                Some(json!({ "status": updated.status, "reason": reason })),
            )
            .await?;

        tx.commit().await?;

        Ok(updated)
    }
}
