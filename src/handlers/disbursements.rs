// src/handlers/disbursements.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminLevel, RequireRole},
    },
    models::disbursement::{DisbursementOutcome, DisbursementPayload, DisbursementTranche},
};

#[utoipa::path(
    put,
    path = "/api/disbursements/{application_id}",
    tag = "Disbursements",
    params(("application_id" = Uuid, Path, description = "Application id")),
    request_body = DisbursementPayload,
    responses(
        (status = 200, description = "Tranche posted", body = DisbursementOutcome),
        (status = 400, description = "Validation failed (non-positive or ceiling breach)"),
        (status = 403, description = "Caller lacks an admin role"),
        (status = 404, description = "Application not found"),
        (status = 409, description = "Application not in a disbursable state")
    ),
    security(("api_jwt" = []))
)]
pub async fn process_disbursement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _role: RequireRole<AdminLevel>,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<DisbursementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = app_state
        .disbursement_service
        .process_disbursement(&user, application_id, &payload)
        .await?;

    Ok(Json(outcome))
}

#[utoipa::path(
    get,
    path = "/api/disbursements/{application_id}",
    tag = "Disbursements",
    params(("application_id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 200, description = "Tranche ledger for the application", body = [DisbursementTranche]),
        (status = 404, description = "Application not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_disbursements(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminLevel>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tranches = app_state
        .disbursement_service
        .list_for_application(application_id)
        .await?;

    Ok(Json(tranches))
}
