// src/handlers/commissions.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminLevel, RequireRole},
    },
    models::commission::{BulkPayOutcome, BulkPayPayload, CommissionListRow},
    models::disbursement::CommissionStatus,
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CommissionListQuery {
    /// Restrict to one status; all records when omitted.
    pub status: Option<CommissionStatus>,
}

#[utoipa::path(
    get,
    path = "/api/commissions",
    tag = "Commissions",
    params(CommissionListQuery),
    responses(
        (status = 200, description = "Commission records", body = [CommissionListRow])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_commissions(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminLevel>,
    Query(query): Query<CommissionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let records = app_state.commission_service.list(query.status).await?;

    Ok(Json(records))
}

#[utoipa::path(
    post,
    path = "/api/commissions/bulk-pay",
    tag = "Commissions",
    request_body = BulkPayPayload,
    responses(
        (status = 200, description = "Batch paid", body = BulkPayOutcome),
        (status = 400, description = "Missing payment method/reference or empty id list"),
        (status = 404, description = "No earned records among the given ids")
    ),
    security(("api_jwt" = []))
)]
pub async fn bulk_pay(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _role: RequireRole<AdminLevel>,
    Json(payload): Json<BulkPayPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let outcome = app_state
        .commission_service
        .bulk_mark_paid(&user, &payload)
        .await?;

    Ok(Json(outcome))
}
