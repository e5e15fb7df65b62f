// src/handlers/rto.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{AdminLevel, RequireRole},
    },
    models::rto::{CaseFilter, CaseListRow, PostDisbursementCase, RtoAgent, UpsertCasePayload},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CaseListQuery {
    /// Defaults to pending.
    pub filter: Option<CaseFilter>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AgentListQuery {
    /// Customer city; matching agents are listed first.
    pub city: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/post-disbursement",
    tag = "Post-Disbursement",
    params(CaseListQuery),
    responses(
        (status = 200, description = "RTO cases for disbursed auto loans", body = [CaseListRow])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_cases(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminLevel>,
    Query(query): Query<CaseListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let filter = query.filter.unwrap_or(CaseFilter::Pending);
    let cases = app_state.rto_service.list_cases(filter).await?;

    Ok(Json(cases))
}

#[utoipa::path(
    put,
    path = "/api/post-disbursement",
    tag = "Post-Disbursement",
    request_body = UpsertCasePayload,
    responses(
        (status = 200, description = "Case created or updated", body = PostDisbursementCase),
        (status = 404, description = "Application or agent not found"),
        (status = 409, description = "Application not eligible for RTO tracking")
    ),
    security(("api_jwt" = []))
)]
pub async fn upsert_case(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _role: RequireRole<AdminLevel>,
    Json(payload): Json<UpsertCasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let case = app_state.rto_service.upsert_case(&user, &payload).await?;

    Ok(Json(case))
}

#[utoipa::path(
    get,
    path = "/api/post-disbursement/agents",
    tag = "Post-Disbursement",
    params(AgentListQuery),
    responses(
        (status = 200, description = "Active RTO agents, matching city first", body = [RtoAgent])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_agents(
    State(app_state): State<AppState>,
    _role: RequireRole<AdminLevel>,
    Query(query): Query<AgentListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let agents = app_state
        .rto_service
        .list_agents(query.city.as_deref())
        .await?;

    Ok(Json(agents))
}
