// src/handlers/applications.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{BankerLevel, ConnectorLevel, OperatorLevel, RequireRole},
    },
    models::loan::{
        ApproveApplicationPayload, CreateApplicationPayload, LoanApplication,
        RejectApplicationPayload,
    },
};

#[utoipa::path(
    post,
    path = "/api/applications",
    tag = "Applications",
    request_body = CreateApplicationPayload,
    responses(
        (status = 201, description = "Application submitted", body = LoanApplication),
        (status = 403, description = "Caller is not a connector")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_application(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _role: RequireRole<ConnectorLevel>,
    Json(payload): Json<CreateApplicationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let application = app_state.application_service.submit(&user, &payload).await?;

    Ok((StatusCode::CREATED, Json(application)))
}

#[utoipa::path(
    get,
    path = "/api/applications",
    tag = "Applications",
    responses(
        (status = 200, description = "Applications visible to the caller", body = [LoanApplication])
    ),
    security(("api_jwt" = []))
)]
pub async fn list_applications(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let applications = app_state.application_service.list_for(&user).await?;

    Ok(Json(applications))
}

#[utoipa::path(
    get,
    path = "/api/applications/{id}",
    tag = "Applications",
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application detail", body = LoanApplication),
        (status = 404, description = "Not found")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_application(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let application = app_state.application_service.get_for(&user, id).await?;

    Ok(Json(application))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/verify",
    tag = "Applications",
    params(("id" = Uuid, Path, description = "Application id")),
    responses(
        (status = 200, description = "Application verified", body = LoanApplication),
        (status = 409, description = "Wrong lifecycle state")
    ),
    security(("api_jwt" = []))
)]
pub async fn verify_application(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _role: RequireRole<OperatorLevel>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let application = app_state.application_service.verify(&user, id).await?;

    Ok(Json(application))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/approve",
    tag = "Applications",
    params(("id" = Uuid, Path, description = "Application id")),
    request_body = ApproveApplicationPayload,
    responses(
        (status = 200, description = "Application approved", body = LoanApplication),
        (status = 409, description = "Wrong lifecycle state")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_application(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _role: RequireRole<BankerLevel>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveApplicationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let application = app_state
        .application_service
        .approve(&user, id, &payload)
        .await?;

    Ok(Json(application))
}

#[utoipa::path(
    put,
    path = "/api/applications/{id}/reject",
    tag = "Applications",
    params(("id" = Uuid, Path, description = "Application id")),
    request_body = RejectApplicationPayload,
    responses(
        (status = 200, description = "Application rejected", body = LoanApplication),
        (status = 409, description = "Wrong lifecycle state")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_application(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _role: RequireRole<BankerLevel>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectApplicationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let application = app_state
        .application_service
        .reject(&user, id, &payload.reason)
        .await?;

    Ok(Json(application))
}
