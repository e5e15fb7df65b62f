// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .expect("failed to initialize application state");

    // Run pending migrations on startup
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("failed to run database migrations");

    tracing::info!("database migrations applied");

    // Public routes
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Everything below requires a valid bearer token; per-route role
    // requirements are enforced by RequireRole extractors in the handlers.
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let application_routes = Router::new()
        .route(
            "/",
            post(handlers::applications::create_application)
                .get(handlers::applications::list_applications),
        )
        .route("/{id}", get(handlers::applications::get_application))
        .route("/{id}/verify", put(handlers::applications::verify_application))
        .route("/{id}/approve", put(handlers::applications::approve_application))
        .route("/{id}/reject", put(handlers::applications::reject_application))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let disbursement_routes = Router::new()
        .route(
            "/{application_id}",
            put(handlers::disbursements::process_disbursement)
                .get(handlers::disbursements::list_disbursements),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let commission_routes = Router::new()
        .route("/", get(handlers::commissions::list_commissions))
        .route("/bulk-pay", post(handlers::commissions::bulk_pay))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let rto_routes = Router::new()
        .route(
            "/",
            get(handlers::rto::list_cases).put(handlers::rto::upsert_case),
        )
        .route("/agents", get(handlers::rto::list_agents))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/applications", application_routes)
        .nest("/api/disbursements", disbursement_routes)
        .nest("/api/commissions", commission_routes)
        .nest("/api/post-disbursement", rto_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind TCP listener");
    tracing::info!("server listening on {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("axum server error");
}
