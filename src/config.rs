// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        ApplicationRepository, AuditRepository, CommissionRepository, DisbursementRepository,
        RtoRepository, UserRepository,
    },
    services::{
        ApplicationService, AuthService, CommissionService, DisbursementService, RtoService,
    },
};

// Shared state available to every handler
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub application_service: ApplicationService,
    pub disbursement_service: DisbursementService,
    pub commission_service: CommissionService,
    pub rto_service: RtoService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")?;

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("database connection established");

        // --- Dependency graph ---
        let users = UserRepository::new(db_pool.clone());
        let applications = ApplicationRepository::new(db_pool.clone());
        let disbursements = DisbursementRepository::new(db_pool.clone());
        let commissions = CommissionRepository::new(db_pool.clone());
        let rto = RtoRepository::new(db_pool.clone());
        let audit = AuditRepository::new();

        let auth_service = AuthService::new(users.clone(), jwt_secret, db_pool.clone());
        let application_service = ApplicationService::new(
            db_pool.clone(),
            applications.clone(),
            users.clone(),
            audit.clone(),
        );
        let disbursement_service = DisbursementService::new(
            db_pool.clone(),
            applications,
            disbursements,
            commissions.clone(),
            users,
            audit.clone(),
        );
        let commission_service =
            CommissionService::new(db_pool.clone(), commissions, audit.clone());
        let rto_service = RtoService::new(db_pool.clone(), rto, audit);

        Ok(Self {
            db_pool,
            auth_service,
            application_service,
            disbursement_service,
            commission_service,
            rto_service,
        })
    }
}
