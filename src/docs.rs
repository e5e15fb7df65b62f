// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Applications ---
        handlers::applications::create_application,
        handlers::applications::list_applications,
        handlers::applications::get_application,
        handlers::applications::verify_application,
        handlers::applications::approve_application,
        handlers::applications::reject_application,

        // --- Disbursements ---
        handlers::disbursements::process_disbursement,
        handlers::disbursements::list_disbursements,

        // --- Commissions ---
        handlers::commissions::list_commissions,
        handlers::commissions::bulk_pay,

        // --- Post-Disbursement (RTO) ---
        handlers::rto::list_cases,
        handlers::rto::upsert_case,
        handlers::rto::list_agents,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Applications ---
            models::loan::ApplicationStatus,
            models::loan::LoanApplication,
            models::loan::Connector,
            models::loan::LoanCategory,
            models::loan::CreateApplicationPayload,
            models::loan::ApproveApplicationPayload,
            models::loan::RejectApplicationPayload,

            // --- Disbursements ---
            models::disbursement::CommissionStatus,
            models::disbursement::DisbursementTarget,
            models::disbursement::DisbursementTranche,
            models::disbursement::DisbursementPayload,
            models::disbursement::DisbursementOutcome,

            // --- Commissions ---
            models::commission::CommissionRecord,
            models::commission::CommissionListRow,
            models::commission::BulkPayPayload,
            models::commission::BulkPayOutcome,

            // --- Post-Disbursement (RTO) ---
            models::rto::RtoCaseStatus,
            models::rto::RcStatus,
            models::rto::PostDisbursementCase,
            models::rto::RtoAgent,
            models::rto::CaseListRow,
            models::rto::UpsertCasePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Authenticated user profile"),
        (name = "Applications", description = "Loan application lifecycle"),
        (name = "Disbursements", description = "Tranche posting and ledger"),
        (name = "Commissions", description = "Connector commission accrual and payout"),
        (name = "Post-Disbursement", description = "RTO workflow for auto loans")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
