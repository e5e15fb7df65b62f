pub mod application_service;
pub use application_service::ApplicationService;
pub mod auth_service;
pub use auth_service::AuthService;
pub mod commission_service;
pub use commission_service::CommissionService;
pub mod disbursement_service;
pub use disbursement_service::DisbursementService;
pub mod rto_service;
pub use rto_service::RtoService;
