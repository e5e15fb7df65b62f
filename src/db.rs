pub mod application_repo;
pub use application_repo::ApplicationRepository;
pub mod audit_repo;
pub use audit_repo::AuditRepository;
pub mod commission_repo;
pub use commission_repo::CommissionRepository;
pub mod disbursement_repo;
pub use disbursement_repo::DisbursementRepository;
pub mod rto_repo;
pub use rto_repo::RtoRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
