//! Domain ports: async traits implemented by outbound adapters.
//!
//! Services depend on these traits only; concrete Diesel, storage, and
//! hashing adapters live under `outbound/`.

mod macros;

pub mod credential_hasher;
pub mod object_storage;
pub mod report_repository;
pub mod summary_query;
pub mod user_repository;
pub mod verification_repository;

pub use credential_hasher::{CredentialHashError, CredentialHasher};
pub use object_storage::{ObjectStorage, ObjectStorageError};
pub use report_repository::{
    BoundingRadius, ReportPersistenceError, ReportRepository, StatusUpdate, VerifiedReport,
};
pub use summary_query::{
    ReportAnalyticsBucket, SummaryQuery, SummaryQueryError, UserReportSummary,
};
pub use user_repository::{UserPersistenceError, UserRepository};
pub use verification_repository::{VerificationPersistenceError, VerificationRepository};
