//! Domain layer: entities, validation, the credit award policy, ports, and
//! application services.
//!
//! Everything here is transport and storage agnostic. Inbound adapters map
//! [`Error`] to HTTP responses; outbound adapters implement the traits under
//! [`ports`].

pub mod credits;
pub mod error;
pub mod ports;
pub mod report;
pub mod report_service;
pub mod user;
pub mod user_service;
pub mod verification;

pub use self::credits::{StatusTransition, BASE_AWARD, COMPLETED_BONUS, VERIFIED_BONUS};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::report::{
    Coordinates, NewReport, Report, ReportId, ReportStatus, ReportValidationError, Severity,
    StoredImage,
};
pub use self::report_service::ReportService;
pub use self::user::{
    EmailAddress, NewUser, PasswordHash, PhoneNumber, User, UserId, Username, UserValidationError,
};
pub use self::user_service::{RegisterUser, UserService};
pub use self::verification::{
    NewVerification, VerificationOutcome, VerificationRecord, VerificationValidationError,
};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
