//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod health;
pub mod reports;
pub mod session;
pub mod state;
pub mod summaries;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;
pub mod verifications;

pub use error::ApiResult;
