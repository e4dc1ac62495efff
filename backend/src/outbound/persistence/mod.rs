//! PostgreSQL persistence adapters built on Diesel.
//!
//! Layout mirrors the ports: one repository file per port, a shared pool,
//! `schema.rs` table definitions, and private row structs in `models.rs`.

mod diesel_report_repository;
mod diesel_summary_query;
mod diesel_user_repository;
mod diesel_verification_repository;
mod error_mapping;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_report_repository::DieselReportRepository;
pub use diesel_summary_query::DieselSummaryQuery;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_verification_repository::DieselVerificationRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
