//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! Following the hexagonal layout:
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **auth**: argon2id credential hashing
//! - **object_storage**: filesystem-backed image store
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic; the one nuance they own
//! is the transactional boundary around status transitions and credit
//! awards.

pub mod auth;
pub mod object_storage;
pub mod persistence;
