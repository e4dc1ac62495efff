//! Pothole reporting backend.
//!
//! Hexagonal layout: the `domain` module holds the report lifecycle, the
//! credit award policy, and the ports; `inbound` exposes the REST surface;
//! `outbound` implements the ports over PostgreSQL, argon2, and the
//! filesystem media store.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
