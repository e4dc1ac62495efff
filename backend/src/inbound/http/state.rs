//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and ports, and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ObjectStorage, SummaryQuery};
use crate::domain::{ReportService, UserService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<UserService>,
    pub reports: Arc<ReportService>,
    pub summaries: Arc<dyn SummaryQuery>,
    pub storage: Arc<dyn ObjectStorage>,
}

impl HttpState {
    /// Bundle the application services and read-side ports for handlers.
    pub fn new(
        users: Arc<UserService>,
        reports: Arc<ReportService>,
        summaries: Arc<dyn SummaryQuery>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            users,
            reports,
            summaries,
            storage,
        }
    }
}
