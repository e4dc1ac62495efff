//! Port abstraction for image object storage.
//!
//! The core never manipulates image bytes: it hands them to this port and
//! stores the returned reference on the report.

use async_trait::async_trait;

use crate::domain::report::StoredImage;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by object storage adapters.
    pub enum ObjectStorageError {
        /// Storage backend is unreachable.
        Unavailable { message: String } => "object storage unavailable: {message}",
        /// The upload was rejected (bad key, quota, permissions).
        Rejected { message: String } => "object storage rejected upload: {message}",
    }
}

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Persist image bytes under a generated key and return the reference.
    async fn store_image(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredImage, ObjectStorageError>;
}
