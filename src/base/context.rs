//! Ergonomic error context helpers.
//!
//! Provides an extension trait for turning arbitrary `Result` errors into
//! context-rich [`Status`] values that can be delivered to a listener.

use crate::base::status::{Code, Status};
use std::error::Error;

/// Extension trait for attaching RPC status context to a `Result`.
pub trait StatusResultExt<T> {
    /// Map the error to a status with `code` and `detail`, keeping the
    /// original error as the status source.
    ///
    /// # Example
    /// ```ignore
    /// use rpcresolve::base::context::StatusResultExt;
    ///
    /// let addrs = backend.resolve(name).await
    ///     .unavailable_context("Error getting DNS hosts for address 'example.com'")?;
    /// ```
    fn status_context(self, code: Code, detail: impl Into<String>) -> Result<T, Status>;

    /// Shorthand for [`Code::Unavailable`] context.
    fn unavailable_context(self, detail: impl Into<String>) -> Result<T, Status>;
}

impl<T, E> StatusResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn status_context(self, code: Code, detail: impl Into<String>) -> Result<T, Status> {
        self.map_err(|e| Status::new(code, detail).with_source(e))
    }

    fn unavailable_context(self, detail: impl Into<String>) -> Result<T, Status> {
        self.status_context(Code::Unavailable, detail)
    }
}
