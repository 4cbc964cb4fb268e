//! Convenience result type alias for hookhttp.

use crate::error::HttpError;

/// A specialized `Result` type for hookhttp operations.
///
/// Hook handlers, transports, and the client facade all return this so a
/// plugin error can travel through the `?` operator untouched.
pub type HttpResult<T> = Result<T, HttpError>;
