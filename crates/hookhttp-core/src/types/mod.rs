//! Request, response, and cancellation types shared by every crate.

pub mod cancel;
pub mod request;
pub mod response;

pub use cancel::{AbortHandle, CancelId};
pub use request::{Method, RequestDescriptor};
pub use response::{HttpResponse, RawResponse};
