//! Plugins shipped with the client.

pub mod cancelable;
pub mod request_log;

pub use cancelable::CancelablePlugin;
pub use request_log::RequestLogPlugin;
