//! Transport implementations.

pub mod reqwest;

pub use self::reqwest::ReqwestTransport;
pub use hookhttp_core::traits::Transport;
