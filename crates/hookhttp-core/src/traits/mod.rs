//! Seams implemented outside this crate.

pub mod transport;

pub use transport::Transport;
