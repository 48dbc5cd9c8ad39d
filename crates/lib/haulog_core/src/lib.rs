//! # haulog_core
//!
//! Core domain logic for the Haulog session client.

pub mod error;
pub mod models;
pub mod store;

pub use error::{AuthError, AuthResult};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
