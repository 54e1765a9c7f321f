//! Database repositories
//!
//! Provides the data access layer over the principals store.

pub mod principal;

pub use principal::{NewPrincipal, PrincipalRecord, PrincipalRepository};
