//! Business logic services
//!
//! Services encapsulate the decision sequences and coordinate between
//! repositories and the auth primitives.

pub mod auth;

pub use auth::{AuthService, Registration};
