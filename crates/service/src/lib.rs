//! Service layer for account registration and sign-in.
//! - Separates business logic from data access and from HTTP.
//! - Reuses validation and document definitions in the `models` crate.

pub mod auth;
