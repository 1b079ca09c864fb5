//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration and sign-in logic lives here, independent of the HTTP layer.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod service;
pub mod repo;

pub use errors::AuthError;
pub use service::AuthService;
