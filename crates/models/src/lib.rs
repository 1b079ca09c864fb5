//! Persistence layer: MongoDB store handle and the user document.

pub mod errors;
pub mod db;
pub mod user;
