//! HTTP route handlers.

pub mod artwork;
pub mod health;
pub mod library;
