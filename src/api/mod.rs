//! # API Layer
//!
//! External interfaces of the service.
//!
//! - [`rest`]: axum router, handlers, admission middleware and server loop
pub mod rest;
