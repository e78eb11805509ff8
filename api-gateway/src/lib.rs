//! Tool hub webhook gateway
//!
//! Validates tool requests against a fixed webhook registry and forwards
//! them to the n8n automation backend, adding the access credentials that
//! must never reach the browser.

pub mod config;
pub mod error;
pub mod executor;
pub mod registry;
pub mod server;
pub mod session;
pub mod status;
pub mod validator;
