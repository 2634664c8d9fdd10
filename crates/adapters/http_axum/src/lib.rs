//! # matterhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **command relay**: `POST /on`, `/off`, `/brightness`,
//!   `/color` with a `node_id` in the JSON body, answering
//!   `{"status": "..."}` once the controller has run
//! - Serve a **JSON management API** under `/api` (devices, pairing, scenes,
//!   WiFi networks, automation status and logs)
//! - Map application results and [`MatterHubError`](matterhub_domain::error::MatterHubError)
//!   into HTTP responses
//!
//! ## Dependency rule
//! Depends on `matterhub-app` (for port traits and services) and
//! `matterhub-domain` (for request/response types). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod relay;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
