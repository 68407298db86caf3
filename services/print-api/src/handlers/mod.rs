//! HTTP request handlers for the print gateway.
//!
//! This module is organized into submodules:
//! - `templates`: print template listing
//! - `print`: the print pipeline endpoint
//! - `health`: health checks, readiness, Prometheus metrics, API descriptor
//! - `common`: shared utilities (error responses, caller identity)

pub mod common;
pub mod health;
pub mod print;
pub mod templates;

pub use common::{caller_identity, error_response};
pub use health::{api_descriptor_handler, health_handler, metrics_handler, ready_handler};
pub use print::print_handler;
pub use templates::templates_handler;
