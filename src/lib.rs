//! Onboarding Edge Gateway - stateless authentication and capability-gated proxying.
//!
//! This crate fronts the customer-onboarding backend: it authenticates
//! administrators, mints and verifies signed session tokens, enforces the
//! `canViewLogs` capability at the edge, and relays allow-listed actions to
//! the upstream over action-labeled JSON POST.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod routes;
pub mod shutdown;
pub mod token;
pub mod upstream;

pub use config::Config;
pub use error::{ErrorCode, GatewayError};
pub use gateway::GatewayState;
pub use token::SessionTokenService;
