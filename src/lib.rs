//! Back-office core for a staffing agency.
//!
//! The crate implements the logic shared by every staff dashboard variant:
//! an in-memory applicant directory with search, structured filtering, and
//! location facets; the review workflow that walks an applicant from intake
//! through vetting, approval, and hire; and a background refresh scheduler
//! that keeps the directory synchronized with the agency API.
//!
//! Presentation layers (web dashboards, the bundled CLI) consume these
//! modules through the [`workflows`] facade and never talk to the HTTP API
//! directly.

pub mod auth;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use auth::{AuthContext, StaffRole};
pub use config::AppConfig;
pub use error::AppError;
