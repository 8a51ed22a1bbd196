//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → access_control.rs (basic auth rules per path prefix)
//!     → headers.rs (security + no-cache response headers)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Auth rules are parsed once at startup, first matching prefix wins
//! - Credentials compared in constant time

pub mod access_control;
pub mod headers;
