//! Wire types for the device automation bridge.
//!
//! This crate contains the serde-serializable types exchanged with a
//! test-orchestration caller - the shapes of data as they appear on the
//! wire - together with the parser that turns an untrusted `(action,
//! params)` pair into a typed [`ActionRequest`].
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: no session access, no process spawning; the parser is
//!   side-effect free
//! - **Stable**: the response shapes and the snapshot framing are a
//!   compatibility contract with existing callers and must not drift
//!
//! The bridge itself lives in the `simbridge` crate and consumes these
//! types.

pub mod action;
pub mod response;
pub mod snapshot;

pub use action::*;
pub use response::*;
pub use snapshot::*;
