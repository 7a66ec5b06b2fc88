//! Core library for DocVault.
//!
//! Contains the access gate state machine, the credential digest function,
//! and the document manifest model. This crate depends on `docvault-storage`
//! for the state store trait and knows nothing about HTTP or the filesystem
//! layout of a deployment.
//!
//! The gate is a UX-level access control, not an authentication system: the
//! expected digest is static configuration, and anyone who can read the
//! deployment config can read it. What the gate does guarantee is consistent
//! attempt counting, a timed lockout after repeated failures, and session
//! restore across restarts of the caller.

pub mod digest;
pub mod error;
pub mod gate;
pub mod manifest;
