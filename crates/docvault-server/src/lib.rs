//! DocVault HTTP server.
//!
//! Wires the access gate and the document library into an Axum app. The
//! gate routes are public; the library routes sit behind the session
//! middleware and are unreachable until a verification has succeeded.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
