//! HTTP server lifecycle.
//!
//! Binds the configured address, serves the router over plain HTTP (TLS is
//! expected to terminate at the ingress), and drains in-flight requests on
//! SIGTERM/SIGINT.

mod server;
mod shutdown;

pub use server::{start_server, ServerError};
