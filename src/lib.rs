//! captureorder - order capture service
//!
//! Accepts orders over HTTP, stores them in a MongoDB-compatible document
//! store, and optionally reports each capture to Application Insights and to
//! an event hub endpoint authorized with a shared access signature.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod models;
pub mod notify;
pub mod routes;
pub mod sas;
pub mod service;
pub mod state;
pub mod store;
pub mod telemetry;

pub use error::AppError;
pub use sas::{Clock, FixedClock, SignedToken, SystemClock, TokenSigner};
