//! HTTP gateway: routing and request/response mapping.
//!
//! Everything in this crate is pass-through: translate inbound HTTP into
//! calls against the token issuer, permission evaluator, and directory
//! engine, and map their numeric result statuses onto transport status codes.

pub mod app;
pub mod config;
