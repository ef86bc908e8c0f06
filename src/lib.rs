//! Core library for the `loadstream` server.
//!
//! An observer opens a WebSocket, sends one run configuration and receives one
//! progress message per completed request followed by a final result. The
//! [`engine`] module holds the load generator itself; [`session`] and
//! [`server`] are the transport around it.
pub mod args;
pub mod config;
pub mod engine;
pub mod entry;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod protocol;
pub mod server;
pub mod session;
pub mod shutdown;
