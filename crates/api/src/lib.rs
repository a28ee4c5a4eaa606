//! HTTP/WebSocket surface: request gate, routing, and response mapping.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
