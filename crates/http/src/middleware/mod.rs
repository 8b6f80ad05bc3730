//! Middleware components for HTTP request processing

pub mod edge;

pub use edge::edge_guard_middleware;
