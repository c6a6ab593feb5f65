//! HTTP layer.

pub mod middleware;
pub mod routes;
pub mod server;
pub mod status;

pub use routes::*;
