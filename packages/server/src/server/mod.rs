// HTTP server setup (Axum)
pub mod app;
pub mod error_boundary;
pub mod middleware;
pub mod routes;

pub use app::*;
