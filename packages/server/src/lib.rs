// Elverra Global - membership platform core
//
// Session resolution on top of Supabase auth, per-user role caching,
// translation catalogs, the role-gated route table and the HTTP server that
// serves them.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
