//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{ServerDeps, SupabaseAdapter};
pub use test_dependencies::{MockAuthBackend, MOCK_JWT_SECRET};
pub use traits::*;
