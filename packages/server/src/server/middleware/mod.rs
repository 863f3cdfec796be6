// HTTP middleware
pub mod jwt_auth;
pub mod role_gate;

pub use jwt_auth::*;
pub use role_gate::*;
