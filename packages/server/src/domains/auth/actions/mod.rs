//! Auth domain actions - business logic functions
//!
//! Actions are stateless async functions over the auth backend. The session
//! resolver calls them and owns whatever state comes out.

mod fetch_role;
mod send_otp;
mod sign_in;
mod sign_up;
mod verify_otp;

pub use fetch_role::fetch_role;
pub use send_otp::send_otp;
pub use sign_in::sign_in_with_password;
pub use sign_up::{sign_up, SignUpRequest};
pub use verify_otp::verify_otp;
