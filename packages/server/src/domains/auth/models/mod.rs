pub mod identifier;
pub mod role;
pub mod session;

pub use identifier::*;
pub use role::*;
pub use session::*;
