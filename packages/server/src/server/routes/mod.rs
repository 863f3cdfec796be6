// HTTP routes
pub mod auth;
pub mod health;
pub mod language;
pub mod membership;
pub mod pages;
pub mod table;
pub mod translations;

pub use auth::*;
pub use health::*;
pub use language::*;
pub use membership::*;
pub use pages::*;
pub use translations::*;
