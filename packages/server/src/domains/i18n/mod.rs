//! i18n domain - translation catalogs and lookup
//!
//! Catalogs are embedded at build time. A `Translator` is a cheap
//! per-language view over the shared `Catalog`; lookups never fail.

pub mod catalog;
pub mod language;
pub mod translator;

pub use catalog::Catalog;
pub use language::Language;
pub use translator::{interpolate, Translator};
