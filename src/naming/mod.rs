//! Identifier generation: uniquification, sanitization and pluralization

mod ecma;
mod pluralization;
mod uniquifier;

pub use ecma::{create_valid_ecma_name, is_valid_ecma_name};
pub use pluralization::{EnglishPluralizationService, NoPluralization, PluralizationService};
pub use uniquifier::{NameComparer, UniqueIdentifierService};
