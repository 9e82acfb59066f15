//! Dictionary lookups resolving numeric codes to names.
//!
//! Segments carry application ids and operation-name codes instead of
//! strings. Trace stack reconstruction resolves them through
//! [`DictionaryCache`] implementations; a miss degrades to an empty name.

mod cached;
mod dictionary;

pub use cached::CachedLookup;
pub use dictionary::Dictionary;

use crate::core::types::ID_SPLIT;

/// Resolves a dictionary code to its name.
pub trait DictionaryCache: Send + Sync {
    /// Name registered under `code`, if any.
    fn get(&self, code: i32) -> Option<String>;
}

impl<T: DictionaryCache + ?Sized> DictionaryCache for std::sync::Arc<T> {
    fn get(&self, code: i32) -> Option<String> {
        (**self).get(code)
    }
}

/// Dictionary entry under which an operation of an application is registered.
pub fn service_name_entry(application_id: i32, operation_name: &str) -> String {
    format!("{application_id}{ID_SPLIT}{operation_name}")
}

/// Operation name part of a service name dictionary entry.
///
/// Entries without an application prefix are returned unchanged.
pub fn operation_name_of(entry: &str) -> &str {
    entry.split_once(ID_SPLIT).map_or(entry, |(_, name)| name)
}
