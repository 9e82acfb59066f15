//! Concurrent name <-> code dictionary.
//!
//! Agents report application codes and operation names once, receive a
//! numeric code back, and from then on send only the code. This table
//! stores each name once and hands out stable codes starting at 1; code 0
//! is reserved for "no code".

use super::DictionaryCache;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// Name registry with lock-free lookups by name.
pub struct Dictionary {
    /// Forward mapping: name -> code
    table: DashMap<Arc<str>, i32>,
    /// Reverse mapping: code -> name, indexed by code
    reverse: RwLock<Vec<Arc<str>>>,
    next_code: AtomicI32,
}

impl Dictionary {
    /// Create a new dictionary with initial capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        let mut reverse = Vec::with_capacity(capacity);
        // Code 0 is the null value
        reverse.push(Arc::from(""));

        Self {
            table: DashMap::with_capacity(capacity),
            reverse: RwLock::new(reverse),
            next_code: AtomicI32::new(1),
        }
    }

    /// Create a dictionary registering `names` in order, so the first gets code 1
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dictionary = Self::new();
        for name in names {
            dictionary.register(name.as_ref());
        }
        dictionary
    }

    /// Register a name and get its code, reusing the existing code if known
    #[inline]
    pub fn register(&self, name: &str) -> i32 {
        if let Some(entry) = self.table.get(name) {
            return *entry.value();
        }

        self.register_slow(name)
    }

    #[cold]
    fn register_slow(&self, name: &str) -> i32 {
        let arc_name: Arc<str> = Arc::from(name);

        // Reserve the reverse slot while holding the write lock so codes
        // match their position.
        let mut reverse = self.reverse.write();
        match self.table.entry(Arc::clone(&arc_name)) {
            dashmap::mapref::entry::Entry::Occupied(e) => *e.get(),
            dashmap::mapref::entry::Entry::Vacant(e) => {
                let code = self.next_code.fetch_add(1, Ordering::Relaxed);
                e.insert(code);
                reverse.push(arc_name);
                code
            },
        }
    }

    /// Name registered under `code`
    #[inline]
    pub fn name(&self, code: i32) -> Option<Arc<str>> {
        if code <= 0 {
            return None;
        }
        let reverse = self.reverse.read();
        usize::try_from(code).ok().and_then(|idx| reverse.get(idx).cloned())
    }

    /// Code registered for `name`
    pub fn code(&self, name: &str) -> Option<i32> {
        self.table.get(name).map(|entry| *entry.value())
    }

    /// Number of registered names
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// True if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionaryCache for Dictionary {
    fn get(&self, code: i32) -> Option<String> {
        self.name(code).map(|name| name.to_string())
    }
}
