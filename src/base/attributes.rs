//! String-keyed, type-erased metadata bag.

use std::{
    any::Any,
    borrow::Cow,
    collections::HashMap,
    fmt,
    sync::{Arc, LazyLock},
};

/// Arbitrary metadata attached to addresses and resolver results.
///
/// Values are stored behind `Arc` so cloning a bag is cheap. Lookups are
/// typed: [`Attributes::get`] returns `None` when the key is missing or holds
/// a value of another type.
#[derive(Clone, Default)]
pub struct Attributes {
    values: HashMap<Cow<'static, str>, Arc<dyn Any + Send + Sync>>,
}

static EMPTY: LazyLock<Attributes> = LazyLock::new(Attributes::default);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared empty bag, handed out when no attributes were ever set.
    pub fn empty() -> &'static Attributes {
        &EMPTY
    }

    pub fn insert<T>(&mut self, key: impl Into<Cow<'static, str>>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.values.insert(key.into(), Arc::new(value));
    }

    /// Builder form of [`Attributes::insert`].
    pub fn with<T>(mut self, key: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.insert(key, value);
        self
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_set().entries(keys).finish()
    }
}
