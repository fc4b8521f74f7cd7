//! Process-wide cache of type descriptors.
//!
//! Descriptors are built on first use and kept for the rest of the process.
//! Lookups take a shared read lock; a miss builds the descriptor outside any
//! lock and then inserts it under the write lock. When two threads race on
//! the same type both build, the first insertion wins and the other copy is
//! dropped.

use crate::{Error, Marshal, Result, TypeDescriptor};
use log::{debug, trace};
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

type Entry = &'static (dyn Any + Send + Sync);

struct Registry {
    entries: RwLock<HashMap<TypeId, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Cache hit/miss statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistryStats {
    pub hits: u64,
    pub misses: u64,
    pub types: usize,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(|| Registry {
        entries: RwLock::new(HashMap::new()),
        hits: AtomicU64::new(0),
        misses: AtomicU64::new(0),
    })
}

fn downcast<T: Marshal>(entry: Entry) -> Result<&'static TypeDescriptor<T>> {
    entry.downcast_ref::<TypeDescriptor<T>>().ok_or_else(|| {
        Error::configuration(format!(
            "cached descriptor for {} has the wrong type",
            std::any::type_name::<T>()
        ))
    })
}

/// Returns the descriptor of `T`, building and caching it on first use.
///
/// A failed [`Marshal::describe`] is not cached; the next lookup tries again.
pub fn descriptor<T: Marshal>() -> Result<&'static TypeDescriptor<T>> {
    let registry = registry();
    let id = TypeId::of::<T>();

    let cached = registry.entries.read().get(&id).copied();
    if let Some(entry) = cached {
        registry.hits.fetch_add(1, Ordering::Relaxed);
        return downcast(entry);
    }

    registry.misses.fetch_add(1, Ordering::Relaxed);
    let built = T::describe()?;

    let mut entries = registry.entries.write();
    if let Some(entry) = entries.get(&id).copied() {
        trace!(
            "descriptor for {} registered concurrently, keeping the first",
            built.name()
        );
        return downcast(entry);
    }
    let leaked: &'static TypeDescriptor<T> = Box::leak(Box::new(built));
    entries.insert(id, leaked);
    debug!(
        "registered descriptor {} ({} fields, {} cached types)",
        leaked.name(),
        leaked.fields().len(),
        entries.len()
    );
    Ok(leaked)
}

/// Returns `true` if the descriptor of `T` is already cached.
#[must_use]
pub fn is_registered<T: Marshal>() -> bool {
    registry().entries.read().contains_key(&TypeId::of::<T>())
}

/// Snapshot of the cache counters.
#[must_use]
pub fn stats() -> RegistryStats {
    let registry = registry();
    RegistryStats {
        hits: registry.hits.load(Ordering::Relaxed),
        misses: registry.misses.load(Ordering::Relaxed),
        types: registry.entries.read().len(),
    }
}
