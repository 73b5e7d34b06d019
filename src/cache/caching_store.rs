use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::debug;

use crate::cache::description_cache::{DescriptionCache, LruDescriptionCache};
use crate::core::{Register, RegisterItem, TypedDescription};
use crate::rdf::{Iri, Term};
use crate::store::{Store, StoreResult, StoreWriter};

/// Out-of-band cache invalidation, e.g. from another process that
/// wrote to the same dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Invalidate(Iri),
    ClearAll,
}

/// A [`Store`] with register descriptions cached in front of it.
pub struct CachingStore {
    store: Store,
    cache: Arc<dyn DescriptionCache>,
    sender: Sender<Invalidation>,
    invalidations: Mutex<Receiver<Invalidation>>,
}

impl CachingStore {
    /// Cache sized from the store's configuration.
    pub fn new(store: Store) -> Self {
        let cache = Arc::new(LruDescriptionCache::new(store.config().cache_size));
        Self::with_cache(store, cache)
    }

    pub fn with_cache(store: Store, cache: Arc<dyn DescriptionCache>) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            store,
            cache,
            sender,
            invalidations: Mutex::new(receiver),
        }
    }

    /// The underlying store, for uncached reads.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn cache(&self) -> &dyn DescriptionCache {
        self.cache.as_ref()
    }

    /// Sender for invalidations; they are applied before the next access.
    pub fn invalidation_hook(&self) -> Sender<Invalidation> {
        self.sender.clone()
    }

    fn drain(&self) {
        let receiver = self.invalidations.lock();
        while let Ok(message) = receiver.try_recv() {
            debug!(?message, "cache invalidation");
            match message {
                Invalidation::Invalidate(uri) => self.cache.invalidate(&uri),
                Invalidation::ClearAll => self.cache.clear(),
            }
        }
    }

    /// Current version of `uri`; registers are served from the cache.
    pub fn get_current_version(&self, uri: &Iri) -> StoreResult<TypedDescription> {
        self.drain();
        if let Some(register) = self.cache.get(uri) {
            return Ok(TypedDescription::Register(register));
        }
        let description = self.store.get_current_version(uri)?;
        if let TypedDescription::Register(register) = &description {
            self.cache.put(register.clone());
        }
        Ok(description)
    }

    pub fn get_register(&self, uri: &Iri) -> StoreResult<Register> {
        Ok(self.get_current_version(uri)?.into_register()?)
    }

    pub fn add_to_register(&self, register: &Iri, item: RegisterItem, at: DateTime<Utc>) -> StoreResult<Iri> {
        let mut touched = vec![register.clone()];
        touched.extend(subregister_of(&item));
        self.around_write(&touched, || self.store.add_to_register(register, item, at))
    }

    pub fn update_item(&self, item: &mut RegisterItem, with_entity: bool, at: DateTime<Utc>) -> StoreResult<Iri> {
        let mut touched: Vec<Iri> = item.register_uri().cloned().into_iter().collect();
        touched.extend(subregister_of(item));
        self.around_write(&touched, || self.store.update_item(item, with_entity, at))
    }

    pub fn update_register(&self, register: &Register, at: DateTime<Utc>) -> StoreResult<Iri> {
        let touched: Vec<Iri> = register.uri().cloned().into_iter().collect();
        self.around_write(&touched, || self.store.update_register(register, at))
    }

    /// Deletes can reach any number of registers, so the whole cache goes.
    pub fn delete(&self, uri: &Iri) -> StoreResult<()> {
        self.drain();
        self.cache.clear();
        let result = self.store.delete(uri);
        self.cache.clear();
        result
    }

    /// Arbitrary write; clears the cache.
    pub fn write<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut StoreWriter<'_>) -> StoreResult<T>,
    {
        self.drain();
        self.cache.clear();
        let result = self.store.write(f);
        self.cache.clear();
        result
    }

    fn around_write<T>(&self, touched: &[Iri], f: impl FnOnce() -> StoreResult<T>) -> StoreResult<T> {
        self.drain();
        for uri in touched {
            self.cache.invalidate(uri);
        }
        let result = f();
        // a concurrent reader may have cached the old state meanwhile
        for uri in touched {
            self.cache.invalidate(uri);
        }
        result
    }
}

/// The sub-register an item manages, if any.
fn subregister_of(item: &RegisterItem) -> Option<Iri> {
    if !item.is_register() {
        return None;
    }
    item.entity_ref().and_then(Term::as_iri).cloned()
}

impl std::fmt::Debug for CachingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingStore")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
