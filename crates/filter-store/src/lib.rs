//! # Filter Store
//!
//! The single owner of the current `FilterState`. Pages share one store
//! instance by cloning the handle (the state lives behind an `Arc`), which
//! replaces the source console's window-level custom events for cross-page
//! currency sync with an explicitly injected reference.
//!
//! Every accepted change builds a fresh immutable state (replace, not
//! in-place mutation) and synchronously notifies subscribers. A rejected
//! change leaves the previous valid state untouched.

use core_types::{CurrencyCode, FilterPatch, FilterState};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, Weak};
use uuid::Uuid;

pub mod error;

pub use error::StoreError;

type Listener = Arc<dyn Fn(&FilterState) + Send + Sync>;

struct StoreInner {
    state: FilterState,
    listeners: Vec<(Uuid, Listener)>,
}

/// A cloneable handle to the shared filter selection.
#[derive(Clone)]
pub struct FilterStore {
    inner: Arc<Mutex<StoreInner>>,
    /// The display currencies the converter can actually produce; mutations
    /// outside this set are rejected.
    supported_currencies: BTreeSet<CurrencyCode>,
}

impl FilterStore {
    /// Builds a store from the externally persisted initial currency and the
    /// converter's supported set. All other fields start at page defaults.
    pub fn new(
        initial_currency: CurrencyCode,
        supported_currencies: impl IntoIterator<Item = CurrencyCode>,
    ) -> Result<Self, StoreError> {
        let supported_currencies: BTreeSet<CurrencyCode> =
            supported_currencies.into_iter().collect();
        if !supported_currencies.contains(&initial_currency) {
            return Err(StoreError::InvalidFilterValue {
                field: "currency".to_string(),
                value: initial_currency.to_string(),
            });
        }
        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner {
                state: FilterState::with_currency(initial_currency),
                listeners: Vec::new(),
            })),
            supported_currencies,
        })
    }

    /// A read-only snapshot of the current state.
    pub fn state(&self) -> FilterState {
        self.lock().state
    }

    /// Applies a partial update. Enum membership is enforced by the type
    /// system; the one open-ended value, the currency, is validated against
    /// the supported set. On rejection the previous state is retained and no
    /// listener fires.
    pub fn set_filter(&self, patch: FilterPatch) -> Result<FilterState, StoreError> {
        if let Some(currency) = patch.currency {
            if !self.supported_currencies.contains(&currency) {
                tracing::warn!(%currency, "rejected filter mutation: unsupported currency");
                return Err(StoreError::InvalidFilterValue {
                    field: "currency".to_string(),
                    value: currency.to_string(),
                });
            }
        }

        let (next, listeners) = {
            let mut inner = self.lock();
            let next = inner.state.apply(&patch);
            inner.state = next;
            (next, inner.listeners.clone())
        };

        // Listeners run outside the lock so they can read the store back.
        for (_, listener) in &listeners {
            listener(&next);
        }
        Ok(next)
    }

    /// Registers a synchronous listener. Dropping the returned subscription
    /// unregisters it.
    pub fn subscribe(&self, listener: impl Fn(&FilterState) + Send + Sync + 'static) -> Subscription {
        let id = Uuid::new_v4();
        self.lock().listeners.push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // A poisoned lock means a listener panicked; the state itself is
        // still a fully-formed prior value.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// RAII unsubscribe token for a registered listener.
pub struct Subscription {
    id: Uuid,
    store: Weak<Mutex<StoreInner>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            if let Ok(mut guard) = inner.lock() {
                guard.listeners.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{EntityFilter, Granularity};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn store() -> FilterStore {
        FilterStore::new(
            CurrencyCode::Usd,
            [CurrencyCode::Usd, CurrencyCode::Eur],
        )
        .unwrap()
    }

    #[test]
    fn set_filter_replaces_state_and_notifies() {
        let store = store();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_listener = Arc::clone(&seen);
        let _sub = store.subscribe(move |state| {
            seen_in_listener.lock().unwrap().push(state.currency);
        });

        let before = store.state();
        store.set_filter(FilterPatch::currency(CurrencyCode::Eur)).unwrap();

        assert_eq!(before.currency, CurrencyCode::Usd);
        assert_eq!(store.state().currency, CurrencyCode::Eur);
        assert_eq!(*seen.lock().unwrap(), vec![CurrencyCode::Eur]);
    }

    #[test]
    fn rejected_mutation_keeps_previous_state_silently() {
        let store = store();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_listener = Arc::clone(&fired);
        let _sub = store.subscribe(move |_| {
            fired_in_listener.fetch_add(1, Ordering::SeqCst);
        });

        let err = store
            .set_filter(FilterPatch::currency(CurrencyCode::Jpy))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidFilterValue { .. }));
        assert_eq!(store.state().currency, CurrencyCode::Usd);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dropping_the_subscription_unregisters() {
        let store = store();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_listener = Arc::clone(&fired);
        let sub = store.subscribe(move |_| {
            fired_in_listener.fetch_add(1, Ordering::SeqCst);
        });

        store
            .set_filter(FilterPatch::granularity(Granularity::Quarterly))
            .unwrap();
        drop(sub);
        store
            .set_filter(FilterPatch::entity(EntityFilter::Entity(1)))
            .unwrap();

        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clones_share_one_state() {
        let store = store();
        let other = store.clone();
        other.set_filter(FilterPatch::currency(CurrencyCode::Eur)).unwrap();
        assert_eq!(store.state().currency, CurrencyCode::Eur);
    }

    #[test]
    fn initial_currency_must_be_supported() {
        assert!(FilterStore::new(CurrencyCode::Jpy, [CurrencyCode::Usd]).is_err());
    }

    #[test]
    fn listeners_may_read_the_store_back() {
        let store = store();
        let handle = store.clone();
        let observed = Arc::new(Mutex::new(None));
        let observed_in_listener = Arc::clone(&observed);
        let _sub = store.subscribe(move |_| {
            *observed_in_listener.lock().unwrap() = Some(handle.state().currency);
        });

        store.set_filter(FilterPatch::currency(CurrencyCode::Eur)).unwrap();
        assert_eq!(*observed.lock().unwrap(), Some(CurrencyCode::Eur));
    }
}
