//! Single-writer state container
//!
//! A [`Store`] owns one state value and only changes it by running a pure
//! reducer over a typed mutation. Every write happens under one lock, so a
//! read-modify-write mutation (an append) always sees the latest state, and
//! every applied write is announced on the store's event bus.
//!
//! # Load tickets
//!
//! A load that replaces a field wholesale takes a [`Ticket`] for that field
//! *before* its request is sent. When the response arrives it is applied with
//! [`Store::dispatch_fresh`], which drops it if a write issued later has
//! already landed on the same field. Two overlapping loads therefore settle on
//! the response of the later request, whatever order the responses arrive in.
//!
//! # Example
//!
//! ```
//! use libjobboard::store::{ClientState, Field, Mutation, Store};
//! use libjobboard::types::JobOffer;
//!
//! let store: Store<ClientState> = Store::new();
//!
//! let ticket = store.ticket(Field::JobOffers);
//! let applied = store.dispatch_fresh(ticket, Mutation::JobOffersLoaded(vec![JobOffer::new(1)]));
//!
//! assert!(applied);
//! assert_eq!(store.snapshot().job_offers.len(), 1);
//! ```

pub mod events;
pub mod mutation;
pub mod reducer;
pub mod state;

pub use mutation::Mutation;
pub use reducer::reduce;
pub use state::{ClientState, Field};

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use self::events::{EventBus, EventReceiver, StoreEvent};

/// Buffered events per subscriber
const EVENT_CAPACITY: usize = 64;

/// State types that can live in a [`Store`]
pub trait Reducer: Clone + Default + Send + Sync + 'static {
    /// Typed write accepted by the state
    type Mutation: Debug + Send;

    /// Field identifiers used for tickets and notifications
    type Field: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    /// Pure transition `(State, Mutation) -> State`
    fn reduce(self, mutation: Self::Mutation) -> Self;

    /// Fields a mutation replaces
    fn touched(mutation: &Self::Mutation) -> Vec<Self::Field>;
}

/// Permission to apply a load result to one field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket<F> {
    field: F,
    seq: u64,
}

impl<F: Copy> Ticket<F> {
    pub fn field(&self) -> F {
        self.field
    }
}

struct Inner<S: Reducer> {
    state: S,
    // Sequence number of the newest write applied to each field
    applied: HashMap<S::Field, u64>,
}

/// Explicitly owned state container; share it through `Arc`
pub struct Store<S: Reducer> {
    inner: RwLock<Inner<S>>,
    next_seq: AtomicU64,
    events: EventBus<StoreEvent<S::Field>>,
}

impl<S: Reducer> Store<S> {
    pub fn new() -> Self {
        Self::with_state(S::default())
    }

    pub fn with_state(state: S) -> Self {
        Self {
            inner: RwLock::new(Inner {
                state,
                applied: HashMap::new(),
            }),
            next_seq: AtomicU64::new(1),
            events: EventBus::new(EVENT_CAPACITY),
        }
    }

    /// Clone of the full current state
    pub fn snapshot(&self) -> S {
        self.read(Clone::clone)
    }

    /// Borrow the current state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner.state)
    }

    /// Reserve a ticket for a load that will replace `field`
    pub fn ticket(&self, field: S::Field) -> Ticket<S::Field> {
        Ticket {
            field,
            seq: self.next_seq(),
        }
    }

    /// Apply a mutation unconditionally
    pub fn dispatch(&self, mutation: S::Mutation) {
        let seq = self.next_seq();
        let fields = S::touched(&mutation);
        {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            Self::apply(&mut inner, mutation, &fields, seq);
        }
        self.notify(fields);
    }

    /// Apply a load result unless a newer write already replaced the field
    ///
    /// Returns `false` when the result was stale and dropped.
    pub fn dispatch_fresh(&self, ticket: Ticket<S::Field>, mutation: S::Mutation) -> bool {
        let fields = S::touched(&mutation);
        {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            let newest = inner.applied.get(&ticket.field).copied().unwrap_or(0);
            if newest > ticket.seq {
                tracing::debug!(
                    "Dropping stale {:?} load (ticket {}, newest write {})",
                    ticket.field,
                    ticket.seq,
                    newest
                );
                return false;
            }
            Self::apply(&mut inner, mutation, &fields, ticket.seq);
        }
        self.notify(fields);
        true
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> EventReceiver<StoreEvent<S::Field>> {
        self.events.subscribe()
    }

    fn apply(inner: &mut Inner<S>, mutation: S::Mutation, fields: &[S::Field], seq: u64) {
        let current = std::mem::take(&mut inner.state);
        inner.state = current.reduce(mutation);
        for field in fields {
            inner.applied.insert(*field, seq);
        }
    }

    fn notify(&self, fields: Vec<S::Field>) {
        if !fields.is_empty() {
            self.events.emit(StoreEvent { fields });
        }
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }
}

impl<S: Reducer> Default for Store<S> {
    fn default() -> Self {
        Self::new()
    }
}
