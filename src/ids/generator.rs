//! Identifier generation entry point.

use super::{Id, IdContext};
use crate::core::config::AgentConfig;
use crate::core::{Result, TraceStackError};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const UNREGISTERED: u64 = u64::MAX;

static NEXT_SEQUENCER_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Sequence state for each thread, created on the thread's first id
    static CURRENT_CONTEXT: RefCell<Option<IdContext>> = const { RefCell::new(None) };
}

/// Source of wall-clock milliseconds.
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// [`Clock`] reading the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
            Err(before) => -i64::try_from(before.duration().as_millis()).unwrap_or(i64::MAX),
        }
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Holds the application instance id assigned to this process by the collector.
///
/// Clones share the same slot.
#[derive(Debug, Clone)]
pub struct InstanceRegistry {
    instance_id: Arc<AtomicU64>,
}

impl InstanceRegistry {
    /// Creates a registry with no instance id yet.
    pub fn new() -> Self {
        Self {
            instance_id: Arc::new(AtomicU64::new(UNREGISTERED)),
        }
    }

    /// Creates a registry already holding `instance_id`.
    pub fn registered(instance_id: u32) -> Self {
        let registry = Self::new();
        registry.register(instance_id);
        registry
    }

    /// Creates a registry holding the configured instance id, if any.
    pub fn from_config(config: &AgentConfig) -> Self {
        match config.instance_id {
            Some(id) => Self::registered(id),
            None => Self::new(),
        }
    }

    /// Records the instance id returned by registration.
    pub fn register(&self, instance_id: u32) {
        self.instance_id
            .store(u64::from(instance_id), Ordering::Release);
        tracing::info!(instance_id, "application instance registered");
    }

    /// Forgets the instance id, e.g. after the collector lost its registry.
    pub fn reset(&self) {
        self.instance_id.store(UNREGISTERED, Ordering::Release);
    }

    /// The registered instance id, if any.
    pub fn instance_id(&self) -> Option<u32> {
        match self.instance_id.load(Ordering::Acquire) {
            UNREGISTERED => None,
            id => u32::try_from(id).ok(),
        }
    }
}

impl Default for InstanceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates [`Id`]s for the current process.
#[derive(Debug, Clone)]
pub struct GlobalIdGenerator<C: Clock = SystemClock> {
    registry: InstanceRegistry,
    clock: C,
}

impl GlobalIdGenerator<SystemClock> {
    /// Creates a generator reading the system clock.
    pub fn new(registry: InstanceRegistry) -> Self {
        Self::with_clock(registry, SystemClock)
    }
}

impl<C: Clock> GlobalIdGenerator<C> {
    /// Creates a generator reading `clock`.
    pub fn with_clock(registry: InstanceRegistry, clock: C) -> Self {
        Self { registry, clock }
    }

    /// The registry this generator takes its owner id from.
    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }

    /// Generates a new id owned by the registered instance.
    ///
    /// Fails with [`TraceStackError::NotReady`] until an instance id is
    /// registered.
    pub fn generate(&self) -> Result<Id> {
        let owner_id = self.registry.instance_id().ok_or(TraceStackError::NotReady)?;
        let now = self.clock.now_millis();

        let (sequencer_id, unique_seq) = CURRENT_CONTEXT.with(|cell| {
            let mut slot = cell.borrow_mut();
            let context = slot.get_or_insert_with(|| {
                IdContext::new(NEXT_SEQUENCER_ID.fetch_add(1, Ordering::Relaxed), now)
            });
            (context.sequencer_id(), context.next_seq(now))
        });

        Ok(Id {
            owner_id,
            sequencer_id,
            unique_seq,
        })
    }
}
