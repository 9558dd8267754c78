//! Signal/slot system for Tessera.
//!
//! Signals are the only channel through which a component talks to whoever
//! holds it. A component emits on its own signal; a parent group, or a
//! rendering surface at the root, connects a slot and reacts.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//!
//! # Dispatch Order
//!
//! Emission is synchronous: `emit` returns only after every slot has run.
//! Slots are invoked newest-first, over a snapshot of the connections taken
//! when `emit` starts. A connection removed while the snapshot is being
//! walked is skipped if it has not been reached yet, so a slot may
//! disconnect itself or any other slot without causing a skipped or
//! doubled call.
//!
//! No lock is held while a slot runs. Slots may connect, disconnect, emit
//! other signals or re-enter the emitting object.
//!
//! # Example
//!
//! ```
//! use tessera_core::Signal;
//!
//! let count_changed = Signal::<usize>::new();
//!
//! let conn_id = count_changed.connect(|count| {
//!     println!("Count is now {}", count);
//! });
//!
//! count_changed.emit(3);
//! count_changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{SignalError, SignalResult};
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// The ID remains valid until the connection is explicitly disconnected or
    /// the signal is dropped.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Live connections, plus the order in which they were made.
struct Connections<Args> {
    slots: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

impl<Args> Connections<Args> {
    fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
        }
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple/enum for richer payloads.
pub struct Signal<Args> {
    connections: Mutex<Connections<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Connections::new()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut connections = self.connections.lock();
        let id = connections.slots.insert(Arc::new(slot));
        connections.order.push(id);
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.lock();
        if connections.slots.remove(id).is_none() {
            return false;
        }
        connections.order.retain(|&other| other != id);
        true
    }

    /// Like [`disconnect`](Self::disconnect), but reports a missing
    /// connection as an error.
    pub fn try_disconnect(&self, id: ConnectionId) -> SignalResult<()> {
        if self.disconnect(id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection)
        }
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        let mut connections = self.connections.lock();
        connections.slots.clear();
        connections.order.clear();
    }

    /// Returns `true` if `id` is still connected to this signal.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.lock().slots.contains_key(id)
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().slots.len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` will do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots newest-first.
    #[tracing::instrument(skip_all, target = "tessera_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let snapshot: Vec<(ConnectionId, Slot<Args>)> = {
            let connections = self.connections.lock();
            connections
                .order
                .iter()
                .rev()
                .filter_map(|&id| connections.slots.get(id).map(|slot| (id, slot.clone())))
                .collect()
        };
        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        for (id, slot) in snapshot {
            // Disconnected by an earlier slot in this same dispatch.
            if !self.is_connected(id) {
                continue;
            }
            slot(&args);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
