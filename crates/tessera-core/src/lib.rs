//! Core systems for Tessera.
//!
//! This crate provides the foundations the component layer is built on:
//!
//! - **Signal/Slot System**: Synchronous, re-entrancy safe notifications
//! - **Errors**: Error types shared by the signal machinery
//! - **Logging**: `tracing` targets, perf spans and tree formatting options
//!
//! # Signal/Slot Example
//!
//! ```
//! use tessera_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//! value_changed.disconnect(conn_id);
//! ```

pub mod error;
pub mod logging;
pub mod signal;

pub use error::{SignalError, SignalResult};
pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use signal::{ConnectionId, Signal};
