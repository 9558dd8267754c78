//! Logging and debugging facilities for Tessera.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Shared options for component tree visualization
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Tessera uses the `tracing` crate for instrumentation. To see logs, install
//! a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("tessera=debug,tessera_core::signal=trace")
//!         .init();
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core framework target.
    pub const CORE: &str = "tessera_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "tessera_core::signal";
    /// Component contract and leaf components.
    pub const COMPONENT: &str = "tessera::component";
    /// Component group bookkeeping and change translation.
    pub const GROUP: &str = "tessera::group";
    /// Range-indexed list mutations.
    pub const RANGE_LIST: &str = "tessera::range_list";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

impl TreeStyle {
    /// Returns the `(continuation, tee, corner)` glyphs for this style.
    pub fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            Self::Ascii => ("|", "+--", "`--"),
            Self::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            Self::Compact => ("", "-", "-"),
        }
    }
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show each node's absolute range.
    pub show_ranges: bool,
    /// Whether to show type names.
    pub show_types: bool,
    /// Whether to show each node's lane count.
    pub show_lanes: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ranges: true,
            show_types: true,
            show_lanes: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_lanes: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_ranges: false,
            show_types: false,
            show_lanes: false,
            ..Default::default()
        }
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "tessera::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
