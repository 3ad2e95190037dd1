//! Tokio-backed brim registration surface.
//!
//! With the `diagnostics` feature every bounded channel built here is
//! registered with the process-wide [`Tracker`]. Without it the same API
//! compiles to plain tokio constructors and [`sample`] returns nothing.

#[doc(hidden)]
pub use tokio;

pub use brim_runtime::*;

#[cfg(not(feature = "diagnostics"))]
mod disabled;
#[cfg(feature = "diagnostics")]
mod enabled;

#[cfg(not(feature = "diagnostics"))]
pub use disabled::*;
#[cfg(feature = "diagnostics")]
pub use enabled::*;

/// Builds a bounded tokio channel and tracks it under the invocation site.
///
/// `channel!(capacity)` uses the process-wide tracker;
/// `channel!(&tracker, capacity)` uses the given one.
#[macro_export]
macro_rules! channel {
    ($capacity:expr $(,)?) => {
        $crate::channel_with_source($capacity, $crate::source!())
    };
    ($tracker:expr, $capacity:expr $(,)?) => {
        $crate::channel_in($tracker, $capacity, $crate::source!())
    };
}

/// Tracks an `Arc`-shared application queue under the invocation site.
#[macro_export]
macro_rules! track {
    ($queue:expr $(,)?) => {
        $crate::track_arc_with_source($queue, $crate::source!())
    };
}
