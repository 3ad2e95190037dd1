//! Core runtime for brim.
//!
//! A [`Tracker`] keeps a sharded map from [`QueueId`] to [`Sampler`]. Each
//! sampler reads its queue through a [`WeakHandle`], so tracking never keeps
//! a queue alive. [`Tracker::sample`] reads every entry, returns the reports
//! sorted by call site, and hands entries whose queue is gone to a background
//! sweeper.
//!
//! Dead entries are only discovered by sampling. A process that never samples
//! keeps one small entry per queue it ever registered.

mod config;
mod handle;
mod registry;
mod sampler;
mod source;
mod sweeper;
mod tracker;

pub use brim_types::{Level, QueueId, Report};

pub use self::config::{Config, TRACKING_ENV, parse_switch};
pub use self::handle::{Depth, WeakHandle};
pub use self::registry::Registry;
pub use self::sampler::Sampler;
#[doc(hidden)]
pub use self::source::__function_path;
pub use self::source::{Source, UNKNOWN_FUNCTION, UNKNOWN_LOCATION};
pub use self::tracker::Tracker;
