//! Fill-level tracking for bounded channels.
//!
//! Brim answers one question at any moment: which bounded queues exist right
//! now, where were they created, how full are they, and how big is their
//! buffer. Construct channels through brim instead of tokio and ask for a
//! snapshot whenever you want one:
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() {
//!     let (tx, mut rx) = brim::channel!(64);
//!     tx.send(1u32).await.unwrap();
//!
//!     for report in brim::sample() {
//!         // e.g. "my_app::main main.rs:3 [1/64]"
//!         println!("{report}");
//!     }
//!     let _ = rx.recv().await;
//! }
//! ```
//!
//! Tracking holds only weak references. Once every sender and the receiver
//! of a channel are gone, the channel stops appearing in snapshots, and the snapshot that
//! notices hands its registry entry to a background sweeper.
//!
//! Entries are only found dead by [`sample`]. If you never sample, every
//! registered channel leaves a small entry behind.
//!
//! # Registering
//!
//! | Entry point | Call site |
//! |-------------|-----------|
//! | [`channel!`]`(cap)` | enclosing function path, file and line of the macro |
//! | [`channel`]`(cap)` | caller file and line; function path resolved from debug info |
//! | [`channel_with_source`]`(cap, source)` | whatever [`Source`] you pass |
//! | [`channel!`]`(&tracker, cap)` / [`channel_in`] | same, on a [`Tracker`] you own |
//! | [`track!`]`(&arc)` / [`track_arc`] | any `Arc<Q>` where `Q:` [`Depth`] |
//!
//! A capacity of 0 is never tracked.
//!
//! # Cargo features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `diagnostics` *(default)* | Registrations are tracked and [`sample`] reports them. |
//! | *(none)* | Plain tokio channels; [`sample`] always returns an empty vec. |
//!
//! # Environment
//!
//! `BRIM_TRACKING=0` (or `false`, `off`, `no`) turns tracking off for the
//! process-wide tracker without rebuilding.

pub use brim_tokio::*;
