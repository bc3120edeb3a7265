//! Detection core for the tagwatch workspace.
//!
//! This crate turns a blocking reader driver into a non-blocking stream of
//! tag lifecycle events. It contributes three pieces on top of
//! `tagwatch-driver`:
//!
//! - [`PollScheduler`] - one dedicated worker thread per run executing one
//!   blocking unit of work at a time, with results delivered back to the
//!   consumer context.
//! - The detection state machine - alternates between searching for a
//!   target and confirming a present target has been removed, re-arming
//!   itself after every departure.
//! - [`TagWatcher`] - the public surface: `start(sink)`, `stop()`,
//!   `version()`.
//!
//! # Event stream
//!
//! A run emits, in order: `Listening`, then alternating
//! `Detected`/`Removed` pairs for as long as the run lives, and a single
//! terminal `Closed` once a stop request has fully torn the device down. A
//! setup failure emits exactly one `Error` instead.
//!
//! ```no_run
//! use tagwatch_core::{TagEvent, event_channel};
//! use tagwatch_driver::MockReader;
//! use tagwatch_session::TagWatcher;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (reader, field) = MockReader::new();
//!     field.place_tag(vec![0x04, 0x9A, 0x3B, 0x01]).unwrap();
//!
//!     let watcher = TagWatcher::new(reader);
//!     println!("driver: {}", watcher.version());
//!
//!     let (sink, mut events) = event_channel(32);
//!     watcher.start(sink);
//!
//!     while let Some(event) = events.next().await {
//!         match event {
//!             TagEvent::Detected(detection) => {
//!                 println!("tag {} arrived", detection.uid_hex());
//!             }
//!             TagEvent::Removed => println!("tag removed"),
//!             TagEvent::Closed => break,
//!             other => println!("{other:?}"),
//!         }
//!     }
//! }
//! ```

pub mod config;
mod detector;
pub mod scheduler;
pub mod state;
pub mod watcher;

pub use config::WatchConfig;
pub use scheduler::{PollScheduler, ScheduleError};
pub use state::{DetectionState, RunFlag};
pub use watcher::TagWatcher;

// Re-export the event vocabulary for convenience.
pub use tagwatch_core::{EventSink, EventStream, TagDetection, TagEvent, event_channel};
