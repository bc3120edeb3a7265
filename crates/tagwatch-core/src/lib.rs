//! Shared vocabulary for the tagwatch workspace.
//!
//! This crate defines the types every other tagwatch crate speaks in: the
//! tag identifier, the polling modulation, the lifecycle event enum, and the
//! event channel that carries those events from a detection run to its
//! consumer.
//!
//! Nothing in here touches hardware. The reader-driver boundary lives in
//! `tagwatch-driver`, and the detection loop itself lives in
//! `tagwatch-session`.

pub mod error;
pub mod events;
pub mod types;

pub use error::{Error, Result};
pub use events::{EventSink, EventStream, TagDetection, TagEvent, event_channel};
pub use types::{BaudRate, MAX_UID_LENGTH, Modulation, ModulationKind, TagUid};

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
