//! Reader-driver boundary for the tagwatch workspace.
//!
//! This crate models the blocking, C-style contactless reader driver that
//! the detection core polls: context lifecycle, device open/close, initiator
//! configuration, passive-target selection, and presence checks. The
//! [`ReaderDriver`] trait is the seam between the detection core and a real
//! driver binding; [`DeviceSession`] layers exactly-once resource sequencing
//! on top of it.
//!
//! # Blocking by contract
//!
//! Every `ReaderDriver` call is allowed to block for as long as the
//! underlying hardware needs - selection in particular sits on the driver's
//! own timeout/retry policy. Callers (the `tagwatch-session` crate) are
//! responsible for keeping those calls off their own execution context. This
//! is why the trait is deliberately synchronous rather than `async fn`
//! based: it wraps a foreign blocking API, not an async-native device.
//!
//! # Mock hardware
//!
//! No real backend ships in this crate (see the `backend-*` feature
//! placeholders). The [`MockReader`]/[`MockFieldHandle`] pair simulates a
//! reader and the field in front of it, including failure injection for
//! every setup branch, so the full detection lifecycle is testable without
//! hardware:
//!
//! ```
//! use tagwatch_driver::{MockReader, Modulation, ReaderDriver, Selection};
//!
//! let (reader, field) = MockReader::new();
//! field.place_tag(vec![0x04, 0xAB, 0xCD, 0xEF]).unwrap();
//!
//! let mut context = reader.init_context().unwrap();
//! let mut device = reader.open_device(&mut context).unwrap();
//! reader.initiator_init(&mut device).unwrap();
//!
//! match reader
//!     .select_passive_target(&mut device, Modulation::MIFARE)
//!     .unwrap()
//! {
//!     Selection::Found(info) => assert_eq!(info.uid.to_hex(), "04ABCDEF"),
//!     Selection::NotFound => panic!("tag was in the field"),
//! }
//!
//! reader.close_device(device);
//! reader.release_context(context);
//! ```

pub mod error;
pub mod mock;
pub mod session;
pub mod traits;

pub use error::{DriverError, Result};
pub use mock::{MockFieldHandle, MockReader};
pub use session::DeviceSession;
pub use traits::{ReaderDriver, Selection, TagInfo};

// Re-export the modulation vocabulary for convenience.
pub use tagwatch_core::{BaudRate, Modulation, ModulationKind};
