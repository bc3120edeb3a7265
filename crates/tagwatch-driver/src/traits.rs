//! Reader driver trait definition.
//!
//! [`ReaderDriver`] is the contract between the detection core and a
//! contactless reader binding. It exposes the raw blocking primitives of a
//! C-style driver - context lifecycle, device open/close, initiator setup,
//! passive-target selection, presence check - so that resource sequencing
//! and offloading stay in this repository rather than in each backend.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use tagwatch_core::{Modulation, TagUid};

/// Value produced by a successful passive-target selection.
///
/// Immutable once produced; the detection core copies it into the event
/// payload without interpreting anything beyond the identifier bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
    /// Identifier bytes the target answered with (0-10 bytes).
    pub uid: TagUid,

    /// Modulation the target answered on.
    pub modulation: Modulation,
}

impl TagInfo {
    /// Create target info from an identifier and the modulation it was
    /// selected on.
    #[must_use]
    pub fn new(uid: TagUid, modulation: Modulation) -> Self {
        Self { uid, modulation }
    }

    /// Identifier as an uppercase hexadecimal string.
    #[must_use]
    pub fn uid_hex(&self) -> String {
        self.uid.to_hex()
    }
}

/// Outcome of one passive-target selection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A target answered the selection handshake.
    Found(TagInfo),

    /// The field stayed quiet for the driver's whole timeout window.
    NotFound,
}

impl Selection {
    /// Returns `true` if a target was selected.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Selection::Found(_))
    }
}

/// Blocking contactless reader driver.
///
/// Implementations bind a real driver library (see the crate's `backend-*`
/// features) or simulate one ([`MockReader`](crate::mock::MockReader)).
/// Every method may block; callers must run them off their own execution
/// context. The associated `Context` and `Device` types are opaque resource
/// handles whose single-owner discipline is enforced by move semantics:
/// whoever holds the value is the only possible user.
///
/// The expected call sequence for one run is
/// `init_context` → `open_device` → `initiator_init` →
/// (`select_passive_target` / `is_target_present`)* →
/// `close_device` → `release_context`, with `release_context` also owed on
/// the failure branches after a successful `init_context`.
pub trait ReaderDriver: Send + Sync + 'static {
    /// Opaque driver context handle.
    type Context: Send + 'static;

    /// Opaque open-device handle.
    type Device: Send + 'static;

    /// Initialize the driver context.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver library cannot be brought up; no
    /// resources are held on failure.
    fn init_context(&self) -> Result<Self::Context>;

    /// Open the first available reader device.
    ///
    /// # Errors
    ///
    /// Returns an error if no device answers. The context stays valid and
    /// the caller still owes `release_context`.
    fn open_device(&self, context: &mut Self::Context) -> Result<Self::Device>;

    /// Configure the device as a polling initiator.
    ///
    /// # Errors
    ///
    /// Returns an error if the device refuses initiator mode; the device
    /// stays open and the caller still owes `close_device`.
    fn initiator_init(&self, device: &mut Self::Device) -> Result<()>;

    /// Select a passive target on the given modulation.
    ///
    /// Blocks for the driver's own timeout/retry window. A quiet field is
    /// `Ok(Selection::NotFound)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error only for transport-level failures.
    fn select_passive_target(
        &self,
        device: &mut Self::Device,
        modulation: Modulation,
    ) -> Result<Selection>;

    /// Check whether the previously selected target still answers.
    ///
    /// # Errors
    ///
    /// Returns an error for transport-level failures; a vanished target
    /// typically reports as a failed round-trip rather than `Ok(false)` on
    /// real hardware, and callers treat both the same way.
    fn is_target_present(&self, device: &mut Self::Device) -> Result<bool>;

    /// Close an open device. Exactly once per successful `open_device`.
    fn close_device(&self, device: Self::Device);

    /// Release the driver context. Exactly once per successful
    /// `init_context`.
    fn release_context(&self, context: Self::Context);

    /// The driver's version string. Synchronous, no side effects.
    fn version(&self) -> String;
}
